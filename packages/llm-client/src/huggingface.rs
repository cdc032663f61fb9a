//! Hugging Face hosted inference client (extractive QA task).
//!
//! Works keyless on the free tier (rate limited); a token raises the quota.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{LlmError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_QA_MODEL: &str = "deepset/roberta-base-squad2";

/// Answer returned by the hosted QA task.
#[derive(Debug, Clone)]
pub struct QaAnswer {
    /// Extracted answer span
    pub answer: String,

    /// Model confidence, when reported
    pub score: Option<f32>,
}

/// Client for the Hugging Face inference API.
#[derive(Clone)]
pub struct HfInferenceClient {
    http_client: Client,
    api_key: Option<String>,
    model_url: String,
}

impl HfInferenceClient {
    /// Create a new client with the default QA model.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to create HTTP client"),
            api_key,
            model_url: format!(
                "https://api-inference.huggingface.co/models/{}",
                DEFAULT_QA_MODEL
            ),
        }
    }

    /// Use a different hosted model by name.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model_url = format!("https://api-inference.huggingface.co/models/{model}");
        self
    }

    /// Use a custom model URL.
    pub fn with_model_url(mut self, url: impl Into<String>) -> Self {
        self.model_url = url.into();
        self
    }

    /// Ask the hosted QA model to extract an answer from the context.
    pub async fn question_answering(&self, question: &str, context: &str) -> Result<QaAnswer> {
        let body = QaRequestRaw {
            inputs: QaInputsRaw { question, context },
        };

        let mut request = self
            .http_client
            .post(&self.model_url)
            .header("Content-Type", "application/json")
            .json(&body);

        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "inference request failed");
            LlmError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "inference API error");
            return Err(LlmError::Api(format!(
                "inference error ({}): {}",
                status, error_text
            )));
        }

        let raw: QaResponseRaw = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let answer = raw.answer.trim().to_string();
        if answer.is_empty() {
            return Err(LlmError::Api("empty answer from QA model".into()));
        }

        Ok(QaAnswer {
            answer,
            score: raw.score,
        })
    }
}

#[derive(Debug, Serialize)]
struct QaRequestRaw<'a> {
    inputs: QaInputsRaw<'a>,
}

#[derive(Debug, Serialize)]
struct QaInputsRaw<'a> {
    question: &'a str,
    context: &'a str,
}

#[derive(Debug, Deserialize)]
struct QaResponseRaw {
    #[serde(default)]
    answer: String,
    #[serde(default)]
    score: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_question_answering() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/qa");
                then.status(200)
                    .json_body(serde_json::json!({"answer": "1889", "score": 0.93}));
            })
            .await;

        let client =
            HfInferenceClient::new(None).with_model_url(format!("{}/qa", server.base_url()));
        let result = client
            .question_answering("When was it built?", "It was built in 1889.")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.answer, "1889");
        assert!(result.score.unwrap() > 0.9);
    }

    #[tokio::test]
    async fn test_empty_answer_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/qa");
                then.status(200).json_body(serde_json::json!({"answer": ""}));
            })
            .await;

        let client =
            HfInferenceClient::new(None).with_model_url(format!("{}/qa", server.base_url()));
        let err = client
            .question_answering("who?", "nothing here")
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Api(_)));
    }
}
