//! Local model strategy (Ollama).

use async_trait::async_trait;

use llm_client::OllamaClient;

use crate::error::{AnswerError, AnswerResult};

use super::context::assemble_context;
use super::{AnswerRequest, Answerer, StrategyAnswer};

const LOCAL_CONFIDENCE: f32 = 0.8;

/// Answers through a local Ollama server.
///
/// The server is probed before each generation call; an unreachable server
/// means "not available", which the cascade treats as a skip, not a failure.
pub struct OllamaAnswerer {
    client: OllamaClient,
    model: String,
}

impl OllamaAnswerer {
    /// Create the strategy for the given client and model.
    pub fn new(client: OllamaClient, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl Answerer for OllamaAnswerer {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn answer(&self, request: &AnswerRequest) -> AnswerResult<StrategyAnswer> {
        if !self.client.reachable().await {
            return Err(AnswerError::Unavailable("ollama"));
        }

        let context = assemble_context(&request.context);
        let prompt = format!(
            "Based on this information, answer the question in natural language:\n\n\
             {}\n\nQuestion: {}\n\nAnswer briefly and naturally:",
            context, request.question
        );

        let text = self
            .client
            .generate(&self.model, &prompt)
            .await
            .map_err(|e| AnswerError::Strategy {
                strategy: "ollama",
                reason: e.to_string(),
            })?;

        if text.is_empty() {
            return Err(AnswerError::Strategy {
                strategy: "ollama",
                reason: "empty generation".to_string(),
            });
        }

        Ok(StrategyAnswer {
            text,
            confidence: LOCAL_CONFIDENCE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::request_with_context;

    #[tokio::test]
    async fn test_unreachable_server_reports_unavailable() {
        // Port 1 is never listening
        let answerer = OllamaAnswerer::new(
            OllamaClient::new("http://127.0.0.1:1"),
            "llama2".to_string(),
        );

        let err = answerer.answer(&request_with_context("q")).await.unwrap_err();
        assert!(matches!(err, AnswerError::Unavailable("ollama")));
    }
}
