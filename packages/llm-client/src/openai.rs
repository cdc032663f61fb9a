//! OpenAI-style chat completions client.
//!
//! Also serves any OpenAI-compatible vendor through [`OpenAiClient::with_base_url`].

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{LlmError, Result};
use crate::types::{ChatRequest, ChatResponse};

/// OpenAI chat completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| LlmError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for compatible vendors, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion.
    ///
    /// Sends messages to the chat completions API and returns the first
    /// choice's content.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "chat completion request failed");
                LlmError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "chat completion API error");
            return Err(LlmError::Api(format!(
                "chat completion error ({}): {}",
                status, error_text
            )));
        }

        let raw: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = raw
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::Api("no choices in completion response".into()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "chat completion"
        );

        Ok(ChatResponse { content })
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponseRaw {
    choices: Vec<ChoiceRaw>,
}

#[derive(Debug, Deserialize)]
struct ChoiceRaw {
    message: ChoiceMessageRaw,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessageRaw {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;
    use httpmock::prelude::*;

    #[test]
    fn test_client_builder() {
        let client = OpenAiClient::new("sk-test").with_base_url("https://custom.api.com/v1");
        assert_eq!(client.base_url(), "https://custom.api.com/v1");
    }

    #[tokio::test]
    async fn test_chat_completion_parses_first_choice() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer sk-test");
                then.status(200).json_body(serde_json::json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": "Paris."}}
                    ]
                }));
            })
            .await;

        let client = OpenAiClient::new("sk-test").with_base_url(server.base_url());
        let response = client
            .chat_completion(ChatRequest::new("gpt-4o-mini").message(Message::user("capital?")))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.content, "Paris.");
    }

    #[tokio::test]
    async fn test_chat_completion_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(429).body("rate limited");
            })
            .await;

        let client = OpenAiClient::new("sk-test").with_base_url(server.base_url());
        let err = client
            .chat_completion(ChatRequest::new("gpt-4o-mini").message(Message::user("hi")))
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Api(_)));
    }
}
