//! Anthropic messages API client.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LlmError, Result};
use crate::types::{ChatRequest, ChatResponse, Message};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic messages client.
#[derive(Clone)]
pub struct AnthropicClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.anthropic.com".to_string(),
        }
    }

    /// Create from the `ANTHROPIC_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| LlmError::Config("ANTHROPIC_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Create a message.
    ///
    /// Accepts the shared [`ChatRequest`] shape; a leading system message is
    /// lifted into the top-level `system` field the messages API expects.
    pub async fn create_message(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let (system, messages): (Option<String>, Vec<Message>) =
            match request.messages.split_first() {
                Some((first, rest)) if first.role == "system" => {
                    (Some(first.content.clone()), rest.to_vec())
                }
                _ => (None, request.messages.clone()),
            };

        let body = MessagesRequestRaw {
            model: request.model.clone(),
            max_tokens: request.max_tokens.unwrap_or(1024),
            system,
            messages,
            temperature: request.temperature,
        };

        let response = self
            .http_client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "messages request failed");
                LlmError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "messages API error");
            return Err(LlmError::Api(format!(
                "messages error ({}): {}",
                status, error_text
            )));
        }

        let raw: MessagesResponseRaw = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = raw
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlockRaw::Text { text } => Some(text),
            })
            .ok_or_else(|| LlmError::Api("no text content in messages response".into()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "message created"
        );

        Ok(ChatResponse { content })
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequestRaw {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponseRaw {
    content: Vec<ContentBlockRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlockRaw {
    Text { text: String },
}
