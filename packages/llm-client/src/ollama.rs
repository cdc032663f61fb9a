//! Local Ollama endpoint client.
//!
//! The generation call is gated behind a cheap reachability probe so that a
//! machine without Ollama running degrades to "not available" instead of a
//! slow connection error.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{LlmError, Result};

const GENERATE_TIMEOUT: Duration = Duration::from_secs(20);
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Client for a local Ollama server.
#[derive(Clone)]
pub struct OllamaClient {
    http_client: Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a new client for the given base URL (e.g. `http://localhost:11434`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(GENERATE_TIMEOUT)
                .build()
                .expect("failed to create HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check whether the server responds at all.
    ///
    /// Hits `/api/tags` with a short timeout. Any error means unreachable.
    pub async fn reachable(&self) -> bool {
        let result = self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) => {
                debug!(status = %response.status(), "ollama probe");
                response.status().is_success()
            }
            Err(e) => {
                debug!(error = %e, "ollama unreachable");
                false
            }
        }
    }

    /// Generate a completion for the prompt with the given model.
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let body = GenerateRequestRaw {
            model,
            prompt,
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "ollama generate failed");
                LlmError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!(
                "ollama error ({}): {}",
                status, error_text
            )));
        }

        let raw: GenerateResponseRaw = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(raw.response.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequestRaw<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponseRaw {
    #[serde(default)]
    response: String,
}
