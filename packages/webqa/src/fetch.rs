//! Page fetching behind a trait seam.
//!
//! The extractor depends on [`PageFetcher`] rather than a concrete HTTP
//! client so tests can script fetch outcomes without a network.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::error::FetchError;

/// Generic browser user agent; some sites refuse obvious bot agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A fetched page: status code plus decoded body.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,

    /// Response body as text
    pub body: String,
}

/// Capability contract for fetching page bytes over HTTP.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a URL. Non-2xx statuses are returned, not treated as errors;
    /// only transport-level failures produce [`FetchError`].
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Real HTTP fetcher with a browser user agent and a fixed timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a fetcher with the default client configuration.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .user_agent(BROWSER_USER_AGENT)
                .build()
                .expect("failed to create HTTP client"),
        }
    }

    /// Use a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        debug!(url = %url, "fetching page");

        let response = self.client.get(parsed).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "page fetch failed");
            classify_reqwest_error(e)
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            warn!(url = %url, error = %e, "failed to read response body");
            FetchError::Other(e.to_string())
        })?;

        debug!(url = %url, status = status, bytes = body.len(), "page fetched");

        Ok(FetchedPage { status, body })
    }
}

fn classify_reqwest_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connection(e.to_string())
    } else {
        FetchError::Other(e.to_string())
    }
}
