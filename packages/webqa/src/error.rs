//! Typed errors for the extraction and answering pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Per-URL fetch
//! failures and per-strategy answering failures are recovered internally and
//! never reach callers as errors; the enums here cover what does.

use thiserror::Error;

/// Transport-level failure while fetching a page.
///
/// Non-2xx statuses are not errors at this layer; the fetcher hands back the
/// status code and the extractor classifies it.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request exceeded the fetch timeout
    #[error("request timed out")]
    Timeout,

    /// TCP/TLS-level connection failure
    #[error("connection failed: {0}")]
    Connection(String),

    /// URL could not be parsed or has an unsupported scheme
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Anything else (DNS, body decode, protocol errors)
    #[error("request failed: {0}")]
    Other(String),
}

/// Errors from the context storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing store rejected or lost the operation
    #[error("storage error: {0}")]
    Backend(String),

    /// Stored payload could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Embedding generation failed
    #[error("embedding error: {0}")]
    Embedding(String),
}

/// Errors surfaced by the answering path.
#[derive(Debug, Error)]
pub enum AnswerError {
    /// No content stored for the session; the caller must extract first
    #[error("no content available for this session; extract content from URLs first")]
    NoContext,

    /// The question failed validation
    #[error("invalid question: {reason}")]
    InvalidQuestion { reason: String },

    /// A single strategy failed (recovered by the cascade, logged only)
    #[error("strategy '{strategy}' failed: {reason}")]
    Strategy {
        strategy: &'static str,
        reason: String,
    },

    /// A strategy's backend is not reachable right now
    #[error("strategy '{0}' not available")]
    Unavailable(&'static str),

    /// Storage failure while reading context or history
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Every strategy failed, including the deterministic fallback
    #[error("all answer strategies failed")]
    Exhausted,
}

/// Result type alias for storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for answering operations.
pub type AnswerResult<T> = std::result::Result<T, AnswerError>;
