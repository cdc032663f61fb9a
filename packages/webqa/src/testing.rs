//! Testing utilities including mock implementations.
//!
//! Useful for testing the pipeline without a network: a scripted page
//! fetcher and a scripted answer strategy, both with call tracking.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::answer::{AnswerRequest, Answerer, StrategyAnswer};
use crate::error::{AnswerError, AnswerResult, FetchError};
use crate::fetch::{FetchedPage, PageFetcher};
use crate::types::{ContentChunk, ScoredChunk};

/// Scripted outcome for one URL.
enum ScriptedFetch {
    Page { status: u16, body: String },
    Timeout,
    ConnectionError,
}

/// A fetcher returning canned outcomes per URL.
#[derive(Default)]
pub struct MockFetcher {
    outcomes: HashMap<String, ScriptedFetch>,
    calls: RwLock<Vec<String>>,
}

impl MockFetcher {
    /// Create an empty mock; unknown URLs resolve to HTTP 404.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a status/body response for a URL.
    pub fn with_page(mut self, url: impl Into<String>, status: u16, body: String) -> Self {
        self.outcomes
            .insert(url.into(), ScriptedFetch::Page { status, body });
        self
    }

    /// Script a timeout for a URL.
    pub fn with_timeout(mut self, url: impl Into<String>) -> Self {
        self.outcomes.insert(url.into(), ScriptedFetch::Timeout);
        self
    }

    /// Script a connection failure for a URL.
    pub fn with_connection_error(mut self, url: impl Into<String>) -> Self {
        self.outcomes.insert(url.into(), ScriptedFetch::ConnectionError);
        self
    }

    /// URLs fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.calls.write().unwrap().push(url.to_string());

        match self.outcomes.get(url) {
            Some(ScriptedFetch::Page { status, body }) => Ok(FetchedPage {
                status: *status,
                body: body.clone(),
            }),
            Some(ScriptedFetch::Timeout) => Err(FetchError::Timeout),
            Some(ScriptedFetch::ConnectionError) => {
                Err(FetchError::Connection("connection refused".to_string()))
            }
            None => Ok(FetchedPage {
                status: 404,
                body: String::new(),
            }),
        }
    }
}

enum ScriptedAnswer {
    Succeed(String),
    Fail,
    Unreachable,
}

/// An answer strategy with a scripted outcome and a call counter.
pub struct MockAnswerer {
    name: &'static str,
    configured: bool,
    outcome: ScriptedAnswer,
    calls: AtomicUsize,
}

impl MockAnswerer {
    /// A strategy that answers successfully.
    pub fn succeeding(name: &'static str, answer: impl Into<String>) -> Self {
        Self {
            name,
            configured: true,
            outcome: ScriptedAnswer::Succeed(answer.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A strategy that always errors.
    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            configured: true,
            outcome: ScriptedAnswer::Fail,
            calls: AtomicUsize::new(0),
        }
    }

    /// A strategy that is not configured (skipped by the cascade).
    pub fn unconfigured(name: &'static str) -> Self {
        Self {
            name,
            configured: false,
            outcome: ScriptedAnswer::Fail,
            calls: AtomicUsize::new(0),
        }
    }

    /// A strategy whose backend is unreachable at call time.
    pub fn unreachable(name: &'static str) -> Self {
        Self {
            name,
            configured: true,
            outcome: ScriptedAnswer::Unreachable,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `answer` was called.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Answerer for MockAnswerer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_available(&self) -> bool {
        self.configured
    }

    async fn answer(&self, _request: &AnswerRequest) -> AnswerResult<StrategyAnswer> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            ScriptedAnswer::Succeed(text) => Ok(StrategyAnswer {
                text: text.clone(),
                confidence: 0.9,
            }),
            ScriptedAnswer::Fail => Err(AnswerError::Strategy {
                strategy: self.name,
                reason: "scripted failure".to_string(),
            }),
            ScriptedAnswer::Unreachable => Err(AnswerError::Unavailable(self.name)),
        }
    }
}

/// A minimal answer request with one source of context, for strategy tests.
pub fn request_with_context(question: &str) -> AnswerRequest {
    AnswerRequest {
        question: question.to_string(),
        session_id: "test-session".to_string(),
        context: vec![ScoredChunk {
            chunk: ContentChunk {
                session_id: "test-session".to_string(),
                url: "https://example.com".to_string(),
                title: "Example".to_string(),
                text: "Example context text for strategy tests.".to_string(),
                chunk_index: 0,
                total_chunks: 1,
            },
            score: 1.0,
        }],
        history: Vec::new(),
    }
}
