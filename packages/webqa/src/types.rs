//! Core data types flowing through the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of extracting one URL.
///
/// Created once per URL per extraction request and immutable afterwards.
/// A failed extraction is still a document, with `success = false` and a
/// human-readable `error`; raw transport errors never reach this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// URL the document came from
    pub url: String,

    /// Resolved page title ("Untitled" when the page has none)
    pub title: String,

    /// Cleaned plain text content
    pub content: String,

    /// Whether extraction produced usable content
    pub success: bool,

    /// Failure description when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Whitespace-separated word count of `content`
    pub word_count: usize,
}

impl ExtractedDocument {
    /// Create a successful document; the word count is derived from the content.
    pub fn ok(
        url: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let word_count = content.split_whitespace().count();
        Self {
            url: url.into(),
            title: title.into(),
            content,
            success: true,
            error: None,
            word_count,
        }
    }

    /// Create a failed document carrying an error description.
    pub fn failed(
        url: impl Into<String>,
        title: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            content: String::new(),
            success: false,
            error: Some(error.into()),
            word_count: 0,
        }
    }
}

/// Aggregate result of one extraction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// True when at least one URL succeeded and some words were extracted
    pub success: bool,

    /// One entry per requested URL, in request order
    pub documents: Vec<ExtractedDocument>,

    /// Total word count across successful documents
    pub total_word_count: usize,

    /// URLs that failed, with no distinction of cause (see `documents`)
    pub failed_urls: Vec<String>,

    /// Session the content was stored under, when the caller asked for storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// A bounded slice of a source document, the unit of indexing and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentChunk {
    /// Session this chunk belongs to
    pub session_id: String,

    /// Source URL
    pub url: String,

    /// Source page title
    pub title: String,

    /// Chunk text (roughly 1000 chars, sentence-boundary aligned)
    pub text: String,

    /// Position of this chunk within its document
    pub chunk_index: usize,

    /// Number of chunks the document was split into
    pub total_chunks: usize,
}

/// A chunk paired with a relevance score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The retrieved chunk
    pub chunk: ContentChunk,

    /// Relevance score; comparable only within one retrieval call
    pub score: f32,
}

/// One question/answer exchange in a session's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QAEntry {
    /// The question as asked
    pub question: String,

    /// The answer that was returned
    pub answer: String,

    /// When the exchange happened
    pub timestamp: DateTime<Utc>,
}

impl QAEntry {
    /// Create an entry stamped with the current time.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Answer returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Answer text
    pub answer: String,

    /// Distinct source URLs the answer drew on, in context order
    pub sources: Vec<String>,

    /// Session the question was answered against
    pub session_id: String,

    /// Rough confidence of the strategy that produced the answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// Per-session index statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// Number of chunks indexed for the session
    pub chunk_count: usize,

    /// Distinct source URLs in the session
    pub urls: Vec<String>,
}
