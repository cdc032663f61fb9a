//! Web-Page Question Answering Library
//!
//! Extracts readable content from user-supplied web pages, stores it under
//! short-lived sessions, and answers natural-language questions against it
//! through a cascade of model backends that degrades all the way down to a
//! deterministic extractive summarizer.
//!
//! # Design
//!
//! - Every external capability sits behind a trait ([`PageFetcher`],
//!   [`SemanticIndex`], [`KeyValueStore`], [`Embedder`], [`Answerer`]) so
//!   backends are swappable and tests run without a network.
//! - Per-URL and per-strategy failures are recovered, never propagated: a
//!   failed page becomes a failure record, a failed strategy advances the
//!   cascade.
//! - The final cascade entry is pure computation and cannot fail, so the
//!   answer path never returns an exception-shaped response.
//!
//! # Usage
//!
//! ```rust,ignore
//! use webqa::{QaService, Settings};
//!
//! let service = QaService::new(&Settings::from_env());
//!
//! let report = service.extract_and_store(&urls).await?;
//! let session_id = report.session_id.clone().unwrap();
//!
//! let answer = service
//!     .answer("When was the Eiffel Tower completed?", Some(session_id))
//!     .await?;
//! println!("{} (sources: {:?})", answer.answer, answer.sources);
//! ```
//!
//! # Modules
//!
//! - [`extract`] - concurrent page fetching, DOM extraction, text cleanup
//! - [`store`] - two-tier session context storage (semantic + raw)
//! - [`retrieval`] - relevance selection with keyword fallback
//! - [`answer`] - the answer cascade and its strategies
//! - [`history`] - per-session Q&A log
//! - [`service`] - the facade tying it all together

pub mod answer;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod history;
pub mod retrieval;
pub mod service;
pub mod store;
pub mod testing;
pub mod types;

pub use answer::{AnswerCascade, AnswerRequest, Answerer, StrategyAnswer};
pub use config::{SecretString, Settings};
pub use error::{AnswerError, AnswerResult, FetchError, StoreError, StoreResult};
pub use extract::PageExtractor;
pub use fetch::{FetchedPage, HttpFetcher, PageFetcher};
pub use history::SessionHistory;
pub use retrieval::RelevanceSelector;
pub use service::QaService;
pub use store::{
    embedding::Embedder, ContextStore, KeyValueStore, SemanticIndex,
};
pub use types::{
    Answer, ContentChunk, ExtractedDocument, ExtractionReport, QAEntry, ScoredChunk,
    SessionStats,
};
