//! The service facade wiring extraction, storage, retrieval, and answering.
//!
//! This is the surface an HTTP layer would call: extract pages, store them
//! under a session, answer questions against the session, and read history.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::answer::{AnswerCascade, AnswerRequest};
use crate::config::Settings;
use crate::error::{AnswerError, AnswerResult, StoreResult};
use crate::extract::PageExtractor;
use crate::history::SessionHistory;
use crate::retrieval::{RelevanceSelector, DEFAULT_MAX_RESULTS};
use crate::store::ContextStore;
use crate::types::{Answer, ExtractedDocument, ExtractionReport, QAEntry, SessionStats};

/// Length of generated session tokens.
const SESSION_TOKEN_LEN: usize = 8;

/// Extraction and question answering over session-scoped web content.
pub struct QaService {
    extractor: PageExtractor,
    store: Arc<ContextStore>,
    selector: RelevanceSelector,
    cascade: AnswerCascade,
    history: SessionHistory,
}

impl QaService {
    /// Build the service with in-process storage and the standard cascade.
    pub fn new(settings: &Settings) -> Self {
        Self::with_components(
            PageExtractor::new(),
            Arc::new(ContextStore::in_memory()),
            AnswerCascade::from_settings(settings),
        )
    }

    /// Build the service from explicit components (used by tests and by
    /// callers bringing their own storage tiers).
    pub fn with_components(
        extractor: PageExtractor,
        store: Arc<ContextStore>,
        cascade: AnswerCascade,
    ) -> Self {
        let selector = RelevanceSelector::new(Arc::clone(&store));
        let history = SessionHistory::new(store.key_value(), store.ttl());
        Self {
            extractor,
            store,
            selector,
            cascade,
            history,
        }
    }

    /// Generate a short opaque session token.
    pub fn new_session_token() -> String {
        Uuid::new_v4().simple().to_string()[..SESSION_TOKEN_LEN].to_string()
    }

    /// Extract content from the given URLs. Storage is left to the caller.
    pub async fn extract(&self, urls: &[String]) -> ExtractionReport {
        self.extractor.extract(urls).await
    }

    /// Extract and, on aggregate success, store under a fresh session.
    ///
    /// The minted session token is carried in the report.
    pub async fn extract_and_store(&self, urls: &[String]) -> StoreResult<ExtractionReport> {
        let mut report = self.extractor.extract(urls).await;

        if report.success {
            let session_id = Self::new_session_token();
            self.store.store(&session_id, &report.documents).await?;
            info!(session_id = %session_id, "extracted content stored");
            report.session_id = Some(session_id);
        }

        Ok(report)
    }

    /// Store documents under an existing session, replacing prior content.
    pub async fn store_context(
        &self,
        session_id: &str,
        documents: &[ExtractedDocument],
    ) -> StoreResult<()> {
        self.store.store(session_id, documents).await
    }

    /// Answer a question against a session's stored content.
    ///
    /// Fails with [`AnswerError::NoContext`] when the session is unknown or
    /// empty, and [`AnswerError::InvalidQuestion`] for a blank question;
    /// otherwise an answer always comes back, however degraded.
    pub async fn answer(
        &self,
        question: &str,
        session_id: Option<String>,
    ) -> AnswerResult<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AnswerError::InvalidQuestion {
                reason: "question cannot be empty".to_string(),
            });
        }

        let session_id = session_id.unwrap_or_else(Self::new_session_token);

        let context = self
            .selector
            .select(&session_id, question, DEFAULT_MAX_RESULTS)
            .await?;
        if context.is_empty() {
            return Err(AnswerError::NoContext);
        }

        let history = self.history.recent(&session_id).await.unwrap_or_default();
        let request = AnswerRequest {
            question: question.to_string(),
            session_id: session_id.clone(),
            context,
            history,
        };

        let result = self.cascade.run(&request).await?;
        let sources = crate::answer::context::source_urls(&request.context);

        // A history write failure must not cost the user their answer
        if let Err(e) = self
            .history
            .append(&session_id, question, &result.text)
            .await
        {
            warn!(session_id = %session_id, error = %e, "failed to append history");
        }

        Ok(Answer {
            answer: result.text,
            sources,
            session_id,
            confidence: Some(result.confidence),
        })
    }

    /// Full Q&A history for a session, oldest first.
    pub async fn history(&self, session_id: &str) -> StoreResult<Vec<QAEntry>> {
        self.history.all(session_id).await
    }

    /// Index statistics for a session.
    pub async fn session_stats(&self, session_id: &str) -> StoreResult<SessionStats> {
        self.store.stats(session_id).await
    }

    /// Drop a session's content from both storage tiers.
    pub async fn clear_session(&self, session_id: &str) -> StoreResult<()> {
        self.store.clear(session_id).await
    }
}
