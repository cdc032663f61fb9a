//! Append-only per-session question/answer log.
//!
//! Stored behind the key-value tier under `qa:{session}` with the session
//! TTL, refreshed on every append. The full log feeds the history endpoint;
//! the recent window feeds conversational continuity in the cascade.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::StoreResult;
use crate::store::KeyValueStore;
use crate::types::QAEntry;

/// History entries handed to hosted providers as conversation context.
pub const RECENT_WINDOW: usize = 6;

/// Session-scoped Q&A log.
pub struct SessionHistory {
    kv: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl SessionHistory {
    /// Create a history log over the given store.
    pub fn new(kv: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { kv, ttl }
    }

    fn qa_key(session_id: &str) -> String {
        format!("qa:{session_id}")
    }

    /// Append one exchange, stamped with the current time.
    pub async fn append(
        &self,
        session_id: &str,
        question: &str,
        answer: &str,
    ) -> StoreResult<()> {
        let entry = QAEntry::new(question, answer);
        let payload = serde_json::to_string(&entry)?;
        self.kv
            .list_push(&Self::qa_key(session_id), payload, self.ttl)
            .await?;
        debug!(session_id = %session_id, "history entry appended");
        Ok(())
    }

    /// Full ordered history, oldest first.
    pub async fn all(&self, session_id: &str) -> StoreResult<Vec<QAEntry>> {
        let raw = self.kv.list_range(&Self::qa_key(session_id)).await?;
        let mut entries = Vec::with_capacity(raw.len());
        for item in raw {
            entries.push(serde_json::from_str(&item)?);
        }
        Ok(entries)
    }

    /// The last [`RECENT_WINDOW`] entries, still oldest first.
    pub async fn recent(&self, session_id: &str) -> StoreResult<Vec<QAEntry>> {
        let mut entries = self.all(session_id).await?;
        if entries.len() > RECENT_WINDOW {
            entries.drain(..entries.len() - RECENT_WINDOW);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryKvStore;

    fn history() -> SessionHistory {
        SessionHistory::new(Arc::new(MemoryKvStore::new()), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_append_and_read_in_order() {
        let history = history();
        history.append("s1", "first question", "first answer").await.unwrap();
        history.append("s1", "second question", "second answer").await.unwrap();

        let entries = history.all("s1").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].question, "first question");
        assert_eq!(entries[1].question, "second question");
    }

    #[tokio::test]
    async fn test_unknown_session_empty() {
        let history = history();
        assert!(history.all("missing").await.unwrap().is_empty());
        assert!(history.recent("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recent_window_keeps_newest() {
        let history = history();
        for i in 0..10 {
            history
                .append("s1", &format!("question {i}"), &format!("answer {i}"))
                .await
                .unwrap();
        }

        let recent = history.recent("s1").await.unwrap();
        assert_eq!(recent.len(), RECENT_WINDOW);
        assert_eq!(recent[0].question, "question 4");
        assert_eq!(recent.last().unwrap().question, "question 9");
    }

    #[tokio::test]
    async fn test_sessions_isolated() {
        let history = history();
        history.append("s1", "q1", "a1").await.unwrap();
        history.append("s2", "q2", "a2").await.unwrap();

        assert_eq!(history.all("s1").await.unwrap().len(), 1);
        assert_eq!(history.all("s2").await.unwrap().len(), 1);
    }
}
