//! Session-scoped context storage.
//!
//! Two tiers behind one façade: a semantic chunk index for similarity
//! retrieval, and a raw key-value tier holding the document list verbatim
//! with a TTL. Writes go to both; reads prefer the semantic tier and fall
//! through silently, so callers never branch on which tier answered.

pub mod chunk;
pub mod embedding;
pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::StoreResult;
use crate::store::embedding::HashEmbedder;
use crate::store::memory::{MemoryKvStore, MemoryVectorIndex};
use crate::types::{ContentChunk, ExtractedDocument, ScoredChunk, SessionStats};

/// Default TTL for session content and history.
pub const SESSION_TTL: Duration = Duration::from_secs(86_400);

/// Similarity index capability.
#[async_trait]
pub trait SemanticIndex: Send + Sync {
    /// Replace the session's chunk set (delete-then-insert).
    async fn upsert(&self, session_id: &str, chunks: &[ContentChunk]) -> StoreResult<()>;

    /// Nearest chunks for a query, restricted to the session.
    async fn query(&self, session_id: &str, query: &str, k: usize) -> StoreResult<Vec<ScoredChunk>>;

    /// Drop everything stored for the session.
    async fn delete(&self, session_id: &str) -> StoreResult<()>;

    /// Chunk count and distinct URLs for the session.
    async fn stats(&self, session_id: &str) -> StoreResult<SessionStats>;
}

/// Durable key-value capability (Redis-shaped).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Set a scalar value with a TTL, replacing any previous value.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> StoreResult<()>;

    /// Get a scalar value; `None` when absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Append to a list, refreshing its TTL.
    async fn list_push(&self, key: &str, value: String, ttl: Duration) -> StoreResult<()>;

    /// Read a whole list in insertion order.
    async fn list_range(&self, key: &str) -> StoreResult<Vec<String>>;

    /// Remove a key.
    async fn delete(&self, key: &str) -> StoreResult<()>;
}

/// Two-tier context store keyed by session.
pub struct ContextStore {
    index: Option<Arc<dyn SemanticIndex>>,
    kv: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl ContextStore {
    /// Create a store over the given tiers. `index = None` disables the
    /// semantic tier entirely; retrieval then runs on the raw tier.
    pub fn new(index: Option<Arc<dyn SemanticIndex>>, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            index,
            kv,
            ttl: SESSION_TTL,
        }
    }

    /// Fully in-process store: hash-embedding vector index + memory map.
    pub fn in_memory() -> Self {
        Self::new(
            Some(Arc::new(MemoryVectorIndex::new(Arc::new(
                HashEmbedder::default(),
            )))),
            Arc::new(MemoryKvStore::new()),
        )
    }

    /// Override the session TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// The key-value tier, shared with session history.
    pub fn key_value(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.kv)
    }

    /// The session TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn context_key(session_id: &str) -> String {
        format!("context:{session_id}")
    }

    /// Store a session's documents, replacing whatever was there.
    ///
    /// Only successful documents are persisted. The write succeeds if at
    /// least one tier accepted it; a single-tier failure is logged and
    /// absorbed.
    pub async fn store(
        &self,
        session_id: &str,
        documents: &[ExtractedDocument],
    ) -> StoreResult<()> {
        let successful: Vec<&ExtractedDocument> =
            documents.iter().filter(|d| d.success).collect();

        let mut index_ok = false;
        if let Some(index) = &self.index {
            let chunks: Vec<ContentChunk> = successful
                .iter()
                .flat_map(|doc| chunk::chunk_document(session_id, doc))
                .collect();
            match index.upsert(session_id, &chunks).await {
                Ok(()) => {
                    debug!(session_id = %session_id, chunks = chunks.len(), "semantic tier updated");
                    index_ok = true;
                }
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "semantic tier write failed");
                }
            }
        }

        let raw: Vec<ExtractedDocument> = successful.into_iter().cloned().collect();
        let payload = serde_json::to_string(&raw)?;
        match self
            .kv
            .set(&Self::context_key(session_id), payload, self.ttl)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if index_ok => {
                warn!(session_id = %session_id, error = %e, "raw tier write failed");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// The session's raw document list (fallback tier).
    pub async fn documents(&self, session_id: &str) -> StoreResult<Vec<ExtractedDocument>> {
        let Some(payload) = self.kv.get(&Self::context_key(session_id)).await? else {
            return Ok(Vec::new());
        };
        Ok(serde_json::from_str(&payload)?)
    }

    /// Query the semantic tier; empty when the tier is missing, empty, or
    /// failing (the caller falls through to keyword retrieval).
    pub async fn semantic_query(
        &self,
        session_id: &str,
        query: &str,
        k: usize,
    ) -> Vec<ScoredChunk> {
        let Some(index) = &self.index else {
            return Vec::new();
        };
        match index.query(session_id, query, k).await {
            Ok(results) => results,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "semantic query failed");
                Vec::new()
            }
        }
    }

    /// Whether the session has any stored content in either tier.
    pub async fn has_content(&self, session_id: &str) -> bool {
        if let Some(index) = &self.index {
            if let Ok(stats) = index.stats(session_id).await {
                if stats.chunk_count > 0 {
                    return true;
                }
            }
        }
        matches!(self.documents(session_id).await, Ok(docs) if !docs.is_empty())
    }

    /// Index statistics, derived from the raw tier when no index exists.
    pub async fn stats(&self, session_id: &str) -> StoreResult<SessionStats> {
        if let Some(index) = &self.index {
            let stats = index.stats(session_id).await?;
            if stats.chunk_count > 0 {
                return Ok(stats);
            }
        }

        let documents = self.documents(session_id).await?;
        let chunk_count = documents
            .iter()
            .map(|d| chunk::chunk_document(session_id, d).len())
            .sum();
        Ok(SessionStats {
            chunk_count,
            urls: documents.into_iter().map(|d| d.url).collect(),
        })
    }

    /// Clear both tiers for a session.
    pub async fn clear(&self, session_id: &str) -> StoreResult<()> {
        if let Some(index) = &self.index {
            if let Err(e) = index.delete(session_id).await {
                warn!(session_id = %session_id, error = %e, "semantic tier clear failed");
            }
        }
        self.kv.delete(&Self::context_key(session_id)).await
    }
}
