//! In-process storage backends.
//!
//! These are the process-lifetime fallbacks: a vector index over an
//! [`Embedder`] and a deadline-expiring key-value map. Both live behind the
//! storage traits so a durable backend can replace either without touching
//! callers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::embedding::{cosine_similarity, Embedder};
use crate::store::{KeyValueStore, SemanticIndex};
use crate::types::{ContentChunk, ScoredChunk, SessionStats};

struct IndexedChunk {
    chunk: ContentChunk,
    vector: Vec<f32>,
}

/// In-memory vector index with cosine ranking.
pub struct MemoryVectorIndex {
    embedder: Arc<dyn Embedder>,
    sessions: RwLock<HashMap<String, Vec<IndexedChunk>>>,
}

impl MemoryVectorIndex {
    /// Create an index over the given embedder.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn embedding_text(chunk: &ContentChunk) -> String {
        format!("{}\n{}", chunk.title, chunk.text)
    }
}

#[async_trait]
impl SemanticIndex for MemoryVectorIndex {
    async fn upsert(&self, session_id: &str, chunks: &[ContentChunk]) -> StoreResult<()> {
        // Embed before taking the lock; the guard must not cross an await
        let texts: Vec<String> = chunks.iter().map(Self::embedding_text).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vectors = self.embedder.embed_batch(&refs).await?;

        let indexed: Vec<IndexedChunk> = chunks
            .iter()
            .cloned()
            .zip(vectors)
            .map(|(chunk, vector)| IndexedChunk { chunk, vector })
            .collect();

        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| StoreError::Backend("index lock poisoned".into()))?;
        // Replace semantics: the previous chunk set is dropped wholesale
        sessions.insert(session_id.to_string(), indexed);

        debug!(session_id = %session_id, chunks = chunks.len(), "session chunks indexed");
        Ok(())
    }

    async fn query(&self, session_id: &str, query: &str, k: usize) -> StoreResult<Vec<ScoredChunk>> {
        let query_vector = self.embedder.embed(query).await?;

        let sessions = self
            .sessions
            .read()
            .map_err(|_| StoreError::Backend("index lock poisoned".into()))?;
        let Some(indexed) = sessions.get(session_id) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<ScoredChunk> = indexed
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&query_vector, &entry.vector),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    async fn delete(&self, session_id: &str) -> StoreResult<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| StoreError::Backend("index lock poisoned".into()))?;
        sessions.remove(session_id);
        Ok(())
    }

    async fn stats(&self, session_id: &str) -> StoreResult<SessionStats> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| StoreError::Backend("index lock poisoned".into()))?;
        let Some(indexed) = sessions.get(session_id) else {
            return Ok(SessionStats::default());
        };

        let mut urls: Vec<String> = Vec::new();
        for entry in indexed {
            if !urls.contains(&entry.chunk.url) {
                urls.push(entry.chunk.url.clone());
            }
        }

        Ok(SessionStats {
            chunk_count: indexed.len(),
            urls,
        })
    }
}

enum EntryValue {
    Scalar(String),
    List(Vec<String>),
}

struct Entry {
    value: EntryValue,
    expires_at: Instant,
}

impl Entry {
    fn expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory key-value store with per-entry expiry.
///
/// Process-lifetime scope: contents vanish on restart. This tier is a last
/// resort, not authoritative storage.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryKvStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn write_lock(
        &self,
    ) -> StoreResult<std::sync::RwLockWriteGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .write()
            .map_err(|_| StoreError::Backend("kv lock poisoned".into()))
    }

    fn purge_expired(entries: &mut HashMap<String, Entry>) {
        entries.retain(|_, entry| !entry.expired());
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> StoreResult<()> {
        let mut entries = self.write_lock()?;
        Self::purge_expired(&mut entries);
        entries.insert(
            key.to_string(),
            Entry {
                value: EntryValue::Scalar(value),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::Backend("kv lock poisoned".into()))?;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.expired())
            .and_then(|entry| match &entry.value {
                EntryValue::Scalar(value) => Some(value.clone()),
                EntryValue::List(_) => None,
            }))
    }

    async fn list_push(&self, key: &str, value: String, ttl: Duration) -> StoreResult<()> {
        let mut entries = self.write_lock()?;
        Self::purge_expired(&mut entries);

        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: EntryValue::List(Vec::new()),
            expires_at: Instant::now() + ttl,
        });

        match &mut entry.value {
            EntryValue::List(items) => items.push(value),
            EntryValue::Scalar(_) => {
                return Err(StoreError::Backend(format!(
                    "key '{key}' holds a scalar, not a list"
                )));
            }
        }
        // Each push refreshes the window, like EXPIRE after LPUSH
        entry.expires_at = Instant::now() + ttl;
        Ok(())
    }

    async fn list_range(&self, key: &str) -> StoreResult<Vec<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::Backend("kv lock poisoned".into()))?;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.expired())
            .map(|entry| match &entry.value {
                EntryValue::List(items) => items.clone(),
                EntryValue::Scalar(_) => Vec::new(),
            })
            .unwrap_or_default())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.write_lock()?;
        entries.remove(key);
        Ok(())
    }
}
