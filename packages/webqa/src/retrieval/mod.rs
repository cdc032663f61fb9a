//! Relevance selection over a session's stored content.
//!
//! Prefers the semantic tier; falls back to keyword/phrase scoring over the
//! raw document list when no index is available or it has nothing for the
//! session. Multi-source sessions get per-source balancing so one verbose
//! page cannot crowd out the others.

pub mod scoring;

use std::sync::Arc;

use tracing::debug;

use crate::error::StoreResult;
use crate::store::{chunk, ContextStore};
use crate::types::{ContentChunk, ScoredChunk};

/// Default number of chunks handed to the answer cascade.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Sessions with at most this many chunks skip scoring entirely.
const SMALL_SESSION_THRESHOLD: usize = 5;

/// Selects the most relevant chunks for a question.
pub struct RelevanceSelector {
    store: Arc<ContextStore>,
}

impl RelevanceSelector {
    /// Create a selector over the given store.
    pub fn new(store: Arc<ContextStore>) -> Self {
        Self { store }
    }

    /// Pick up to `max_results` chunks relevant to the query.
    ///
    /// Returns an empty list only when the session has no stored content at
    /// all; "nothing matched well" still returns the best-effort top items.
    pub async fn select(
        &self,
        session_id: &str,
        query: &str,
        max_results: usize,
    ) -> StoreResult<Vec<ScoredChunk>> {
        let semantic = self
            .store
            .semantic_query(session_id, query, max_results * 2)
            .await;
        if !semantic.is_empty() {
            debug!(session_id = %session_id, candidates = semantic.len(), "semantic retrieval");
            return Ok(balance_by_source(semantic, max_results));
        }

        // Keyword fallback over the raw tier
        let documents = self.store.documents(session_id).await?;
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let chunks: Vec<ContentChunk> = documents
            .iter()
            .flat_map(|doc| chunk::chunk_document(session_id, doc))
            .collect();

        if chunks.len() <= SMALL_SESSION_THRESHOLD {
            debug!(session_id = %session_id, chunks = chunks.len(), "small session, returning everything");
            return Ok(chunks
                .into_iter()
                .map(|chunk| ScoredChunk { chunk, score: 0.0 })
                .collect());
        }

        let terms = scoring::tokenize_query(query);
        let mut scored: Vec<ScoredChunk> = chunks
            .into_iter()
            .map(|chunk| {
                let score =
                    scoring::score_text(&terms, &format!("{} {}", chunk.title, chunk.text));
                ScoredChunk { chunk, score }
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        debug!(session_id = %session_id, candidates = scored.len(), "keyword retrieval");
        Ok(balance_by_source(scored, max_results))
    }
}

/// Rebalance a score-sorted candidate list across its source URLs.
///
/// Each distinct source gets roughly `max_results / source_count` slots
/// (at least one); leftover slots go to the globally best remaining
/// candidates. Single-source sessions just truncate.
pub fn balance_by_source(mut candidates: Vec<ScoredChunk>, max_results: usize) -> Vec<ScoredChunk> {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let mut sources: Vec<&str> = Vec::new();
    for candidate in &candidates {
        if !sources.contains(&candidate.chunk.url.as_str()) {
            sources.push(&candidate.chunk.url);
        }
    }

    if sources.len() <= 1 {
        candidates.truncate(max_results);
        return candidates;
    }

    let per_source = (max_results / sources.len()).max(1);

    let mut selected: Vec<ScoredChunk> = Vec::new();
    let mut leftovers: Vec<ScoredChunk> = Vec::new();
    let mut taken: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for candidate in candidates {
        let count = taken.entry(candidate.chunk.url.clone()).or_insert(0);
        if *count < per_source && selected.len() < max_results {
            *count += 1;
            selected.push(candidate);
        } else {
            leftovers.push(candidate);
        }
    }

    for candidate in leftovers {
        if selected.len() >= max_results {
            break;
        }
        selected.push(candidate);
    }

    selected.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryKvStore;
    use crate::types::ExtractedDocument;

    fn scored(url: &str, index: usize, score: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: ContentChunk {
                session_id: "s".to_string(),
                url: url.to_string(),
                title: "T".to_string(),
                text: format!("chunk {index}"),
                chunk_index: index,
                total_chunks: 10,
            },
            score,
        }
    }

    #[test]
    fn test_balance_covers_every_source() {
        // 3 sources, 10 chunks each, one source dominating the scores
        let mut candidates = Vec::new();
        for i in 0..10 {
            candidates.push(scored("https://a.com", i, 100.0 - i as f32));
            candidates.push(scored("https://b.com", i, 50.0 - i as f32));
            candidates.push(scored("https://c.com", i, 25.0 - i as f32));
        }

        let selected = balance_by_source(candidates, 6);

        assert_eq!(selected.len(), 6);
        for url in ["https://a.com", "https://b.com", "https://c.com"] {
            assert!(
                selected.iter().any(|s| s.chunk.url == url),
                "missing chunks from {url}"
            );
        }
    }

    #[test]
    fn test_balance_single_source_truncates() {
        let candidates = (0..10).map(|i| scored("https://a.com", i, i as f32)).collect();
        let selected = balance_by_source(candidates, 4);
        assert_eq!(selected.len(), 4);
        // Top scores survive
        assert!(selected.iter().any(|s| s.score == 9.0));
    }

    #[test]
    fn test_balance_fills_leftover_slots_by_score() {
        // 2 sources, k=5: 2 each guaranteed, 5th slot goes to best leftover
        let mut candidates = Vec::new();
        for i in 0..5 {
            candidates.push(scored("https://a.com", i, 100.0 - i as f32));
            candidates.push(scored("https://b.com", i, 10.0 - i as f32));
        }

        let selected = balance_by_source(candidates, 5);
        assert_eq!(selected.len(), 5);
        let from_a = selected.iter().filter(|s| s.chunk.url == "https://a.com").count();
        assert_eq!(from_a, 3);
    }

    #[tokio::test]
    async fn test_select_empty_session_returns_empty() {
        let store = Arc::new(ContextStore::in_memory());
        let selector = RelevanceSelector::new(store);
        let results = selector.select("missing", "anything", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_select_semantic_path_ranks_by_title_match() {
        let store = Arc::new(ContextStore::in_memory());
        let docs = vec![
            ExtractedDocument::ok(
                "https://a.com",
                "Eiffel Tower History",
                "The tower was built for the 1889 world fair in Paris and became iconic.",
            ),
            ExtractedDocument::ok(
                "https://b.com",
                "Rust Programming",
                "Rust is a systems language focused on safety and performance guarantees.",
            ),
        ];
        store.store("s1", &docs).await.unwrap();

        let selector = RelevanceSelector::new(Arc::clone(&store));
        let results = selector
            .select("s1", "Eiffel Tower History", 4)
            .await
            .unwrap();

        assert!(!results.is_empty());
        assert_eq!(results[0].chunk.url, "https://a.com");
    }

    #[tokio::test]
    async fn test_select_keyword_fallback_without_index() {
        let store = Arc::new(ContextStore::new(None, Arc::new(MemoryKvStore::new())));
        let long_filler = "Unrelated filler sentence about gardens and weather patterns. ".repeat(40);
        let docs = vec![
            ExtractedDocument::ok("https://a.com", "Filler", long_filler),
            ExtractedDocument::ok(
                "https://b.com",
                "Tower",
                "The Eiffel Tower was completed in 1889. ".repeat(30),
            ),
        ];
        store.store("s1", &docs).await.unwrap();

        let selector = RelevanceSelector::new(Arc::clone(&store));
        let results = selector
            .select("s1", "When was the Eiffel Tower completed?", 3)
            .await
            .unwrap();

        assert!(!results.is_empty());
        assert_eq!(results[0].chunk.url, "https://b.com");
        assert!(results[0].score > 0.0);
    }

    #[tokio::test]
    async fn test_select_small_session_returns_everything() {
        let store = Arc::new(ContextStore::new(None, Arc::new(MemoryKvStore::new())));
        let docs = vec![ExtractedDocument::ok(
            "https://a.com",
            "Note",
            "A single small document with nothing matching the query words.",
        )];
        store.store("s1", &docs).await.unwrap();

        let selector = RelevanceSelector::new(Arc::clone(&store));
        let results = selector.select("s1", "completely unrelated", 5).await.unwrap();
        assert_eq!(results.len(), 1);
    }
}
