//! Embedding abstraction for the semantic tier.
//!
//! The default [`HashEmbedder`] produces deterministic lexical
//! pseudo-embeddings (word and character-trigram hashing, unit-normalized)
//! so the semantic tier works with no model downloads. The
//! `local-embeddings` feature adds a real sentence-transformer model.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use crate::error::StoreResult;

/// Embedding dimensionality used by the in-process index.
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Text-to-vector capability consumed by the semantic index.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Output vector dimensionality.
    fn dimensions(&self) -> usize;

    /// Embed one text.
    async fn embed(&self, text: &str) -> StoreResult<Vec<f32>>;

    /// Embed several texts.
    async fn embed_batch(&self, texts: &[&str]) -> StoreResult<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }
}

/// Deterministic lexical pseudo-embedder.
///
/// Similarity reflects word and trigram overlap, not semantics; it ranks
/// lexically-related chunks well enough for single-session retrieval and
/// needs nothing beyond the standard library.
pub struct HashEmbedder {
    dimensions: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl HashEmbedder {
    /// Create an embedder with the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn hash_str(s: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    fn generate(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let normalized: String = text
            .chars()
            .map(|c| {
                if c.is_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    ' '
                }
            })
            .collect();

        // Word-level signal
        for word in normalized.split_whitespace() {
            let hash = Self::hash_str(word);
            let idx = (hash as usize) % self.dimensions;
            let sign = if (hash >> 32) & 1 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }

        // Trigram signal for fuzzy matching
        let chars: Vec<char> = normalized.chars().collect();
        for window in chars.windows(3) {
            let trigram: String = window.iter().collect();
            let hash = Self::hash_str(&trigram);
            let idx = (hash as usize) % self.dimensions;
            let sign = if (hash >> 32) & 1 == 0 { 0.5 } else { -0.5 };
            vector[idx] += sign;
        }

        // Unit length so cosine similarity is meaningful
        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> StoreResult<Vec<f32>> {
        Ok(self.generate(text))
    }
}

/// Cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(feature = "local-embeddings")]
pub use real::FastembedEmbedder;

#[cfg(feature = "local-embeddings")]
mod real {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

    use crate::error::{StoreError, StoreResult};

    use super::Embedder;

    /// Sentence-transformer embedder (all-MiniLM-L6-v2, 384 dimensions).
    pub struct FastembedEmbedder {
        model: Mutex<TextEmbedding>,
    }

    impl FastembedEmbedder {
        /// Initialize the model, downloading weights on first use.
        pub fn new() -> StoreResult<Self> {
            let model =
                TextEmbedding::try_new(InitOptions::new(EmbeddingModel::AllMiniLML6V2))
                    .map_err(|e| StoreError::Embedding(e.to_string()))?;
            Ok(Self {
                model: Mutex::new(model),
            })
        }
    }

    #[async_trait]
    impl Embedder for FastembedEmbedder {
        fn dimensions(&self) -> usize {
            super::DEFAULT_DIMENSIONS
        }

        async fn embed(&self, text: &str) -> StoreResult<Vec<f32>> {
            let mut vectors = self.embed_batch(&[text]).await?;
            vectors
                .pop()
                .ok_or_else(|| StoreError::Embedding("model returned no vectors".into()))
        }

        async fn embed_batch(&self, texts: &[&str]) -> StoreResult<Vec<Vec<f32>>> {
            let owned: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
            let mut model = self
                .model
                .lock()
                .map_err(|_| StoreError::Embedding("embedding model lock poisoned".into()))?;
            model
                .embed(owned, None)
                .map_err(|e| StoreError::Embedding(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("hello world").await.unwrap();
        let b = embedder.embed("hello world").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_unit_normalized() {
        let embedder = HashEmbedder::default();
        let v = embedder.embed("some text to embed").await.unwrap();
        let magnitude: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_lexical_overlap_ranks_higher() {
        let embedder = HashEmbedder::default();
        let base = embedder.embed("the eiffel tower in paris").await.unwrap();
        let close = embedder.embed("the eiffel tower in france").await.unwrap();
        let far = embedder.embed("quarterly revenue projections").await.unwrap();

        assert!(cosine_similarity(&base, &close) > cosine_similarity(&base, &far));
    }

    #[tokio::test]
    async fn test_empty_text_zero_vector() {
        let embedder = HashEmbedder::default();
        let v = embedder.embed("").await.unwrap();
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_cosine_similarity_basics() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &[1.0, 0.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 1e-6);
        assert!((cosine_similarity(&a, &[-1.0, 0.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }
}
