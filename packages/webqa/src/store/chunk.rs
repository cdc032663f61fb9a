//! Sentence-boundary-aware chunker.
//!
//! Splits document content into overlapping windows of roughly
//! [`CHUNK_SIZE`] chars. When a window would cut mid-sentence, the break is
//! pulled back to the last period inside the final stretch of the window,
//! so chunks end on sentence boundaries whenever one is close enough.

use crate::types::{ContentChunk, ExtractedDocument};

/// Target chunk size in characters.
pub const CHUNK_SIZE: usize = 1000;

/// Overlap carried between consecutive chunks.
pub const CHUNK_OVERLAP: usize = 100;

/// Window (from the chunk end) searched for a sentence boundary.
const BOUNDARY_SEARCH_WINDOW: usize = 200;

/// Chunk one document for a session.
pub fn chunk_document(session_id: &str, document: &ExtractedDocument) -> Vec<ContentChunk> {
    let pieces = split_content(&document.content, CHUNK_SIZE, CHUNK_OVERLAP);
    let total_chunks = pieces.len();

    pieces
        .into_iter()
        .enumerate()
        .map(|(chunk_index, text)| ContentChunk {
            session_id: session_id.to_string(),
            url: document.url.clone(),
            title: document.title.clone(),
            text,
            chunk_index,
            total_chunks,
        })
        .collect()
}

/// Split text into overlapping, sentence-boundary-aligned pieces.
pub fn split_content(content: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= chunk_size {
        return vec![trimmed.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + chunk_size).min(chars.len());

        if end < chars.len() {
            let search_from = start + chunk_size.saturating_sub(BOUNDARY_SEARCH_WINDOW);
            if let Some(period) = (search_from..end).rev().find(|&i| chars[i] == '.') {
                if period > start {
                    end = period + 1;
                }
            }
        }

        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim().to_string();
        if !piece.is_empty() {
            chunks.push(piece);
        }

        start = if end < chars.len() {
            // Overlap with the previous chunk, but always make progress
            end.saturating_sub(overlap).max(start + 1)
        } else {
            end
        };
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_content_single_chunk() {
        let pieces = split_content("A short piece of text.", CHUNK_SIZE, CHUNK_OVERLAP);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0], "A short piece of text.");
    }

    #[test]
    fn test_empty_content_no_chunks() {
        assert!(split_content("   ", CHUNK_SIZE, CHUNK_OVERLAP).is_empty());
    }

    #[test]
    fn test_long_content_splits_on_sentences() {
        let sentence = "Each sentence in this block is reasonably long and self contained. ";
        let content = sentence.repeat(40); // ~2680 chars
        let pieces = split_content(&content, CHUNK_SIZE, CHUNK_OVERLAP);

        assert!(pieces.len() > 1);
        // Every piece except possibly the last ends on a sentence boundary
        for piece in &pieces[..pieces.len() - 1] {
            assert!(piece.ends_with('.'), "piece does not end a sentence: {piece:?}");
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let sentence = "Overlap verification sentence with a stable and distinctive ending marker. ";
        let content = sentence.repeat(40);
        let pieces = split_content(&content, CHUNK_SIZE, CHUNK_OVERLAP);

        for pair in pieces.windows(2) {
            let tail: String = pair[0].chars().rev().take(40).collect::<String>()
                .chars().rev().collect();
            assert!(
                pair[1].contains(tail.trim()),
                "next chunk does not carry the previous tail"
            );
        }
    }

    #[test]
    fn test_chunk_document_indices() {
        let content = "A fairly long sentence used to force chunking behavior. ".repeat(50);
        let doc = ExtractedDocument::ok("https://a.com", "Title", content);
        let chunks = chunk_document("sess", &doc);

        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
            assert_eq!(chunk.total_chunks, chunks.len());
            assert_eq!(chunk.session_id, "sess");
            assert_eq!(chunk.url, "https://a.com");
        }
    }

    proptest! {
        #[test]
        fn prop_chunks_bounded(content in "[a-zA-Z,. ]{0,5000}") {
            let pieces = split_content(&content, CHUNK_SIZE, CHUNK_OVERLAP);
            for piece in &pieces {
                prop_assert!(piece.chars().count() <= CHUNK_SIZE);
                prop_assert!(!piece.trim().is_empty());
            }
        }

        #[test]
        fn prop_deterministic(content in "[a-z .]{0,3000}") {
            let a = split_content(&content, CHUNK_SIZE, CHUNK_OVERLAP);
            let b = split_content(&content, CHUNK_SIZE, CHUNK_OVERLAP);
            prop_assert_eq!(a, b);
        }
    }
}
