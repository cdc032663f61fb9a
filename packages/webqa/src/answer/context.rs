//! Context assembly for model-backed strategies.
//!
//! Chunks are grouped by source URL in first-seen order, scrubbed of markup
//! residue, capped per source, and separated with labeled headers so the
//! model can attribute claims to specific sources.

use indexmap::IndexMap;

use crate::extract::clean;
use crate::types::ScoredChunk;

/// Character budget per source.
pub const SOURCE_CHAR_BUDGET: usize = 4000;

/// Assemble the prompt context block from selected chunks.
pub fn assemble_context(chunks: &[ScoredChunk]) -> String {
    let mut grouped: IndexMap<&str, (&str, Vec<&str>)> = IndexMap::new();
    for scored in chunks {
        grouped
            .entry(scored.chunk.url.as_str())
            .or_insert_with(|| (scored.chunk.title.as_str(), Vec::new()))
            .1
            .push(scored.chunk.text.as_str());
    }

    let mut sections = Vec::with_capacity(grouped.len());
    for (i, (url, (title, texts))) in grouped.iter().enumerate() {
        let combined = clean::scrub_fragment(&texts.join(" "));
        let capped = cap_chars(&combined, SOURCE_CHAR_BUDGET);
        let title = if title.is_empty() { "Untitled" } else { title };
        sections.push(format!("Source {} - {} ({}):\n{}", i + 1, title, url, capped));
    }

    sections.join("\n\n")
}

/// Distinct source URLs in first-seen order.
pub fn source_urls(chunks: &[ScoredChunk]) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for scored in chunks {
        if !urls.contains(&scored.chunk.url) {
            urls.push(scored.chunk.url.clone());
        }
    }
    urls
}

/// Truncate to `max_chars` characters with an ellipsis marker.
pub fn cap_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut capped: String = text.chars().take(max_chars).collect();
    capped.push_str("...");
    capped
}
