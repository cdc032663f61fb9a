//! Text cleanup for extracted page content.
//!
//! Pages that survive DOM extraction still carry navigation crumbs, repeated
//! template text, and markup residue. The pipeline here runs: line filtering,
//! whitespace and tag scrubbing, repeated-token collapse, punctuation-run
//! collapse, then near-duplicate sentence removal.

use std::collections::HashSet;

use regex::Regex;

/// Minimum characters for a line to survive the line filter.
const MIN_LINE_CHARS: usize = 15;

/// Token-overlap ratio above which two sentences count as duplicates.
pub const SENTENCE_DUP_THRESHOLD: f32 = 0.7;

/// Full cleanup pipeline over raw extracted text.
pub fn clean_text(text: &str) -> String {
    let kept_lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| line.len() >= MIN_LINE_CHARS && line.chars().any(|c| c.is_alphabetic()))
        .collect();
    let joined = kept_lines.join(" ");

    let scrubbed = scrub_fragment(&joined);
    dedup_sentences(&scrubbed)
}

/// Scrub a text fragment without the line filter or sentence dedup.
///
/// Also used on assembled answer context, where chunk boundaries already
/// guarantee sentence-level structure.
pub fn scrub_fragment(text: &str) -> String {
    let no_tags = strip_tags(text);

    // Remove special characters but keep sentence punctuation
    let specials = Regex::new(r#"[^\w\s.,!?;:()'"-]"#).unwrap();
    let no_specials = specials.replace_all(&no_tags, " ");

    let collapsed = collapse_whitespace(&no_specials);

    let tokens: Vec<String> = collapsed
        .split_whitespace()
        .map(collapse_repeated_token)
        .collect();
    let rejoined = tokens.join(" ");

    // Collapse runs of sentence punctuation
    let punct_runs = Regex::new(r"[.,!?;:]{2,}").unwrap();
    punct_runs.replace_all(&rejoined, ".").trim().to_string()
}

/// Collapse all whitespace runs to single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove leftover HTML tags.
pub fn strip_tags(text: &str) -> String {
    let tags = Regex::new(r"<[^>]+>").unwrap();
    tags.replace_all(text, " ").to_string()
}

/// Collapse a token that is a word repeated back-to-back ("wordword" -> "word").
///
/// Only alphabetic tokens are considered and the repeated unit must be at
/// least 3 chars, so natural words like "papa" survive.
pub fn collapse_repeated_token(token: &str) -> String {
    if !token.chars().all(|c| c.is_alphabetic()) {
        return token.to_string();
    }
    let chars: Vec<char> = token.chars().collect();
    let len = chars.len();

    for period in 3..=len / 2 {
        if len % period != 0 {
            continue;
        }
        let unit = &chars[..period];
        if chars.chunks(period).all(|chunk| chunk == unit) {
            return unit.iter().collect();
        }
    }
    token.to_string()
}

/// Remove near-duplicate sentences, preserving first occurrence order.
///
/// Two sentences are duplicates when their token sets overlap above
/// [`SENTENCE_DUP_THRESHOLD`] (Jaccard). Sentences of 10 chars or fewer are
/// dropped outright as navigation fragments.
pub fn dedup_sentences(text: &str) -> String {
    let mut seen: Vec<HashSet<String>> = Vec::new();
    let mut kept: Vec<String> = Vec::new();

    for raw in split_sentences(text) {
        let sentence = raw.trim();
        if sentence.len() <= 10 {
            continue;
        }

        let tokens = sentence_tokens(sentence);
        let duplicate = seen
            .iter()
            .any(|prior| token_overlap(prior, &tokens) > SENTENCE_DUP_THRESHOLD);
        if duplicate {
            continue;
        }

        seen.push(tokens);
        let mut owned = sentence.to_string();
        if !owned.ends_with(['.', '!', '?']) {
            owned.push('.');
        }
        kept.push(owned);
    }

    kept.join(" ")
}

/// Split text into sentences on terminal punctuation.
pub fn split_sentences(text: &str) -> Vec<String> {
    let boundary = Regex::new(r"[.!?]+").unwrap();
    boundary
        .split(text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Jaccard overlap between two token sets.
pub fn token_overlap(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f32 / union as f32
}

/// Lowercased token set of a sentence, punctuation stripped.
pub fn sentence_tokens(sentence: &str) -> HashSet<String> {
    sentence
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Whitespace-collapsed slice of raw text, capped at `max_chars`.
///
/// Used when cleanup destroyed nearly everything but the raw extraction had
/// substance; a capped slice beats a failure record.
pub fn capped_raw(text: &str, max_chars: usize) -> String {
    let collapsed = collapse_whitespace(text);
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    collapsed.chars().take(max_chars).collect()
}
