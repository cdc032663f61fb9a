//! Pure keyword/phrase/proximity relevance scoring.
//!
//! Deterministic and I/O-free: the same functions back the keyword
//! retrieval path and the extractive answerer, and are testable without any
//! network or store.

/// Words carrying no retrieval signal.
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be",
    "because", "been", "before", "but", "by", "can", "could", "did", "do", "does", "for",
    "from", "had", "has", "have", "her", "his", "how", "if", "in", "into", "is", "it",
    "its", "just", "like", "may", "more", "most", "not", "of", "on", "one", "only", "or",
    "other", "our", "out", "over", "should", "so", "some", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "those", "through", "to", "under",
    "up", "was", "were", "what", "when", "where", "which", "who", "why", "will", "with",
    "would", "you", "your",
];

/// Score weight per keyword occurrence.
const KEYWORD_WEIGHT: f32 = 10.0;

/// Score weight per phrase occurrence.
const PHRASE_WEIGHT: f32 = 20.0;

/// Keywords and adjacent-keyword phrases derived from a query.
#[derive(Debug, Clone, Default)]
pub struct QueryTerms {
    /// Stopword-filtered lowercase keywords, in query order
    pub keywords: Vec<String>,

    /// Two-word phrases over consecutive keywords
    pub phrases: Vec<String>,
}

impl QueryTerms {
    /// Whether the query yielded any scorable terms.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Break a query into keywords and phrases.
pub fn tokenize_query(query: &str) -> QueryTerms {
    let keywords: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_string()
        })
        .filter(|w| w.len() > 2 && !STOPWORDS.contains(&w.as_str()))
        .collect();

    let phrases = keywords
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect();

    QueryTerms { keywords, phrases }
}

/// Relevance of a text for the query terms.
///
/// `keyword_hits * 10 + phrase_hits * 20 + proximity_bonus`, where every
/// pair of distinct keywords co-occurring in the text earns a bonus that
/// shrinks with the gap between their first occurrences.
pub fn score_text(terms: &QueryTerms, text: &str) -> f32 {
    if terms.is_empty() {
        return 0.0;
    }
    let lower = text.to_lowercase();

    let keyword_hits: usize = terms
        .keywords
        .iter()
        .map(|kw| lower.matches(kw.as_str()).count())
        .sum();
    let phrase_hits: usize = terms
        .phrases
        .iter()
        .map(|ph| lower.matches(ph.as_str()).count())
        .sum();

    keyword_hits as f32 * KEYWORD_WEIGHT
        + phrase_hits as f32 * PHRASE_WEIGHT
        + proximity_bonus(&terms.keywords, &lower)
}

/// Bonus for distinct keywords appearing close together.
fn proximity_bonus(keywords: &[String], lower_text: &str) -> f32 {
    let positions: Vec<usize> = keywords
        .iter()
        .filter_map(|kw| lower_text.find(kw.as_str()))
        .collect();

    let mut bonus = 0.0;
    for (i, &a) in positions.iter().enumerate() {
        for &b in &positions[i + 1..] {
            let gap = a.abs_diff(b);
            bonus += match gap {
                0..=49 => 20.0,
                50..=99 => 10.0,
                100..=199 => 5.0,
                _ => 0.0,
            };
        }
    }
    bonus
}
