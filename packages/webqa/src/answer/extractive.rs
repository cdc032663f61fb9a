//! Deterministic extractive answerer.
//!
//! The guaranteed last step of the cascade: no network, no model, no
//! failure modes. Sections of the stored content are scored with the same
//! keyword/phrase/proximity scheme as retrieval; the best sections are
//! deduplicated, regrouped into short paragraphs, and prefixed with a
//! question-type-aware lead-in.

use std::collections::HashSet;

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::error::AnswerResult;
use crate::extract::clean;
use crate::retrieval::scoring::{self, QueryTerms};

use super::{AnswerRequest, Answerer, StrategyAnswer};

/// Total character budget for selected sections.
const MAX_TOTAL_CHARS: usize = 8000;

/// Sentences grouped per output paragraph.
const SENTENCES_PER_PARAGRAPH: usize = 3;

/// Sentences per scored section when a source has no paragraph breaks.
const SENTENCES_PER_SECTION: usize = 3;

const FOUND_CONFIDENCE: f32 = 0.6;
const NOT_FOUND_CONFIDENCE: f32 = 0.2;

/// The always-available, never-failing answer strategy.
pub struct ExtractiveAnswerer;

#[async_trait]
impl Answerer for ExtractiveAnswerer {
    fn name(&self) -> &'static str {
        "extractive"
    }

    async fn answer(&self, request: &AnswerRequest) -> AnswerResult<StrategyAnswer> {
        Ok(extractive_answer(request))
    }
}

/// Build an extractive answer; total function, no failure path.
pub fn extractive_answer(request: &AnswerRequest) -> StrategyAnswer {
    let terms = scoring::tokenize_query(&request.question);

    // One combined text per source, first-seen order
    let mut sources: IndexMap<&str, (&str, String)> = IndexMap::new();
    for scored in &request.context {
        let entry = sources
            .entry(scored.chunk.url.as_str())
            .or_insert_with(|| (scored.chunk.title.as_str(), String::new()));
        if !entry.1.is_empty() {
            entry.1.push(' ');
        }
        entry.1.push_str(&scored.chunk.text);
    }

    let mut sections: Vec<(f32, String)> = Vec::new();
    for (_, (_, text)) in &sources {
        for section in split_sections(text) {
            let score = if terms.is_empty() {
                0.0
            } else {
                scoring::score_text(&terms, &section)
            };
            sections.push((score, section));
        }
    }

    if sections.iter().all(|(score, _)| *score <= 0.0) {
        return not_found_answer(&sources);
    }

    sections.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    // Budgeted selection of the top sections
    let mut selected: Vec<String> = Vec::new();
    let mut total_chars = 0;
    for (score, section) in sections {
        if score <= 0.0 || total_chars + section.len() > MAX_TOTAL_CHARS {
            continue;
        }
        total_chars += section.len();
        selected.push(section);
    }

    let body = regroup_into_paragraphs(&dedup_selected_sentences(&selected));
    if body.is_empty() {
        return not_found_answer(&sources);
    }

    let mut answer = format!("{}\n\n{}", lead_in(&request.question, &terms), body);
    if sources.len() > 1 {
        answer.push_str(&format!(
            "\n\n(Information synthesized from {} different sources)",
            sources.len()
        ));
    }

    StrategyAnswer {
        text: answer,
        confidence: FOUND_CONFIDENCE,
    }
}

/// Split a source's text into scorable sections.
///
/// Paragraph breaks win when present; flat text is windowed into groups of
/// a few sentences so proximity scoring has a meaningful unit.
fn split_sections(text: &str) -> Vec<String> {
    let paragraphs: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if paragraphs.len() > 1 {
        return paragraphs.into_iter().map(str::to_string).collect();
    }

    let sentences = clean::split_sentences(text);
    sentences
        .chunks(SENTENCES_PER_SECTION)
        .map(|group| {
            let mut section = group.join(". ");
            section.push('.');
            section
        })
        .collect()
}

/// Near-duplicate sentence removal across the selected sections.
fn dedup_selected_sentences(sections: &[String]) -> Vec<String> {
    let mut seen: Vec<HashSet<String>> = Vec::new();
    let mut kept: Vec<String> = Vec::new();

    for section in sections {
        for sentence in clean::split_sentences(section) {
            if sentence.len() <= 10 {
                continue;
            }
            let tokens = clean::sentence_tokens(&sentence);
            let duplicate = seen
                .iter()
                .any(|prior| clean::token_overlap(prior, &tokens) > clean::SENTENCE_DUP_THRESHOLD);
            if !duplicate {
                seen.push(tokens);
                kept.push(sentence);
            }
        }
    }

    kept
}

/// Group sentences into short paragraphs for readability.
fn regroup_into_paragraphs(sentences: &[String]) -> String {
    sentences
        .chunks(SENTENCES_PER_PARAGRAPH)
        .map(|group| {
            let mut paragraph = group.join(". ");
            if !paragraph.ends_with(['.', '!', '?']) {
                paragraph.push('.');
            }
            paragraph
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Question-type-aware opening line.
fn lead_in(question: &str, terms: &QueryTerms) -> String {
    let trimmed = question.trim().trim_end_matches(['?', '!', '.']);
    let first_word = trimmed
        .split_whitespace()
        .next()
        .map(|w| w.to_lowercase())
        .unwrap_or_default();

    let subject = if terms.keywords.is_empty() {
        String::new()
    } else {
        terms.keywords.join(" ")
    };

    if subject.is_empty() {
        return "Based on the information provided:".to_string();
    }

    match first_word.as_str() {
        "who" => format!(
            "Based on the information provided, here's what I found about {subject}:"
        ),
        "what" => format!(
            "Based on the information provided, here's what I found about {subject}:"
        ),
        "when" => format!(
            "Based on the information provided, here's the timing information I found about {subject}:"
        ),
        "where" => format!(
            "Based on the information provided, here's the location information I found about {subject}:"
        ),
        "why" => format!(
            "Based on the information provided, here's the explanation I found about {subject}:"
        ),
        "how" => format!(
            "Based on the information provided, here's what I found about how {subject}:"
        ),
        _ => format!(
            "Based on the information provided, here's what I found about {subject}:"
        ),
    }
}

/// Fallback when nothing scores: name what the session does cover.
fn not_found_answer(sources: &IndexMap<&str, (&str, String)>) -> StrategyAnswer {
    let titles: Vec<&str> = sources
        .values()
        .map(|(title, _)| if title.is_empty() { "Untitled" } else { *title })
        .collect();

    let text = if titles.is_empty() {
        "I couldn't find any content to answer your question.".to_string()
    } else {
        format!(
            "I couldn't find information about that in the provided content. \
             The available sources cover: {}.",
            titles.join(", ")
        )
    };

    StrategyAnswer {
        text,
        confidence: NOT_FOUND_CONFIDENCE,
    }
}
