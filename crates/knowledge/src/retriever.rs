//! Lexical overlap retrieval.
//!
//! A chunk scores one point per question term found anywhere in its
//! lower-cased text. Matching is substring containment, so a term may match
//! inside a longer word. A term repeated in the question counts each time,
//! but repeated occurrences inside the chunk count once.

use crate::types::{Chunk, ScoredChunk};

/// Number of chunks passed to the prompt.
pub const TOP_K: usize = 5;

/// Terms of this many characters or fewer are ignored.
pub const MAX_IGNORED_TERM_CHARS: usize = 2;

/// Split a question into lower-cased terms, in question order.
///
/// Repeated terms are kept.
pub fn tokenize(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split_whitespace()
        .filter(|term| term.chars().count() > MAX_IGNORED_TERM_CHARS)
        .map(str::to_string)
        .collect()
}

/// Score every chunk against the question terms.
///
/// The output keeps the input order and includes zero scores.
pub fn score_chunks(chunks: Vec<Chunk>, terms: &[String]) -> Vec<ScoredChunk> {
    chunks
        .into_iter()
        .map(|chunk| {
            let haystack = chunk.text.to_lowercase();
            let score = terms
                .iter()
                .filter(|term| haystack.contains(term.as_str()))
                .count() as u32;
            ScoredChunk { chunk, score }
        })
        .collect()
}

/// Keep the `k` best chunks with a positive score.
///
/// Sorting is stable, so equal scores keep their pool order. An empty
/// result means nothing in the pool is relevant.
pub fn select_top(scored: Vec<ScoredChunk>, k: usize) -> Vec<ScoredChunk> {
    let mut relevant: Vec<ScoredChunk> = scored.into_iter().filter(|s| s.score > 0).collect();
    relevant.sort_by(|a, b| b.score.cmp(&a.score));
    relevant.truncate(k);
    relevant
}

/// Score a chunk pool against a question and select the top [`TOP_K`].
pub fn retrieve(chunks: Vec<Chunk>, question: &str) -> Vec<ScoredChunk> {
    let terms = tokenize(question);
    select_top(score_chunks(chunks, &terms), TOP_K)
}
