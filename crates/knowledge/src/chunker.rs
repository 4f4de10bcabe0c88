//! Paragraph chunking.

use crate::types::Chunk;
use regex::Regex;
use std::sync::LazyLock;

/// Fragments of this many characters or fewer are discarded.
pub const MIN_CHUNK_CHARS: usize = 50;

/// Any whitespace run containing a blank line.
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph break pattern is valid"));

/// Split a document into paragraph chunks.
///
/// Fragments are trimmed and kept only when longer than
/// [`MIN_CHUNK_CHARS`] characters. Output follows document order and is a
/// pure function of the input.
pub fn chunk_document(text: &str, document_id: &str, document_name: &str) -> Vec<Chunk> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|fragment| fragment.chars().count() > MIN_CHUNK_CHARS)
        .map(|fragment| Chunk {
            document_id: document_id.to_string(),
            document_name: document_name.to_string(),
            text: fragment.to_string(),
        })
        .collect()
}
