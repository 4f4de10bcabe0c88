//! Answer response types.

use serde::{Deserialize, Serialize};

/// Answer when the selected documents yield no chunks.
pub const NO_DOCUMENTS_ANSWER: &str = "No documents available for analysis. Please upload files.";

/// Answer when no chunk shares a term with the question.
pub const NO_RELEVANT_ANSWER: &str = "No relevant information found in the active documents.";

/// Answer when the model call fails or times out.
pub const MODEL_FAILURE_ANSWER: &str = "System Error: Neural Link Unstable. Please try again.";

/// Characters of chunk text shown in a source snippet.
pub const SNIPPET_CHARS: usize = 100;

/// A source passage that grounded the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    #[serde(rename = "documentId")]
    pub document_id: String,

    #[serde(rename = "documentName")]
    pub document_name: String,

    /// Leading characters of the chunk followed by `...`
    pub snippet: String,

    /// Lexical relevance score
    pub score: u32,
}

/// How a request left the answer pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// The model produced the answer
    Answered,
    /// No chunks to search; the model was not called
    NoDocuments,
    /// Nothing matched the question; the model was not called
    NoRelevantChunks,
    /// The model call failed; fallback answer with sources
    ModelFailed,
    /// The model call timed out; fallback answer with sources
    ModelTimedOut,
}

impl AnswerOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerOutcome::Answered => "answered",
            AnswerOutcome::NoDocuments => "no_documents",
            AnswerOutcome::NoRelevantChunks => "no_relevant_chunks",
            AnswerOutcome::ModelFailed => "model_failed",
            AnswerOutcome::ModelTimedOut => "model_timed_out",
        }
    }

    /// Whether the model was invoked for this request.
    pub fn called_model(&self) -> bool {
        matches!(
            self,
            AnswerOutcome::Answered | AnswerOutcome::ModelFailed | AnswerOutcome::ModelTimedOut
        )
    }
}

/// Result of answering one question.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerResult {
    /// The question as asked
    #[serde(skip_serializing)]
    pub question: String,

    /// Generated or fixed answer text
    pub answer: String,

    /// Sources in rank order
    pub sources: Vec<SourceRef>,

    /// Internal: pipeline outcome, for logging and tests
    #[serde(skip_serializing)]
    pub outcome: AnswerOutcome,
}

impl AnswerResult {
    /// A short-circuit answer with no sources.
    pub fn fixed(question: &str, outcome: AnswerOutcome) -> Self {
        let answer = match outcome {
            AnswerOutcome::NoDocuments => NO_DOCUMENTS_ANSWER,
            AnswerOutcome::NoRelevantChunks => NO_RELEVANT_ANSWER,
            _ => MODEL_FAILURE_ANSWER,
        };
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            sources: Vec::new(),
            outcome,
        }
    }
}

/// Snippet of a chunk: its first [`SNIPPET_CHARS`] characters plus `...`.
pub fn snippet(text: &str) -> String {
    let mut snippet: String = text.chars().take(SNIPPET_CHARS).collect();
    snippet.push_str("...");
    snippet
}
