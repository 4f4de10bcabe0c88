//! Document storage, retrieval and grounded answering.
//!
//! The pipeline for one question:
//! 1. Load the session's documents from a [`DocumentStore`]
//! 2. Split each into paragraph chunks ([`chunker`])
//! 3. Rank chunks by lexical overlap with the question ([`retriever`])
//! 4. Render the grounded prompt and call the model ([`AnswerService`])
//!
//! Chunking and ranking are pure functions with no I/O and no logging.

pub mod chunker;
pub mod rag;
pub mod retriever;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunker::chunk_document;
pub use rag::{AnswerOutcome, AnswerResult, AnswerService, SourceRef};
pub use retriever::{retrieve, score_chunks, select_top, tokenize, TOP_K};
pub use store::{
    run_blocking, validate_upload, DocumentStore, LocalDocumentStore, MemoryDocumentStore,
    SessionId,
};
pub use types::{AskOptions, Chunk, Document, ScoredChunk};
