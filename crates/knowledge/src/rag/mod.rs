//! Grounded question answering over session documents.

pub mod ask;
pub mod types;

pub use ask::AnswerService;
pub use types::{
    AnswerOutcome, AnswerResult, SourceRef, MODEL_FAILURE_ANSWER, NO_DOCUMENTS_ANSWER,
    NO_RELEVANT_ANSWER,
};
