//! Error types for DocQA.
//!
//! A single enum covers every failure category in the application. The
//! variants line up with how the HTTP boundary reports them: validation and
//! not-found errors are client errors, a missing model configuration is a
//! service-unavailable condition, and model call failures are normally
//! absorbed by the answer pipeline before they reach a caller.

use thiserror::Error;

/// Unified error type for DocQA.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid caller input (missing question, unsupported file type, ...)
    #[error("{0}")]
    Validation(String),

    /// A referenced resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Document storage failures (directory creation, writes)
    #[error("Storage error: {0}")]
    Storage(String),

    /// The language model is not configured (e.g. missing API key)
    #[error("AI service not configured: {0}")]
    ModelUnavailable(String),

    /// The language model call itself failed
    #[error("LLM error: {0}")]
    Llm(String),

    /// The language model call exceeded its deadline
    #[error("LLM call timed out after {0}s")]
    Timeout(u64),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
