//! Prompt system for DocQA.
//!
//! This crate assembles the grounded instruction prompt sent to the model:
//! - A fixed default template with two insertion points (context, question)
//! - Optional YAML prompt definitions replacing the default template
//! - Handlebars rendering with escaping disabled (plain-text embedding)
//!
//! Neither the question nor the document text is sanitized before being
//! embedded. Both reach the model verbatim, so uploaded documents and
//! questions can carry prompt-injection payloads.

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{format_context, PromptBuilder, DEFAULT_TEMPLATE};
pub use loader::load_prompt;
pub use types::{BuiltPrompt, ContextPassage, PromptDefinition};
