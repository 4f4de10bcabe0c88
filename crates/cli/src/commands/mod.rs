//! Command handlers for the DocQA CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod docs;
pub mod serve;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use docs::DocsCommand;
pub use serve::ServeCommand;
