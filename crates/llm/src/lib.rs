//! LLM integration crate for DocQA.
//!
//! This crate provides a provider-agnostic abstraction for single-turn text
//! completion. Providers are selected by name through [`create_client`].
//!
//! # Providers
//! - **Groq / OpenAI / OpenAI-compatible**: chat-completions wire format (default: Groq)
//! - **Ollama**: local LLM runtime
//! - **Mock**: in-process client for tests
//!
//! # Example
//! ```no_run
//! use docqa_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{complete_with_timeout, LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{MockLlmClient, OllamaClient, OpenAiCompatibleClient};
pub use types::{LlmSettings, ProviderType};
