//! LLM provider factory.
//!
//! Builds an LLM client from [`LlmSettings`], resolving the provider name,
//! base URL and credentials.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiCompatibleClient};
use crate::types::{LlmSettings, ProviderType};
use docqa_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the configured provider.
///
/// # Errors
/// Returns:
/// - `AppError::Config` if the provider is unknown or has no endpoint
/// - `AppError::ModelUnavailable` if the provider requires an API key and
///   none was resolved
pub fn create_client(settings: &LlmSettings) -> AppResult<Arc<dyn LlmClient>> {
    let provider = ProviderType::parse(&settings.provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", settings.provider)))?;

    let api_key = settings
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty());

    if provider.requires_api_key() && api_key.is_none() {
        return Err(AppError::ModelUnavailable(format!(
            "{} provider requires an API key",
            provider.as_str()
        )));
    }

    let endpoint = settings
        .endpoint
        .as_deref()
        .or_else(|| provider.default_endpoint())
        .ok_or_else(|| {
            AppError::Config(format!(
                "{} provider requires an endpoint",
                provider.as_str()
            ))
        })?;

    tracing::debug!(provider = provider.as_str(), endpoint, "Creating LLM client");

    let client: Arc<dyn LlmClient> = match provider {
        ProviderType::Ollama => Arc::new(OllamaClient::with_base_url(endpoint)),
        ProviderType::Groq | ProviderType::OpenAI | ProviderType::OpenAiCompatible => Arc::new(
            OpenAiCompatibleClient::new(provider.as_str(), endpoint, api_key),
        ),
    };

    Ok(client)
}
