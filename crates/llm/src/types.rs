//! LLM configuration types.
//!
//! This module defines the settings used to construct a provider client.

use docqa_core::AppConfig;
use serde::{Deserialize, Serialize};

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Groq,
    OpenAI,
    OpenAiCompatible,
    Ollama,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "groq" => Some(Self::Groq),
            "openai" => Some(Self::OpenAI),
            "openai-compatible" => Some(Self::OpenAiCompatible),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::OpenAI => "openai",
            Self::OpenAiCompatible => "openai-compatible",
            Self::Ollama => "ollama",
        }
    }

    /// Default base URL for the provider.
    pub fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            Self::Groq => Some("https://api.groq.com/openai/v1"),
            Self::OpenAI => Some("https://api.openai.com/v1"),
            Self::OpenAiCompatible => None,
            Self::Ollama => Some("http://localhost:11434"),
        }
    }

    /// Whether the provider refuses requests without an API key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::Groq | Self::OpenAI)
    }
}

/// Everything needed to build a client and issue requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Provider name
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Base URL override
    pub endpoint: Option<String>,

    /// Resolved API key
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Deadline for one completion call
    pub timeout_secs: u64,
}

impl LlmSettings {
    /// Derive settings from application configuration, resolving the key.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            api_key: config.resolve_api_key(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.llm_timeout_secs,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        let config = AppConfig::default();
        Self {
            provider: config.provider,
            model: config.model,
            endpoint: None,
            api_key: None,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.llm_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!(ProviderType::parse("groq"), Some(ProviderType::Groq));
        assert_eq!(ProviderType::parse("OpenAI"), Some(ProviderType::OpenAI));
        assert_eq!(
            ProviderType::parse("openai-compatible"),
            Some(ProviderType::OpenAiCompatible)
        );
        assert_eq!(ProviderType::parse("ollama"), Some(ProviderType::Ollama));
        assert_eq!(ProviderType::parse("unknown"), None);
        assert_eq!(ProviderType::parse("custom"), None);
    }

    #[test]
    fn test_parse_matches_validated_providers() {
        for name in docqa_core::config::KNOWN_PROVIDERS {
            let provider = ProviderType::parse(name).unwrap();
            assert_eq!(provider.as_str(), name);

            let config = AppConfig {
                provider: name.to_string(),
                ..AppConfig::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_requires_api_key() {
        assert!(ProviderType::Groq.requires_api_key());
        assert!(ProviderType::OpenAI.requires_api_key());
        assert!(!ProviderType::Ollama.requires_api_key());
        assert!(!ProviderType::OpenAiCompatible.requires_api_key());
    }

    #[test]
    fn test_settings_from_config() {
        let config = AppConfig {
            api_key: Some("secret".to_string()),
            ..AppConfig::default()
        };
        let settings = LlmSettings::from_config(&config);

        assert_eq!(settings.provider, "groq");
        assert_eq!(settings.api_key, Some("secret".to_string()));
        assert_eq!(settings.max_tokens, 1024);
        assert_eq!(settings.timeout_secs, 60);
    }

    #[test]
    fn test_settings_never_serialize_key() {
        let settings = LlmSettings {
            api_key: Some("secret".to_string()),
            ..LlmSettings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("secret"));
    }
}
