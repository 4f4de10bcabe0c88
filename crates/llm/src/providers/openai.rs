//! OpenAI-compatible chat-completions provider.
//!
//! One client covers every API speaking the OpenAI chat-completions format
//! (Groq, OpenAI, self-hosted gateways). Providers differ only by base URL
//! and API key. The prompt is sent as a single user message.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Chat message in OpenAI format.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Client for any OpenAI-compatible API.
pub struct OpenAiCompatibleClient {
    /// Provider name used in logs ("groq", "openai", ...)
    name: String,

    /// Base URL, e.g. `https://api.groq.com/openai/v1`
    base_url: String,

    /// Bearer token; requests are sent unauthenticated when absent
    api_key: Option<String>,

    /// HTTP client
    client: reqwest::Client,
}

impl OpenAiCompatibleClient {
    /// Create a client for a named provider at the given base URL.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Convert LlmRequest to chat-completions format.
    fn to_chat_request(&self, request: &LlmRequest) -> ChatRequest {
        ChatRequest {
            model: request.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: request.prompt.clone(),
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    /// Convert a chat-completions response.
    ///
    /// A response without `choices[0].message.content` yields an empty
    /// answer rather than an error.
    fn convert_response(&self, response: ChatResponse, requested_model: &str) -> LlmResponse {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default();

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        LlmResponse {
            content,
            model: response
                .model
                .unwrap_or_else(|| requested_model.to_string()),
            usage,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiCompatibleClient {
    fn provider_name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!(provider = %self.name, model = %request.model, "Sending chat completion request");

        let body = self.to_chat_request(request);
        let url = format!("{}/chat/completions", self.base_url);

        let mut builder = self.client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            AppError::Llm(format!("{} connection failed ({}): {}", self.name, url, e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Llm(format!(
                "{} API error ({}): {}",
                self.name, status, error_text
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            AppError::Llm(format!("Failed to parse {} response: {}", self.name, e))
        })?;

        let converted = self.convert_response(chat_response, &request.model);
        tracing::info!(
            provider = %self.name,
            total_tokens = converted.usage.total_tokens,
            "Received chat completion"
        );

        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiCompatibleClient {
        OpenAiCompatibleClient::new(
            "groq",
            "https://api.groq.com/openai/v1/",
            Some("gsk_test".to_string()),
        )
    }

    #[test]
    fn test_client_creation() {
        let client = client();
        assert_eq!(client.provider_name(), "groq");
        assert_eq!(client.base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_chat_request_conversion() {
        let request = LlmRequest::new("What is the capital?", "llama-3.3-70b-versatile")
            .with_temperature(0.1)
            .with_max_tokens(1024);

        let body = client().to_chat_request(&request);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "What is the capital?");
        assert_eq!(json["max_tokens"], 1024);
    }

    #[test]
    fn test_response_conversion() {
        let raw: ChatResponse = serde_json::from_str(
            r#"{
                "model": "llama-3.3-70b-versatile",
                "choices": [{"message": {"role": "assistant", "content": "**Paris**"}}],
                "usage": {"prompt_tokens": 100, "completion_tokens": 4, "total_tokens": 104}
            }"#,
        )
        .unwrap();

        let response = client().convert_response(raw, "fallback");
        assert_eq!(response.content, "**Paris**");
        assert_eq!(response.model, "llama-3.3-70b-versatile");
        assert_eq!(response.usage.total_tokens, 104);
    }

    #[test]
    fn test_missing_content_is_empty_answer() {
        let raw: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();

        let response = client().convert_response(raw, "requested-model");
        assert_eq!(response.content, "");
        assert_eq!(response.model, "requested-model");
    }
}
