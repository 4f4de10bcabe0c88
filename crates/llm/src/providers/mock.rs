//! In-process LLM client for tests and offline runs.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use docqa_core::{AppError, AppResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Mock client returning a canned answer or a canned failure.
///
/// Every call is counted and the last prompt is kept so callers can assert
/// whether, and with what, the model was invoked.
#[derive(Debug)]
pub struct MockLlmClient {
    answer: Result<String, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockLlmClient {
    /// A client that always answers with `answer`.
    pub fn with_answer(answer: impl Into<String>) -> Self {
        Self {
            answer: Ok(answer.into()),
            delay: None,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// A client whose every call fails with `AppError::Llm(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            answer: Err(message.into()),
            ..Self::with_answer("")
        }
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `complete` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompt of the most recent call.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_prompt.lock() {
            *guard = Some(request.prompt.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.answer {
            Ok(content) => Ok(LlmResponse {
                content: content.clone(),
                model: request.model.clone(),
                usage: LlmUsage::default(),
            }),
            Err(message) => Err(AppError::Llm(message.clone())),
        }
    }
}
