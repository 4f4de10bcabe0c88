//! Question answering orchestration.
//!
//! Loads the session's documents, chunks and ranks them against the
//! question, and asks the model for a grounded answer. Retrieval problems
//! degrade to fixed answers; only invalid input, a missing model
//! configuration or an unexpected failure reach the caller as errors.

use crate::chunker::chunk_document;
use crate::rag::types::{snippet, AnswerOutcome, AnswerResult, SourceRef, MODEL_FAILURE_ANSWER};
use crate::retriever::retrieve;
use crate::store::{run_blocking, DocumentStore, SessionId};
use crate::types::{AskOptions, Chunk, Document};
use docqa_core::{AppConfig, AppError, AppResult};
use docqa_llm::{complete_with_timeout, create_client, LlmClient, LlmRequest, LlmSettings};
use docqa_prompt::{load_prompt, ContextPassage, PromptBuilder};
use std::sync::Arc;
use std::time::Duration;

/// Answers questions over a session's documents.
pub struct AnswerService {
    store: Arc<dyn DocumentStore>,
    client: Option<Arc<dyn LlmClient>>,
    unavailable_reason: String,
    prompt: PromptBuilder,
    settings: LlmSettings,
}

impl AnswerService {
    /// Service with a ready model client.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        client: Arc<dyn LlmClient>,
        prompt: PromptBuilder,
        settings: LlmSettings,
    ) -> Self {
        Self {
            store,
            client: Some(client),
            unavailable_reason: String::new(),
            prompt,
            settings,
        }
    }

    /// Service without a model. Every question is refused with
    /// `AppError::ModelUnavailable(reason)`.
    pub fn unconfigured(
        store: Arc<dyn DocumentStore>,
        prompt: PromptBuilder,
        settings: LlmSettings,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            store,
            client: None,
            unavailable_reason: reason.into(),
            prompt,
            settings,
        }
    }

    /// Build the service from configuration.
    ///
    /// A provider that lacks its API key yields an unconfigured service, not
    /// an error, so the rest of the application keeps working.
    pub fn from_config(config: &AppConfig, store: Arc<dyn DocumentStore>) -> AppResult<Self> {
        let prompt = match &config.prompt_file {
            Some(path) => {
                let builder = PromptBuilder::from_definition(&load_prompt(path)?)?;
                tracing::info!("Using prompt '{}' from {:?}", builder.prompt_id(), path);
                builder
            }
            None => PromptBuilder::new()?,
        };
        let settings = LlmSettings::from_config(config);

        match create_client(&settings) {
            Ok(client) => Ok(Self::new(store, client, prompt, settings)),
            Err(AppError::ModelUnavailable(reason)) => {
                let reason = match config.api_key_env_name() {
                    Some(var) => format!("{}. Please set {}", reason, var),
                    None => reason,
                };
                tracing::warn!("Answering disabled: {}", reason);
                Ok(Self::unconfigured(store, prompt, settings, reason))
            }
            Err(e) => Err(e),
        }
    }

    /// The document store questions are answered from.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn is_model_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Short model status for health reporting.
    pub fn model_status(&self) -> String {
        match &self.client {
            Some(client) => format!("{} connected", client.provider_name()),
            None => "missing key".to_string(),
        }
    }

    /// Answer a question over the session's documents.
    ///
    /// # Errors
    /// - `AppError::Validation` if the question is blank
    /// - `AppError::ModelUnavailable` if no model is configured
    /// - `AppError::Prompt` if the prompt cannot be rendered
    ///
    /// A failing or timed-out model call is not an error: the result carries
    /// the fallback answer and the computed sources.
    pub async fn ask(&self, session: &SessionId, options: &AskOptions) -> AppResult<AnswerResult> {
        let question = options.question.as_str();
        if question.trim().is_empty() {
            return Err(AppError::Validation("Question is required".to_string()));
        }

        let client = self
            .client
            .as_ref()
            .ok_or_else(|| AppError::ModelUnavailable(self.unavailable_reason.clone()))?;

        tracing::info!("Answering question for session '{}'", session);

        let owned_session = session.clone();
        let targets = options.target_filter().map(<[String]>::to_vec);
        let (document_count, pool) = run_blocking(&self.store, move |store| {
            let documents = load_documents(store, &owned_session, targets.as_deref());
            let pool = chunk_pool(store, &owned_session, &documents);
            Ok((documents.len(), pool))
        })
        .await?;

        tracing::debug!(
            "Chunked {} documents into {} candidate chunks",
            document_count,
            pool.len()
        );

        if pool.is_empty() {
            return Ok(finish(AnswerResult::fixed(question, AnswerOutcome::NoDocuments)));
        }

        let top = retrieve(pool, question);
        if top.is_empty() {
            return Ok(finish(AnswerResult::fixed(
                question,
                AnswerOutcome::NoRelevantChunks,
            )));
        }

        let sources: Vec<SourceRef> = top
            .iter()
            .map(|scored| SourceRef {
                document_id: scored.chunk.document_id.clone(),
                document_name: scored.chunk.document_name.clone(),
                snippet: snippet(&scored.chunk.text),
                score: scored.score,
            })
            .collect();

        let passages: Vec<ContextPassage<'_>> = top
            .iter()
            .map(|scored| ContextPassage {
                document_name: &scored.chunk.document_name,
                text: &scored.chunk.text,
            })
            .collect();
        let prompt = self.prompt.build(question, &passages)?;
        tracing::debug!(
            prompt_id = %prompt.source_prompt_id,
            context_blocks = prompt.context_blocks,
            "Prompt built"
        );

        let request = LlmRequest::new(prompt.text, &self.settings.model)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens);
        let timeout = Duration::from_secs(self.settings.timeout_secs);

        let (answer, outcome) = match complete_with_timeout(client.as_ref(), &request, timeout).await
        {
            Ok(response) => (response.content, AnswerOutcome::Answered),
            Err(e) => {
                tracing::error!(
                    provider = client.provider_name(),
                    "Model call failed, returning fallback answer: {}",
                    e
                );
                let outcome = match e {
                    AppError::Timeout(_) => AnswerOutcome::ModelTimedOut,
                    _ => AnswerOutcome::ModelFailed,
                };
                (MODEL_FAILURE_ANSWER.to_string(), outcome)
            }
        };

        Ok(finish(AnswerResult {
            question: question.to_string(),
            answer,
            sources,
            outcome,
        }))
    }
}

/// Session documents, restricted to the target ids when given.
///
/// A listing failure degrades to no documents.
fn load_documents(
    store: &dyn DocumentStore,
    session: &SessionId,
    targets: Option<&[String]>,
) -> Vec<Document> {
    let documents = match store.list(session) {
        Ok(documents) => documents,
        Err(e) => {
            tracing::warn!("Failed to list documents for session '{}': {}", session, e);
            return Vec::new();
        }
    };

    match targets {
        Some(ids) => documents
            .into_iter()
            .filter(|doc| ids.contains(&doc.id))
            .collect(),
        None => documents,
    }
}

/// Chunk every document into one pool, in document order.
///
/// A document that cannot be read contributes no chunks.
fn chunk_pool(store: &dyn DocumentStore, session: &SessionId, documents: &[Document]) -> Vec<Chunk> {
    let mut pool = Vec::new();
    for doc in documents {
        let text = store.read(session, &doc.id).unwrap_or_else(|e| {
            tracing::warn!("Failed to read document {} ({}): {}", doc.id, doc.name, e);
            String::new()
        });
        pool.extend(chunk_document(&text, &doc.id, &doc.name));
    }
    pool
}

fn finish(result: AnswerResult) -> AnswerResult {
    tracing::info!(
        outcome = result.outcome.as_str(),
        model_called = result.outcome.called_model(),
        sources = result.sources.len(),
        "Answer ready"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::types::{NO_DOCUMENTS_ANSWER, NO_RELEVANT_ANSWER, SNIPPET_CHARS};
    use crate::store::MemoryDocumentStore;
    use docqa_llm::MockLlmClient;

    const PARIS: &str = "Paris is the capital of France and home to the Louvre museum.";
    const BERLIN: &str = "Berlin is the capital of Germany and home to the Pergamon museum.";
    const TOKYO: &str = "Tokyo is the largest metropolitan area in the world by population.";

    fn settings() -> LlmSettings {
        LlmSettings {
            timeout_secs: 1,
            ..LlmSettings::default()
        }
    }

    fn service(store: Arc<MemoryDocumentStore>, client: Arc<MockLlmClient>) -> AnswerService {
        AnswerService::new(store, client, PromptBuilder::new().unwrap(), settings())
    }

    fn store_with(docs: &[(&str, String)]) -> (Arc<MemoryDocumentStore>, Vec<Document>) {
        let store = Arc::new(MemoryDocumentStore::new());
        let saved = docs
            .iter()
            .map(|(name, text)| store.save(&SessionId::default(), name, text).unwrap())
            .collect();
        (store, saved)
    }

    #[tokio::test]
    async fn test_answer_with_ranked_sources() {
        let (store, saved) = store_with(&[("europe.md", format!("{}\n\n{}", PARIS, BERLIN))]);
        let mock = Arc::new(MockLlmClient::with_answer("**Paris**"));
        let service = service(store, mock.clone());

        let result = service
            .ask(&SessionId::default(), &AskOptions::new("capital of France"))
            .await
            .unwrap();

        assert_eq!(result.outcome, AnswerOutcome::Answered);
        assert_eq!(result.answer, "**Paris**");
        assert_eq!(result.sources.len(), 2);
        assert_eq!(result.sources[0].score, 2);
        assert_eq!(result.sources[1].score, 1);
        assert!(result.sources[0].snippet.starts_with("Paris"));
        assert_eq!(result.sources[0].document_id, saved[0].id);
        assert_eq!(result.sources[0].document_name, "europe.md");

        let prompt = mock.last_prompt().unwrap();
        let first = prompt.find(&format!("[Source 1 - europe.md]:\n{}", PARIS)).unwrap();
        let second = prompt.find(&format!("[Source 2 - europe.md]:\n{}", BERLIN)).unwrap();
        assert!(first < second);
        assert!(prompt.contains("capital of France"));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected() {
        let (store, _) = store_with(&[("europe.md", PARIS.to_string())]);
        let mock = Arc::new(MockLlmClient::with_answer("unused"));
        let service = service(store, mock.clone());

        let result = service.ask(&SessionId::default(), &AskOptions::new("   ")).await;
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Question is required"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_model_is_unavailable() {
        let (store, _) = store_with(&[("europe.md", PARIS.to_string())]);
        let service = AnswerService::unconfigured(
            store,
            PromptBuilder::new().unwrap(),
            settings(),
            "Please set GROQ_API_KEY",
        );
        assert!(!service.is_model_configured());
        assert_eq!(service.model_status(), "missing key");

        let result = service
            .ask(&SessionId::default(), &AskOptions::new("capital"))
            .await;
        assert!(matches!(result, Err(AppError::ModelUnavailable(_))));

        // Validation still comes first
        let result = service.ask(&SessionId::default(), &AskOptions::new("")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_no_documents_skips_model() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mock = Arc::new(MockLlmClient::with_answer("unused"));
        let service = service(store, mock.clone());

        let result = service
            .ask(&SessionId::default(), &AskOptions::new("capital of France"))
            .await
            .unwrap();

        assert_eq!(result.outcome, AnswerOutcome::NoDocuments);
        assert_eq!(result.answer, NO_DOCUMENTS_ANSWER);
        assert!(result.sources.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_only_short_fragments_counts_as_no_documents() {
        let (store, _) = store_with(&[("tiny.md", "# Title\n\nToo short.".to_string())]);
        let mock = Arc::new(MockLlmClient::with_answer("unused"));
        let service = service(store, mock.clone());

        let result = service
            .ask(&SessionId::default(), &AskOptions::new("title"))
            .await
            .unwrap();

        assert_eq!(result.outcome, AnswerOutcome::NoDocuments);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_relevant_chunks_skips_model() {
        let (store, _) = store_with(&[("europe.md", PARIS.to_string())]);
        let mock = Arc::new(MockLlmClient::with_answer("unused"));
        let service = service(store, mock.clone());

        let result = service
            .ask(&SessionId::default(), &AskOptions::new("quantum chromodynamics"))
            .await
            .unwrap();

        assert_eq!(result.outcome, AnswerOutcome::NoRelevantChunks);
        assert_eq!(result.answer, NO_RELEVANT_ANSWER);
        assert!(result.sources.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_target_filter() {
        let (store, saved) = store_with(&[
            ("europe.md", PARIS.to_string()),
            ("asia.md", TOKYO.to_string()),
        ]);
        let mock = Arc::new(MockLlmClient::with_answer("ok"));
        let service = service(store, mock.clone());
        let session = SessionId::default();

        // "the" matches both documents; the filter keeps only Asia
        let options = AskOptions::new("the largest").with_targets([saved[1].id.clone()]);
        let result = service.ask(&session, &options).await.unwrap();
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.sources[0].document_name, "asia.md");

        // Unknown ids select nothing
        let options = AskOptions::new("the largest").with_targets(["404"]);
        let result = service.ask(&session, &options).await.unwrap();
        assert_eq!(result.outcome, AnswerOutcome::NoDocuments);

        // An empty filter means every document
        let options = AskOptions::new("the largest").with_targets(Vec::<String>::new());
        let result = service.ask(&session, &options).await.unwrap();
        assert_eq!(result.sources.len(), 2);
        assert_eq!(result.sources[0].document_name, "asia.md");
    }

    #[tokio::test]
    async fn test_model_failure_keeps_sources() {
        let (store, _) = store_with(&[("europe.md", format!("{}\n\n{}", PARIS, BERLIN))]);
        let mock = Arc::new(MockLlmClient::failing("connection reset"));
        let service = service(store, mock.clone());

        let result = service
            .ask(&SessionId::default(), &AskOptions::new("capital of France"))
            .await
            .unwrap();

        assert_eq!(result.outcome, AnswerOutcome::ModelFailed);
        assert_eq!(result.answer, MODEL_FAILURE_ANSWER);
        assert_eq!(result.sources.len(), 2);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_model_timeout_keeps_sources() {
        let (store, _) = store_with(&[("europe.md", PARIS.to_string())]);
        let mock = Arc::new(MockLlmClient::with_answer("late").with_delay(Duration::from_secs(5)));
        let service = service(store, mock.clone());

        let result = service
            .ask(&SessionId::default(), &AskOptions::new("capital"))
            .await
            .unwrap();

        assert_eq!(result.outcome, AnswerOutcome::ModelTimedOut);
        assert_eq!(result.answer, MODEL_FAILURE_ANSWER);
        assert_eq!(result.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_at_most_five_sources() {
        let text = (0..8)
            .map(|i| format!("Paragraph {} mentions the capital city in passing, nothing more.", i))
            .collect::<Vec<_>>()
            .join("\n\n");
        let (store, _) = store_with(&[("many.md", text)]);
        let mock = Arc::new(MockLlmClient::with_answer("ok"));
        let service = service(store, mock.clone());

        let result = service
            .ask(&SessionId::default(), &AskOptions::new("capital"))
            .await
            .unwrap();

        assert_eq!(result.sources.len(), 5);
        assert!(result.sources[0].snippet.starts_with("Paragraph 0"));
        assert!(result.sources[4].snippet.starts_with("Paragraph 4"));
    }

    #[tokio::test]
    async fn test_snippet_is_truncated() {
        let long = format!("The capital {}", "x".repeat(200));
        let (store, _) = store_with(&[("long.md", long)]);
        let service = service(store, Arc::new(MockLlmClient::with_answer("ok")));

        let result = service
            .ask(&SessionId::default(), &AskOptions::new("capital"))
            .await
            .unwrap();

        let snippet = &result.sources[0].snippet;
        assert_eq!(snippet.chars().count(), SNIPPET_CHARS + 3);
        assert!(snippet.ends_with("..."));
    }

    /// Store whose reads fail for one document, and whose listing can fail.
    struct FlakyStore {
        inner: MemoryDocumentStore,
        broken_id: std::sync::Mutex<Option<String>>,
        list_fails: bool,
    }

    impl FlakyStore {
        fn new(list_fails: bool) -> Self {
            Self {
                inner: MemoryDocumentStore::new(),
                broken_id: std::sync::Mutex::new(None),
                list_fails,
            }
        }
    }

    impl DocumentStore for FlakyStore {
        fn list(&self, session: &SessionId) -> AppResult<Vec<Document>> {
            if self.list_fails {
                return Err(AppError::Storage("directory unreadable".to_string()));
            }
            self.inner.list(session)
        }

        fn read(&self, session: &SessionId, id: &str) -> AppResult<String> {
            if self.broken_id.lock().unwrap().as_deref() == Some(id) {
                return Err(AppError::Storage("disk on fire".to_string()));
            }
            self.inner.read(session, id)
        }

        fn save(&self, session: &SessionId, name: &str, content: &str) -> AppResult<Document> {
            self.inner.save(session, name, content)
        }

        fn delete(&self, session: &SessionId, id: &str) -> AppResult<()> {
            self.inner.delete(session, id)
        }
    }

    #[tokio::test]
    async fn test_unreadable_document_is_skipped() {
        let store = Arc::new(FlakyStore::new(false));
        let session = SessionId::default();
        let broken = store.save(&session, "broken.md", PARIS).unwrap();
        store.save(&session, "fine.md", BERLIN).unwrap();
        *store.broken_id.lock().unwrap() = Some(broken.id);

        let mock = Arc::new(MockLlmClient::with_answer("ok"));
        let service = AnswerService::new(store, mock, PromptBuilder::new().unwrap(), settings());

        let result = service
            .ask(&session, &AskOptions::new("capital"))
            .await
            .unwrap();

        assert_eq!(result.outcome, AnswerOutcome::Answered);
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.sources[0].document_name, "fine.md");
    }

    #[tokio::test]
    async fn test_listing_failure_counts_as_no_documents() {
        let store = Arc::new(FlakyStore::new(true));
        let session = SessionId::default();
        store.save(&session, "europe.md", PARIS).unwrap();

        let mock = Arc::new(MockLlmClient::with_answer("unused"));
        let service =
            AnswerService::new(store, mock.clone(), PromptBuilder::new().unwrap(), settings());

        let result = service
            .ask(&session, &AskOptions::new("capital of France"))
            .await
            .unwrap();

        assert_eq!(result.outcome, AnswerOutcome::NoDocuments);
        assert_eq!(result.answer, NO_DOCUMENTS_ANSWER);
        assert!(result.sources.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn test_from_config_without_key_is_unconfigured() {
        let config = AppConfig {
            provider: "groq".to_string(),
            api_key: None,
            api_key_env: Some("DOCQA_TEST_KEY_THAT_IS_NEVER_SET".to_string()),
            ..AppConfig::default()
        };
        let service =
            AnswerService::from_config(&config, Arc::new(MemoryDocumentStore::new())).unwrap();
        assert!(!service.is_model_configured());
    }

    #[test]
    fn test_from_config_with_ollama() {
        let config = AppConfig {
            provider: "ollama".to_string(),
            ..AppConfig::default()
        };
        let service =
            AnswerService::from_config(&config, Arc::new(MemoryDocumentStore::new())).unwrap();
        assert!(service.is_model_configured());
        assert_eq!(service.model_status(), "ollama connected");
    }
}
