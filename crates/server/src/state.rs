//! Shared handler state.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use docqa_core::{AppConfig, AppResult};
use docqa_knowledge::{AnswerService, DocumentStore, LocalDocumentStore, SessionId};
use std::convert::Infallible;
use std::sync::Arc;

/// Header carrying the client's session token.
pub const SESSION_HEADER: &str = "x-session-id";

/// State passed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub answers: Arc<AnswerService>,
}

impl AppState {
    /// State sharing the answer service's document store.
    pub fn new(answers: AnswerService) -> Self {
        Self {
            store: Arc::clone(answers.store()),
            answers: Arc::new(answers),
        }
    }

    /// File-backed state rooted at the configured data directory.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let local = LocalDocumentStore::new(config.data_dir.clone());
        tracing::info!("Storing session documents under {:?}", local.root());
        let store: Arc<dyn DocumentStore> = Arc::new(local);
        let answers = AnswerService::from_config(config, store)?;
        Ok(Self::new(answers))
    }
}

/// The sanitized session of a request, from the `x-session-id` header.
#[derive(Debug, Clone)]
pub struct Session(pub SessionId);

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok());
        Ok(Session(SessionId::sanitize(raw)))
    }
}
