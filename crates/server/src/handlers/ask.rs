use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use docqa_knowledge::{AnswerResult, AskOptions};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::{AppState, Session};

/// Body of `POST /api/ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,

    #[serde(rename = "targetDocIds", default)]
    pub target_doc_ids: Option<Vec<String>>,
}

impl From<AskRequest> for AskOptions {
    fn from(request: AskRequest) -> Self {
        AskOptions {
            question: request.question,
            target_doc_ids: request.target_doc_ids,
        }
    }
}

#[tracing::instrument(skip(state, session, body), fields(session = %session.0))]
pub async fn ask_handler(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AnswerResult>, ApiError> {
    let Json(request) = body?;
    let options = AskOptions::from(request);

    let result = state.answers.ask(&session.0, &options).await?;
    Ok(Json(result))
}
