use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use docqa_knowledge::{run_blocking, validate_upload, Document};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::{AppState, Session};

/// Multipart field holding the uploaded file.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub document: Document,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[tracing::instrument(skip(state, session, multipart), fields(session = %session.0))]
pub async fn upload_handler(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        let (name, text) = validate_upload(&file_name, &bytes)?;
        let text = text.to_string();

        let session = session.0.clone();
        let document =
            run_blocking(&state.store, move |store| store.save(&session, &name, &text)).await?;
        tracing::info!(id = %document.id, name = %document.name, size = document.size, "Document uploaded");

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                message: "File uploaded successfully".to_string(),
                document,
            }),
        ));
    }

    tracing::warn!("Upload request with no file");
    Err(ApiError::bad_request("No file uploaded"))
}

pub async fn list_handler(State(state): State<AppState>, session: Session) -> Json<Vec<Document>> {
    let Session(session) = session;
    let listing = {
        let session = session.clone();
        run_blocking(&state.store, move |store| store.list(&session)).await
    };
    let documents = listing.unwrap_or_else(|e| {
        tracing::warn!("Failed to list documents for session '{}': {}", session, e);
        Vec::new()
    });
    Json(documents)
}

#[tracing::instrument(skip(state, session), fields(session = %session.0))]
pub async fn delete_handler(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let session = session.0;
    run_blocking(&state.store, move |store| store.delete(&session, &id)).await?;
    tracing::info!("Document deleted");

    Ok(Json(MessageResponse {
        message: "Document deleted successfully".to_string(),
    }))
}
