//! HTTP API for DocQA.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/api/health` | Service status |
//! | `POST`   | `/api/upload` | Upload a `.txt`/`.md` file (multipart field `file`) |
//! | `GET`    | `/api/documents` | List the session's documents |
//! | `DELETE` | `/api/documents/{id}` | Delete one document |
//! | `POST`   | `/api/ask` | Answer `{question, targetDocIds?}` from the session's documents |
//!
//! Every request is scoped by the `x-session-id` header (default `default`).
//! Errors are returned as `{"error": "<message>"}`.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::{cors_layer, create_router};
pub use state::{AppState, Session, SESSION_HEADER};

use docqa_core::{AppConfig, AppResult};

/// Start the HTTP server and run until Ctrl-C.
///
/// Documents are stored under `config.data_dir`; the model is built from the
/// `llm` settings. A provider without its API key still starts the server,
/// and questions are then refused with 503.
pub async fn run_server(config: &AppConfig) -> AppResult<()> {
    let state = AppState::from_config(config)?;
    let app = create_router(state, config);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!(
        "DocQA listening on http://{} (provider: {})",
        config.bind,
        config.provider
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
