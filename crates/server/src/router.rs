use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use docqa_core::config::normalize_origin;
use docqa_core::AppConfig;
use std::collections::HashSet;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers::{ask_handler, delete_handler, health_handler, list_handler, upload_handler};
use crate::state::{AppState, SESSION_HEADER};

pub fn create_router(state: AppState, config: &AppConfig) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/upload", post(upload_handler))
        .route("/api/documents", get(list_handler))
        .route("/api/documents/{id}", delete(delete_handler))
        .route("/api/ask", post(ask_handler))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(trace_layer)
        .layer(cors_layer(&config.allowed_origins))
        .with_state(state)
}

/// CORS restricted to an origin allow-list, with credentials.
///
/// Origins are compared after trimming and dropping a trailing `/`.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allowed: HashSet<String> = allowed_origins
        .iter()
        .filter_map(|origin| normalize_origin(origin))
        .collect();

    tracing::debug!("CORS allow-list: {:?}", allowed);

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _request| {
                origin
                    .to_str()
                    .ok()
                    .and_then(normalize_origin)
                    .is_some_and(|origin| allowed.contains(&origin))
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(SESSION_HEADER)])
        .allow_credentials(true)
}
