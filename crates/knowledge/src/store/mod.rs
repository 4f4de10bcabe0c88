//! Per-session document storage.
//!
//! A session is an opaque client-supplied token used as the partition key
//! into storage. There is no session registry: a session exists once a
//! document has been saved under it.

mod local;
mod memory;

pub use local::LocalDocumentStore;
pub use memory::MemoryDocumentStore;

use crate::types::Document;
use docqa_core::{AppError, AppResult};
use std::fmt;
use std::sync::Arc;

/// Session used when the client sends none.
pub const DEFAULT_SESSION: &str = "default";

/// File extensions accepted on upload (lower-case, without the dot).
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

/// A sanitized session identifier, safe to use as a directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Sanitize a raw client token.
    ///
    /// A missing or empty token maps to [`DEFAULT_SESSION`]; every character
    /// outside `[A-Za-z0-9_-]` becomes `_`.
    pub fn sanitize(raw: Option<&str>) -> Self {
        let raw = raw.unwrap_or("");
        if raw.is_empty() {
            return Self(DEFAULT_SESSION.to_string());
        }

        let cleaned = raw
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        Self(cleaned)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self(DEFAULT_SESSION.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage backend for session documents.
///
/// Implementations report failures honestly; callers on the answer path
/// decide when a failure degrades to "empty" instead of failing a request.
pub trait DocumentStore: Send + Sync {
    /// Documents in the session, in upload order.
    ///
    /// An unknown session has no documents.
    fn list(&self, session: &SessionId) -> AppResult<Vec<Document>>;

    /// Full text of one document.
    fn read(&self, session: &SessionId, id: &str) -> AppResult<String>;

    /// Store a new document under a fresh id.
    fn save(&self, session: &SessionId, name: &str, content: &str) -> AppResult<Document>;

    /// Remove a document by exact id.
    ///
    /// # Errors
    /// `AppError::NotFound` if the session holds no document with this id.
    fn delete(&self, session: &SessionId, id: &str) -> AppResult<()>;
}

/// Run a store operation on the blocking thread pool.
///
/// Store implementations do synchronous I/O, which must not stall the async
/// workers serving other requests.
pub async fn run_blocking<T, F>(store: &Arc<dyn DocumentStore>, op: F) -> AppResult<T>
where
    F: FnOnce(&dyn DocumentStore) -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(|| op(store.as_ref())))
        .await
        .map_err(|e| AppError::Storage(format!("Storage task failed: {}", e)))?
}

/// Validate an uploaded file and return its display name and text.
///
/// The name is reduced to its final path component and must carry one of
/// the [`ALLOWED_EXTENSIONS`]. Content must be non-empty UTF-8.
pub fn validate_upload<'a>(file_name: &str, bytes: &'a [u8]) -> AppResult<(String, &'a str)> {
    let name = display_name(file_name);
    if name.is_empty() || bytes.is_empty() {
        return Err(AppError::Validation("No file uploaded".to_string()));
    }

    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::Validation(
            "Unsupported file type. Only .txt and .md files are allowed.".to_string(),
        ));
    }

    let text = std::str::from_utf8(bytes)
        .map_err(|_| AppError::Validation("File is not valid UTF-8 text".to_string()))?;

    Ok((name, text))
}

/// Final path component of a client-supplied file name.
fn display_name(file_name: &str) -> String {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

/// Split a stored file name `<id>-<name>` at the first separator.
pub(crate) fn parse_stored_name(file_name: &str) -> Option<(&str, &str)> {
    let (id, name) = file_name.split_once('-')?;
    if id.is_empty() || name.is_empty() {
        return None;
    }
    Some((id, name))
}

/// Upload-order sort key: numeric ids first, by value.
pub(crate) fn upload_order(doc: &Document) -> (u64, String) {
    (doc.id.parse().unwrap_or(u64::MAX), doc.id.clone())
}

/// First id at or after `now_ms` not already taken.
pub(crate) fn next_id<F>(now_ms: i64, taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut candidate = now_ms;
    while taken(&candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}
