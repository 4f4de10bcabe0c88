//! Filesystem document store.
//!
//! Layout: `<root>/<session>/<id>-<name>`, where `id` is the upload time in
//! Unix milliseconds.

use super::{next_id, parse_stored_name, upload_order, DocumentStore, SessionId};
use crate::types::Document;
use chrono::{DateTime, Utc};
use docqa_core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Document store backed by one directory per session.
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    /// Store rooted at `root`. Directories are created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_dir(&self, session: &SessionId) -> PathBuf {
        self.root.join(session.as_str())
    }

    fn find(&self, session: &SessionId, id: &str) -> AppResult<Document> {
        self.list(session)?
            .into_iter()
            .find(|doc| doc.id == id)
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))
    }
}

impl DocumentStore for LocalDocumentStore {
    fn list(&self, session: &SessionId) -> AppResult<Vec<Document>> {
        let dir = self.session_dir(session);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                AppError::Storage(format!("Failed to read session directory {:?}: {}", dir, e))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if file_name.starts_with('.') {
                continue;
            }
            let Some((id, name)) = parse_stored_name(&file_name) else {
                continue;
            };

            let metadata = entry.metadata().map_err(|e| {
                AppError::Storage(format!("Failed to stat {:?}: {}", entry.path(), e))
            })?;
            let upload_date = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            documents.push(Document {
                id: id.to_string(),
                name: name.to_string(),
                size: metadata.len(),
                upload_date,
                path: Some(entry.path().to_path_buf()),
            });
        }

        documents.sort_by_key(upload_order);
        Ok(documents)
    }

    fn read(&self, session: &SessionId, id: &str) -> AppResult<String> {
        let doc = self.find(session, id)?;
        let path = doc
            .path
            .ok_or_else(|| AppError::Storage(format!("Document {} has no location", id)))?;
        Ok(fs::read_to_string(path)?)
    }

    fn save(&self, session: &SessionId, name: &str, content: &str) -> AppResult<Document> {
        let dir = self.session_dir(session);
        fs::create_dir_all(&dir).map_err(|e| {
            AppError::Storage(format!("Failed to create session directory {:?}: {}", dir, e))
        })?;

        let existing = self.list(session)?;
        let id = next_id(Utc::now().timestamp_millis(), |candidate| {
            existing.iter().any(|doc| doc.id == candidate)
        });

        let path = dir.join(format!("{}-{}", id, name));
        fs::write(&path, content)
            .map_err(|e| AppError::Storage(format!("Failed to write {:?}: {}", path, e)))?;

        tracing::debug!(session = %session, id = %id, path = ?path, "Stored document");

        Ok(Document {
            id,
            name: name.to_string(),
            size: content.len() as u64,
            upload_date: Utc::now(),
            path: Some(path),
        })
    }

    fn delete(&self, session: &SessionId, id: &str) -> AppResult<()> {
        let doc = self.find(session, id)?;
        if let Some(path) = doc.path {
            fs::remove_file(&path)
                .map_err(|e| AppError::Storage(format!("Failed to delete {:?}: {}", path, e)))?;
        }
        Ok(())
    }
}
