//! In-memory document store.

use super::{next_id, upload_order, DocumentStore, SessionId};
use crate::types::Document;
use chrono::Utc;
use docqa_core::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

type Sessions = HashMap<SessionId, Vec<(Document, String)>>;

/// Volatile store, used in tests and when no data directory is wanted.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    sessions: RwLock<Sessions>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_guard(&self) -> AppResult<RwLockReadGuard<'_, Sessions>> {
        self.sessions
            .read()
            .map_err(|_| AppError::Storage("Document store lock poisoned".to_string()))
    }

    fn write_guard(&self) -> AppResult<RwLockWriteGuard<'_, Sessions>> {
        self.sessions
            .write()
            .map_err(|_| AppError::Storage("Document store lock poisoned".to_string()))
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn list(&self, session: &SessionId) -> AppResult<Vec<Document>> {
        let sessions = self.read_guard()?;
        let mut documents: Vec<Document> = sessions
            .get(session)
            .map(|docs| docs.iter().map(|(doc, _)| doc.clone()).collect())
            .unwrap_or_default();
        documents.sort_by_key(upload_order);
        Ok(documents)
    }

    fn read(&self, session: &SessionId, id: &str) -> AppResult<String> {
        let sessions = self.read_guard()?;
        sessions
            .get(session)
            .and_then(|docs| docs.iter().find(|(doc, _)| doc.id == id))
            .map(|(_, content)| content.clone())
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))
    }

    fn save(&self, session: &SessionId, name: &str, content: &str) -> AppResult<Document> {
        let mut sessions = self.write_guard()?;
        let docs = sessions.entry(session.clone()).or_default();

        let id = next_id(Utc::now().timestamp_millis(), |candidate| {
            docs.iter().any(|(doc, _)| doc.id == candidate)
        });
        let document = Document {
            id,
            name: name.to_string(),
            size: content.len() as u64,
            upload_date: Utc::now(),
            path: None,
        };

        docs.push((document.clone(), content.to_string()));
        Ok(document)
    }

    fn delete(&self, session: &SessionId, id: &str) -> AppResult<()> {
        let mut sessions = self.write_guard()?;
        let docs = sessions
            .get_mut(session)
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

        let position = docs
            .iter()
            .position(|(doc, _)| doc.id == id)
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;
        docs.remove(position);
        Ok(())
    }
}
