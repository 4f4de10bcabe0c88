//! Docs command handler.
//!
//! Document store operations for one session.

use clap::{Args, Subcommand};
use docqa_core::{config::AppConfig, AppError, AppResult};
use docqa_knowledge::{validate_upload, DocumentStore, LocalDocumentStore, SessionId};
use std::path::{Path, PathBuf};

/// Manage a session's documents
#[derive(Args, Debug)]
pub struct DocsCommand {
    #[command(subcommand)]
    pub action: DocsAction,

    /// Session to operate on
    #[arg(short, long, global = true)]
    pub session: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum DocsAction {
    /// List documents
    List,
    /// Add a .txt or .md file
    Add {
        /// File to add
        path: PathBuf,
    },
    /// Delete a document by id
    Delete {
        /// Document id
        id: String,
    },
}

impl DocsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let store = LocalDocumentStore::new(config.data_dir.clone());
        let session = SessionId::sanitize(self.session.as_deref());

        tracing::info!("Executing docs command for session '{}'", session);

        match &self.action {
            DocsAction::List => self.list(&store, &session),
            DocsAction::Add { path } => self.add(&store, &session, path),
            DocsAction::Delete { id } => self.delete(&store, &session, id),
        }
    }

    fn list(&self, store: &dyn DocumentStore, session: &SessionId) -> AppResult<()> {
        let documents = store.list(session)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&documents)?);
            return Ok(());
        }

        if documents.is_empty() {
            println!("No documents in session '{}'", session);
            return Ok(());
        }

        for doc in &documents {
            println!(
                "{}  {:>10} bytes  {}  {}",
                doc.id,
                doc.size,
                doc.upload_date.format("%Y-%m-%d %H:%M:%S"),
                doc.name
            );
        }
        Ok(())
    }

    fn add(&self, store: &dyn DocumentStore, session: &SessionId, path: &Path) -> AppResult<()> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| AppError::Validation(format!("Not a file: {:?}", path)))?;
        let bytes = std::fs::read(path)?;

        let (name, text) = validate_upload(&file_name, &bytes)?;
        let document = store.save(session, &name, text)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&document)?);
        } else {
            println!(
                "Added {} (id {}, {} bytes)",
                document.name, document.id, document.size
            );
        }
        Ok(())
    }

    fn delete(&self, store: &dyn DocumentStore, session: &SessionId, id: &str) -> AppResult<()> {
        store.delete(session, id)?;

        if self.json {
            println!("{}", serde_json::json!({ "deleted": id }));
        } else {
            println!("Deleted document {}", id);
        }
        Ok(())
    }
}
