//! Document and retrieval type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An uploaded document, scoped to one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier, unique within the session (upload-time ordered)
    pub id: String,

    /// Display name (original file name)
    pub name: String,

    /// Size in bytes
    pub size: u64,

    /// When the document was stored
    #[serde(rename = "uploadDate")]
    pub upload_date: DateTime<Utc>,

    /// Storage location, when backed by a file
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

/// A paragraph-sized passage of a document.
///
/// Chunks are derived per request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Source document identifier
    pub document_id: String,

    /// Source document display name
    pub document_name: String,

    /// Trimmed passage text
    pub text: String,
}

/// A chunk with its lexical relevance score for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: u32,
}

/// Options for answering a question.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskOptions {
    /// The question to answer
    pub question: String,

    /// Restrict retrieval to these document ids (`None` or empty: all)
    #[serde(rename = "targetDocIds", default)]
    pub target_doc_ids: Option<Vec<String>>,
}

impl AskOptions {
    /// Options for a question over every document in the session.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            target_doc_ids: None,
        }
    }

    /// Restrict retrieval to the given document ids.
    pub fn with_targets<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_doc_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// The active id filter, if any. An empty list means no filter.
    pub fn target_filter(&self) -> Option<&[String]> {
        self.target_doc_ids
            .as_deref()
            .filter(|ids| !ids.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_serialization() {
        let doc = Document {
            id: "1700000000000".to_string(),
            name: "notes.md".to_string(),
            size: 42,
            upload_date: DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
            path: Some(PathBuf::from("/tmp/uploads/default/1700000000000-notes.md")),
        };

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["id"], "1700000000000");
        assert_eq!(json["name"], "notes.md");
        assert_eq!(json["size"], 42);
        assert_eq!(json["uploadDate"], "2024-01-02T03:04:05Z");
        assert!(json.get("path").is_none());
    }

    #[test]
    fn test_ask_options_from_json() {
        let options: AskOptions =
            serde_json::from_str(r#"{"question": "q", "targetDocIds": ["1", "2"]}"#).unwrap();
        assert_eq!(options.target_filter(), Some(&["1".to_string(), "2".to_string()][..]));

        let options: AskOptions = serde_json::from_str(r#"{"question": "q"}"#).unwrap();
        assert_eq!(options.target_filter(), None);
    }

    #[test]
    fn test_empty_target_list_means_no_filter() {
        let options = AskOptions::new("q").with_targets(Vec::<String>::new());
        assert!(options.target_doc_ids.is_some());
        assert_eq!(options.target_filter(), None);
    }
}
