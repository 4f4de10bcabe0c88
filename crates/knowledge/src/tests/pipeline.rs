//! End-to-end answering over files on disk.

use crate::chunker::{chunk_document, MIN_CHUNK_CHARS};
use crate::rag::{AnswerOutcome, AnswerService};
use crate::retriever::{score_chunks, select_top, tokenize, TOP_K};
use crate::store::{DocumentStore, LocalDocumentStore, SessionId};
use crate::types::AskOptions;
use docqa_llm::{LlmSettings, MockLlmClient};
use docqa_prompt::PromptBuilder;
use std::sync::Arc;
use tempfile::TempDir;

const HANDBOOK: &str = "\
# Employee Handbook

Vacation policy: every employee receives 25 paid vacation days per calendar year.

Remote work is allowed up to three days per week with manager approval.

Expenses above 500 EUR require a receipt and written approval from finance.
";

const RELEASE_NOTES: &str = "\
Version 2.1 was released on 2024-03-14 and fixes the vacation calendar export.

Version 2.0 introduced the new expenses dashboard and finance approval flow.
";

#[tokio::test]
async fn test_answers_from_local_files() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(LocalDocumentStore::new(temp_dir.path()));
    let session = SessionId::sanitize(Some("team-42"));

    let handbook = store.save(&session, "handbook.md", HANDBOOK).unwrap();
    store.save(&session, "release-notes.txt", RELEASE_NOTES).unwrap();

    let mock = Arc::new(MockLlmClient::with_answer("**25** paid vacation days."));
    let service = AnswerService::new(
        store.clone(),
        mock.clone(),
        PromptBuilder::new().unwrap(),
        LlmSettings::default(),
    );

    let result = service
        .ask(&session, &AskOptions::new("How many vacation days per year?"))
        .await
        .unwrap();

    assert_eq!(result.outcome, AnswerOutcome::Answered);
    assert_eq!(result.answer, "**25** paid vacation days.");
    assert_eq!(result.sources[0].document_id, handbook.id);
    assert_eq!(result.sources[0].document_name, "handbook.md");
    assert!(result.sources[0].score >= result.sources[1].score);
    assert!(mock
        .last_prompt()
        .unwrap()
        .contains("[Source 1 - handbook.md]:\nVacation policy"));

    // The other session sees none of it
    let other = service
        .ask(&SessionId::default(), &AskOptions::new("vacation"))
        .await
        .unwrap();
    assert_eq!(other.outcome, AnswerOutcome::NoDocuments);
}

#[tokio::test]
async fn test_deleted_documents_stop_answering() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(LocalDocumentStore::new(temp_dir.path()));
    let session = SessionId::default();
    let doc = store.save(&session, "handbook.md", HANDBOOK).unwrap();

    let mock = Arc::new(MockLlmClient::with_answer("ok"));
    let service = AnswerService::new(
        store.clone(),
        mock.clone(),
        PromptBuilder::new().unwrap(),
        LlmSettings::default(),
    );

    store.delete(&session, &doc.id).unwrap();
    let result = service
        .ask(&session, &AskOptions::new("vacation"))
        .await
        .unwrap();

    assert_eq!(result.outcome, AnswerOutcome::NoDocuments);
    assert_eq!(mock.call_count(), 0);
}

#[test]
fn test_chunks_are_long_verbatim_substrings() {
    for text in [HANDBOOK, RELEASE_NOTES, "", "short", "\r\n\r\n  \t \n"] {
        for chunk in chunk_document(text, "1", "n") {
            assert!(chunk.text.chars().count() > MIN_CHUNK_CHARS);
            assert!(text.contains(&chunk.text));
        }
    }
}

#[test]
fn test_ranking_over_real_paragraphs() {
    let mut pool = chunk_document(HANDBOOK, "1", "handbook.md");
    pool.extend(chunk_document(RELEASE_NOTES, "2", "release-notes.txt"));
    assert_eq!(pool.len(), 5);

    let top = select_top(score_chunks(pool, &tokenize("finance approval for expenses")), TOP_K);

    // Both expense paragraphs match all three terms; pool order breaks the tie
    assert_eq!(top[0].score, 3);
    assert!(top[0].chunk.text.starts_with("Expenses above"));
    assert_eq!(top[1].score, 3);
    assert!(top[1].chunk.text.starts_with("Version 2.0"));
    assert!(top[2..].iter().all(|s| s.score < 3));
}
