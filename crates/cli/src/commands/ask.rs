//! Ask command handler.
//!
//! Runs the answer pipeline once against the local data directory.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_knowledge::{AnswerResult, AnswerService, AskOptions, LocalDocumentStore, SessionId};
use std::sync::Arc;

/// Answer a question from a session's documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Session whose documents are searched
    #[arg(short, long)]
    pub session: Option<String>,

    /// Restrict the search to these document ids (repeatable)
    #[arg(long = "doc", value_name = "ID")]
    pub docs: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let store = Arc::new(LocalDocumentStore::new(config.data_dir.clone()));
        let service = AnswerService::from_config(config, store)?;

        let session = SessionId::sanitize(self.session.as_deref());
        let options = AskOptions::new(self.question.clone()).with_targets(self.docs.clone());

        let result = service.ask(&session, &options).await?;

        tracing::debug!("Answer outcome: {}", result.outcome.as_str());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_answer(&result);
        }

        Ok(())
    }
}

fn print_answer(result: &AnswerResult) {
    println!("{}", result.answer);

    if result.sources.is_empty() {
        return;
    }

    println!();
    println!("Sources:");
    for (i, source) in result.sources.iter().enumerate() {
        println!(
            "  [{}] {} (id {}, score {})",
            i + 1,
            source.document_name,
            source.document_id,
            source.score
        );
        println!("      {}", source.snippet.replace('\n', " "));
    }
}
