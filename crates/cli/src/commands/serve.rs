//! Serve command handler.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};

/// Start the HTTP API server
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to listen on (default: 0.0.0.0:5000)
    #[arg(short, long)]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command on {}", config.bind);
        docqa_server::run_server(config).await
    }
}
