//! DocQA CLI
//!
//! Main entry point for the docqa command-line tool.
//! Serves the HTTP API and runs the document pipeline from the terminal.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, DocsCommand, ServeCommand};
use docqa_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// DocQA - grounded question answering over uploaded documents
#[derive(Parser, Debug)]
#[command(name = "docqa")]
#[command(about = "Grounded question answering over uploaded documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Root directory for session documents (default: ./uploads)
    #[arg(short, long, global = true, env = "DOCQA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "DOCQA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (groq, openai, openai-compatible, ollama)
    #[arg(short, long, global = true, env = "DOCQA_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "DOCQA_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server
    Serve(ServeCommand),

    /// Answer a question from a session's documents
    Ask(AskCommand),

    /// Manage a session's documents
    Docs(DocsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Defaults, config file, then environment
    let config = AppConfig::load(cli.config)?;

    // Apply CLI overrides
    let bind = match &cli.command {
        Commands::Serve(cmd) => cmd.bind.clone(),
        _ => None,
    };
    let config = config.with_overrides(
        cli.data_dir,
        bind,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.log_format, config.no_color)?;

    config.validate()?;

    tracing::info!("DocQA CLI starting");
    tracing::debug!("Data dir: {:?}", config.data_dir);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Serve(_) => "serve",
        Commands::Ask(_) => "ask",
        Commands::Docs(_) => "docs",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Docs(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
