//! Docschat CLI
//!
//! Main entry point for the docschat command-line tool: a documentation
//! chatbot whose answers carry segment-level citations into the retrieved
//! sources.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand};
use docschat_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Docschat CLI - documentation Q&A with citation-guaranteed answers
#[derive(Parser, Debug)]
#[command(name = "docschat")]
#[command(about = "Documentation Q&A with citation-guaranteed answers", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (default: ./docschat.yaml)
    #[arg(short, long, global = true, env = "DOCSCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Generation provider (ollama, openai, mock)
    #[arg(short, long, global = true, env = "DOCSCHAT_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "DOCSCHAT_MODEL")]
    model: Option<String>,

    /// Path to the JSONL corpus backing retrieval
    #[arg(long, global = true, env = "DOCSCHAT_CORPUS")]
    corpus: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a single question and print the cited answer
    Ask(AskCommand),

    /// Interactive chat session with conversation history
    Chat(ChatCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from file and environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.config,
        cli.provider,
        cli.model,
        cli.corpus,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    )?;

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Docschat CLI starting");
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
