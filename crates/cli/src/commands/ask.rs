//! Ask command handler.
//!
//! One-shot question answering with segment-level citations.

use clap::Args;
use docschat_core::{AppConfig, AppError, AppResult};
use std::path::PathBuf;

use super::{build_assembler, print_answer};

/// Ask a single question and print the cited answer
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Number of chunks to retrieve (overrides config)
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Output the full structured answer as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let question = self
            .get_question()
            .ok_or_else(|| AppError::Config("No question provided".to_string()))?;

        let mut config = config.clone();
        if let Some(top_k) = self.top_k {
            config.retrieval.top_k = top_k;
        }

        let assembler = build_assembler(&config)?;

        match assembler.answer(&question).await {
            Ok(answer) => print_answer(&answer, self.json),
            Err(AppError::EmptyRetrieval { query }) => {
                // Explicit status, never a fabricated answer
                if self.json {
                    let output = serde_json::json!({
                        "error": "empty_retrieval",
                        "query": query,
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                } else {
                    println!("No sources found for: {}", query);
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Get the question text from the positional argument or a file.
    fn get_question(&self) -> Option<String> {
        self.question.clone().or_else(|| {
            self.file.as_ref().and_then(|path| {
                std::fs::read_to_string(path)
                    .map_err(|e| tracing::error!("Failed to read question file: {}", e))
                    .ok()
            })
        })
    }
}
