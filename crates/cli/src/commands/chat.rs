//! Chat command handler.
//!
//! Interactive session that folds recent exchanges into each prompt. The
//! citation pipeline itself stays stateless; only the transcript lives
//! across turns.

use clap::Args;
use docschat_core::{AppConfig, AppError, AppResult};
use docschat_rag::ChatTurn;
use std::io::{BufRead, Write};

use super::{build_assembler, print_answer};

/// Transcript entries kept in memory before the oldest are dropped.
const MAX_TRANSCRIPT_TURNS: usize = 32;

/// Interactive chat session with conversation history
#[derive(Args, Debug)]
pub struct ChatCommand {}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting chat session");

        let assembler = build_assembler(config)?;
        let mut history: Vec<ChatTurn> = Vec::new();

        println!("docschat chat (/clear resets history, /quit exits)");

        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();

        loop {
            print!("you> ");
            std::io::stdout().flush()?;

            let line = match lines.next() {
                Some(line) => line?,
                None => break, // EOF
            };
            let input = line.trim();

            match input {
                "" => continue,
                "/quit" | "/exit" => break,
                "/clear" => {
                    history.clear();
                    println!("History cleared.");
                    continue;
                }
                _ => {}
            }

            match assembler.answer_with_history(input, &history).await {
                Ok(answer) => {
                    print_answer(&answer, false)?;
                    println!();

                    history.push(ChatTurn {
                        user: input.to_string(),
                        assistant: answer.text.clone(),
                    });
                    if history.len() > MAX_TRANSCRIPT_TURNS {
                        history.remove(0);
                    }
                }
                Err(AppError::EmptyRetrieval { query }) => {
                    println!("No sources found for: {}", query);
                    println!();
                }
                Err(AppError::Blocked(terms)) => {
                    println!("That query is blocked by the safety filter ({}).", terms);
                    println!();
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!("Chat session ended");
        Ok(())
    }
}
