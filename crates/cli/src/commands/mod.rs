//! Command handlers for the Docschat CLI.

pub mod ask;
pub mod chat;

pub use ask::AskCommand;
pub use chat::ChatCommand;

use std::sync::Arc;

use docschat_core::{AppConfig, AppError, AppResult};
use docschat_llm::create_client;
use docschat_rag::{Answer, AnswerAssembler, MemoryRetriever, Verification};

/// Build the answer assembler from configuration: corpus-backed retriever
/// plus the configured generation provider.
pub fn build_assembler(config: &AppConfig) -> AppResult<AnswerAssembler> {
    let corpus = config.corpus.as_ref().ok_or_else(|| {
        AppError::Config(
            "No corpus configured. Set `corpus` in docschat.yaml or DOCSCHAT_CORPUS.".to_string(),
        )
    })?;

    let retriever = Arc::new(MemoryRetriever::from_jsonl(corpus)?);
    tracing::debug!("Corpus loaded: {} entries", retriever.len());

    let endpoint = config.resolve_endpoint(&config.provider);
    let api_key = config.resolve_api_key(&config.provider);
    let generator = create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())?;

    AnswerAssembler::from_config(config, retriever, generator)
}

/// Print an answer as JSON or human-readable text.
pub fn print_answer(answer: &Answer, json: bool) -> AppResult<()> {
    if json {
        let output = serde_json::to_string_pretty(answer)
            .map_err(|e| AppError::Serialization(e.to_string()))?;
        println!("{}", output);
        return Ok(());
    }

    println!("{}", answer.text.trim_end());

    let unverified = answer
        .segments
        .iter()
        .filter(|s| s.verification == Verification::Unverified)
        .count();
    if unverified > 0 {
        println!();
        println!(
            "Note: {} statement(s) could not be verified against the sources.",
            unverified
        );
    }

    if !answer.sources.is_empty() {
        println!();
        println!("Sources:");
        for (i, source) in answer.sources.iter().enumerate() {
            if source.source_url.is_empty() {
                println!("  [{}] {}", i + 1, source.chunk_id);
            } else {
                println!("  [{}] {} ({})", i + 1, source.chunk_id, source.source_url);
            }
        }
    }

    Ok(())
}
