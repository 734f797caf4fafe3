//! LLM integration crate for the Docschat CLI.
//!
//! Provides a provider-agnostic abstraction for the generation side of the
//! answer pipeline. Providers are swappable implementations behind a single
//! trait, selected by configuration.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//! - **OpenAI**: Hosted chat completions API
//! - **Mock**: Deterministic offline client for demos and tests
//! - Claude: config variant reserved, client not yet implemented
//!
//! # Example
//! ```no_run
//! use docschat_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{MockClient, OllamaClient, OpenAiClient};
