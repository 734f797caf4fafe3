//! Error types for the Docschat CLI.
//!
//! This module defines a unified error enum covering every error category
//! in the application: configuration, I/O, retrieval, generation, and the
//! citation-guarantee conditions (empty retrieval, unsupported claims,
//! blocked input).

use thiserror::Error;

/// Unified error type for the Docschat CLI.
///
/// All functions in the application return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Retrieval backend errors (unreachable store, malformed corpus)
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Generation backend errors (provider unreachable or erroring)
    #[error("Generation error: {0}")]
    Generation(String),

    /// The retriever returned no chunks for a query that requires grounding.
    /// This is an explicit status: the generator is never called and no
    /// uncited answer is fabricated.
    #[error("No sources found for query: {query}")]
    EmptyRetrieval { query: String },

    /// A claim-bearing answer segment has no supporting citation.
    /// Only surfaced when the unsupported-claim policy is `Reject`.
    #[error("Unsupported claim in answer: {segment}")]
    UnsupportedClaim { segment: String },

    /// Input rejected by the safety denylist.
    #[error("Query blocked by safety filter: {0}")]
    Blocked(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
