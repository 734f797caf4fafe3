//! Citation-guaranteed RAG core for the Docschat CLI.
//!
//! This crate implements the answer pipeline around one invariant: no
//! claim-bearing answer segment is ever presented as fact without either a
//! citation into the chunks retrieved for that query, or an explicit
//! unverified/redacted flag.
//!
//! Pipeline: query normalization → retrieval (opaque collaborator behind
//! the [`Retriever`] trait) → generation → segmentation → citation binding.

pub mod assemble;
pub mod citation;
pub mod normalize;
pub mod retrieve;
pub mod safety;
pub mod segment;
pub mod text;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use assemble::AnswerAssembler;
pub use citation::{BinderOptions, BoundAnswer, CitationBinder, UnsupportedClaimPolicy};
pub use normalize::{NormalizedQuery, NormalizerOptions, QueryNormalizer, SynonymTable};
pub use retrieve::{CorpusEntry, MemoryRetriever, RetrievedChunk, Retriever};
pub use types::{Answer, AnswerSegment, ChatTurn, Citation, SourceRef, Verification};
