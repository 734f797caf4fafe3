//! Answer and citation type definitions.

use serde::{Deserialize, Serialize};

/// A structured link between an answer segment and the retrieved chunk that
/// supports it.
///
/// Invariant: `chunk_id` always names a chunk from the set retrieved for the
/// same query. The binder only draws from that set, so citations can never
/// leak across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Identifier of the supporting chunk
    pub chunk_id: String,

    /// Start of the supported span in the answer text (byte offset)
    pub start: usize,

    /// End of the supported span in the answer text (byte offset, exclusive)
    pub end: usize,
}

/// Verification status of an answer segment after citation binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verification {
    /// Segment makes no factual claim; no citation required
    NotRequired,

    /// Claim-bearing segment with at least one supporting citation
    Cited,

    /// Claim-bearing segment emitted with an explicit unverified flag
    Unverified,

    /// Claim-bearing segment replaced by a redaction marker
    Redacted,
}

/// One segment of an answer: a sentence-level span of the generated text
/// with its claim flag and any bound citations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSegment {
    /// Segment text (includes original inter-sentence whitespace)
    pub text: String,

    /// Start offset within the answer text (bytes)
    pub start: usize,

    /// End offset within the answer text (bytes, exclusive)
    pub end: usize,

    /// Whether this segment asserts a factual claim
    pub is_claim: bool,

    /// Citations bound to this segment (empty for non-claims)
    pub citations: Vec<Citation>,

    /// Verification status assigned by the binder
    pub verification: Verification,
}

impl AnswerSegment {
    /// Create an unbound segment, as produced by answer segmentation.
    pub fn new(text: impl Into<String>, start: usize, end: usize, is_claim: bool) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            is_claim,
            citations: Vec::new(),
            verification: Verification::NotRequired,
        }
    }
}

/// Human-readable reference to a cited source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    /// Chunk identifier (e.g., "docs/chroma_init.md#2")
    pub chunk_id: String,

    /// Source URL or path of the document the chunk came from
    pub source_url: String,

    /// Short snippet of the supporting text (truncated)
    pub snippet: String,
}

/// Final response object: answer text, segment-level citations, and the
/// fully-cited flag. Returned to the caller, never persisted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The raw query this answer responds to
    pub query: String,

    /// Rendered answer text (redactions applied, if any)
    pub text: String,

    /// Ordered answer segments with their citations
    pub segments: Vec<AnswerSegment>,

    /// Deduplicated references to the cited sources
    pub sources: Vec<SourceRef>,

    /// True iff every claim-bearing segment has at least one citation
    pub fully_cited: bool,

    /// Model that generated the answer
    pub model: String,
}

/// One completed user/assistant exchange in an interactive session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub user: String,
    pub assistant: String,
}
