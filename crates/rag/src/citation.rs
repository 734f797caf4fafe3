//! Citation binding.
//!
//! The one component with a real invariant to enforce: every claim-bearing
//! answer segment must carry at least one citation into the chunks
//! retrieved for that query, or be explicitly flagged/redacted/rejected per
//! the configured policy. Binding is a pure function of its inputs: the
//! same segments and chunks always yield identical bindings.

use docschat_core::{AppError, AppResult};

use crate::retrieve::RetrievedChunk;
use crate::text::content_tokens;
use crate::types::{AnswerSegment, Citation, Verification};

/// Text substituted for a claim segment under the `Redact` policy. The
/// marker is explicit so information is never silently dropped.
pub const REDACTION_MARKER: &str = "[redacted: unsupported claim]";

/// Policy for claim-bearing segments with no supporting chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedClaimPolicy {
    /// Fail the whole answer with an UnsupportedClaim error
    Reject,

    /// Replace the segment text with an explicit redaction marker
    Redact,

    /// Emit the segment flagged as unverified (default)
    Flag,
}

impl UnsupportedClaimPolicy {
    /// Parse a policy name from configuration.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "reject" => Some(Self::Reject),
            "redact" => Some(Self::Redact),
            "flag" => Some(Self::Flag),
            _ => None,
        }
    }

    /// Get the canonical policy name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Redact => "redact",
            Self::Flag => "flag",
        }
    }
}

/// Citation binder options.
#[derive(Debug, Clone, Copy)]
pub struct BinderOptions {
    /// Fraction of a segment's content tokens a chunk must contain to
    /// count as support (substring containment always counts)
    pub overlap_threshold: f32,

    /// What to do with claim segments no chunk supports
    pub policy: UnsupportedClaimPolicy,
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.5,
            policy: UnsupportedClaimPolicy::Flag,
        }
    }
}

/// Result of citation binding: rendered text, bound segments, and the
/// overall fully-cited flag.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundAnswer {
    /// Answer text rebuilt from the segments (redactions applied)
    pub text: String,

    /// Segments with their citations and verification status
    pub segments: Vec<AnswerSegment>,

    /// True iff every claim-bearing segment has at least one citation
    pub fully_cited: bool,
}

/// Binds citations to answer segments.
#[derive(Debug, Clone, Default)]
pub struct CitationBinder {
    options: BinderOptions,
}

impl CitationBinder {
    /// Create a binder with explicit options.
    pub fn new(options: BinderOptions) -> Self {
        Self { options }
    }

    /// Bind citations to the given segments using only the chunks retrieved
    /// for this query.
    ///
    /// For each claim-bearing segment the binder locates every chunk whose
    /// text overlaps the segment's content, then applies the
    /// unsupported-claim policy to segments nothing supports. Spans are
    /// recomputed over the rendered text so citations stay valid after
    /// redaction.
    pub fn bind(
        &self,
        segments: Vec<AnswerSegment>,
        chunks: &[RetrievedChunk],
    ) -> AppResult<BoundAnswer> {
        let mut bound = Vec::with_capacity(segments.len());

        for segment in segments {
            if !segment.is_claim {
                bound.push(AnswerSegment {
                    citations: Vec::new(),
                    verification: Verification::NotRequired,
                    ..segment
                });
                continue;
            }

            let supporters: Vec<&RetrievedChunk> = chunks
                .iter()
                .filter(|chunk| self.supports(&segment.text, chunk))
                .collect();

            if supporters.is_empty() {
                match self.options.policy {
                    UnsupportedClaimPolicy::Reject => {
                        return Err(AppError::UnsupportedClaim {
                            segment: segment.text.trim().to_string(),
                        });
                    }
                    UnsupportedClaimPolicy::Redact => {
                        let text = if segment.text.ends_with(char::is_whitespace) {
                            format!("{} ", REDACTION_MARKER)
                        } else {
                            REDACTION_MARKER.to_string()
                        };
                        bound.push(AnswerSegment {
                            text,
                            citations: Vec::new(),
                            verification: Verification::Redacted,
                            ..segment
                        });
                    }
                    UnsupportedClaimPolicy::Flag => {
                        bound.push(AnswerSegment {
                            citations: Vec::new(),
                            verification: Verification::Unverified,
                            ..segment
                        });
                    }
                }
                continue;
            }

            // Citations are filled in once final spans are known
            bound.push(AnswerSegment {
                citations: supporters
                    .iter()
                    .map(|chunk| Citation {
                        chunk_id: chunk.id.clone(),
                        start: 0,
                        end: 0,
                    })
                    .collect(),
                verification: Verification::Cited,
                ..segment
            });
        }

        // Rebuild the answer text and assign spans over it
        let mut text = String::new();
        let mut fully_cited = true;

        for segment in &mut bound {
            segment.start = text.len();
            text.push_str(&segment.text);
            segment.end = text.len();

            for citation in &mut segment.citations {
                citation.start = segment.start;
                citation.end = segment.end;
            }

            if segment.is_claim && segment.citations.is_empty() {
                fully_cited = false;
            }
        }

        Ok(BoundAnswer {
            text,
            segments: bound,
            fully_cited,
        })
    }

    /// Does this chunk support the segment? Either the chunk contains the
    /// segment verbatim (case-insensitive), or enough of the segment's
    /// content tokens appear in the chunk.
    fn supports(&self, segment_text: &str, chunk: &RetrievedChunk) -> bool {
        let segment_lower = segment_text.trim().to_lowercase();
        if segment_lower.is_empty() {
            return false;
        }

        let chunk_lower = chunk.text.to_lowercase();
        if chunk_lower.contains(&segment_lower) {
            return true;
        }

        let segment_tokens = content_tokens(&segment_lower);
        if segment_tokens.is_empty() {
            return false;
        }

        let chunk_tokens: std::collections::HashSet<String> =
            content_tokens(&chunk_lower).into_iter().collect();
        let overlap = segment_tokens
            .iter()
            .filter(|t| chunk_tokens.contains(*t))
            .count();

        overlap as f32 / segment_tokens.len() as f32 >= self.options.overlap_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::segment_answer;

    fn chroma_chunks() -> Vec<RetrievedChunk> {
        vec![
            RetrievedChunk {
                id: "docs/chroma_init.md".to_string(),
                text: "Call chromadb.Client() to initialize a Chroma vector store. \
                       The client persists collections to local disk storage."
                    .to_string(),
                source_url: "https://docs.trychroma.com/getting-started".to_string(),
                score: 0.9,
                section: Some("Getting started".to_string()),
            },
            RetrievedChunk {
                id: "docs/langchain_intro.md".to_string(),
                text: "LangChain is a framework for developing applications powered by \
                       language models."
                    .to_string(),
                source_url: "https://python.langchain.com/docs/".to_string(),
                score: 0.4,
                section: None,
            },
        ]
    }

    #[test]
    fn test_supported_claim_gets_citation() {
        let binder = CitationBinder::default();
        let segments =
            segment_answer("Call chromadb.Client() to initialize a Chroma vector store.");

        let bound = binder.bind(segments, &chroma_chunks()).unwrap();

        assert!(bound.fully_cited);
        let claim = &bound.segments[0];
        assert_eq!(claim.verification, Verification::Cited);
        assert_eq!(claim.citations.len(), 1);
        assert_eq!(claim.citations[0].chunk_id, "docs/chroma_init.md");
    }

    #[test]
    fn test_citation_spans_cover_segment() {
        let binder = CitationBinder::default();
        let text = "Call chromadb.Client() to initialize a Chroma vector store. \
                    LangChain is a framework for developing applications powered by language models.";
        let segments = segment_answer(text);

        let bound = binder.bind(segments, &chroma_chunks()).unwrap();

        for segment in &bound.segments {
            assert_eq!(&bound.text[segment.start..segment.end], segment.text);
            for citation in &segment.citations {
                assert_eq!(citation.start, segment.start);
                assert_eq!(citation.end, segment.end);
            }
        }
    }

    #[test]
    fn test_unsupported_claim_flagged_by_default() {
        let binder = CitationBinder::default();
        let segments = segment_answer("The moon is made entirely of aged cheese wheels.");

        let bound = binder.bind(segments, &chroma_chunks()).unwrap();

        assert!(!bound.fully_cited);
        assert_eq!(bound.segments[0].verification, Verification::Unverified);
        assert!(bound.segments[0].citations.is_empty());
        // Flagged, but the text is preserved
        assert!(bound.text.contains("cheese"));
    }

    #[test]
    fn test_redact_policy_replaces_text() {
        let binder = CitationBinder::new(BinderOptions {
            policy: UnsupportedClaimPolicy::Redact,
            ..BinderOptions::default()
        });
        let text = "The moon is made entirely of aged cheese wheels. \
                    LangChain is a framework for developing applications powered by language models.";
        let segments = segment_answer(text);

        let bound = binder.bind(segments, &chroma_chunks()).unwrap();

        assert!(!bound.fully_cited);
        assert_eq!(bound.segments[0].verification, Verification::Redacted);
        assert!(bound.text.starts_with(REDACTION_MARKER));
        assert!(!bound.text.contains("cheese"));
        // The supported claim survives with its citation
        assert_eq!(bound.segments[1].verification, Verification::Cited);
        assert_eq!(&bound.text[bound.segments[1].start..bound.segments[1].end],
                   bound.segments[1].text);
    }

    #[test]
    fn test_reject_policy_errors() {
        let binder = CitationBinder::new(BinderOptions {
            policy: UnsupportedClaimPolicy::Reject,
            ..BinderOptions::default()
        });
        let segments = segment_answer("The moon is made entirely of aged cheese wheels.");

        let result = binder.bind(segments, &chroma_chunks());
        assert!(matches!(
            result,
            Err(AppError::UnsupportedClaim { .. })
        ));
    }

    #[test]
    fn test_non_claims_need_no_citation() {
        let binder = CitationBinder::default();
        let segments = segment_answer("What is a vector store?");

        let bound = binder.bind(segments, &chroma_chunks()).unwrap();

        assert!(bound.fully_cited);
        assert_eq!(bound.segments[0].verification, Verification::NotRequired);
    }

    #[test]
    fn test_binding_is_idempotent() {
        let binder = CitationBinder::default();
        let text = "Call chromadb.Client() to initialize a Chroma vector store. \
                    The moon is made entirely of aged cheese wheels.";

        let first = binder.bind(segment_answer(text), &chroma_chunks()).unwrap();
        let second = binder.bind(segment_answer(text), &chroma_chunks()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_citations_only_reference_given_chunks() {
        let binder = CitationBinder::default();
        let text = "Call chromadb.Client() to initialize a Chroma vector store. \
                    LangChain is a framework for developing applications powered by language models.";

        let chunks = chroma_chunks();
        let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
        let bound = binder.bind(segment_answer(text), &chunks).unwrap();

        for segment in &bound.segments {
            for citation in &segment.citations {
                assert!(ids.contains(&citation.chunk_id.as_str()));
            }
        }
    }

    #[test]
    fn test_empty_chunk_set_never_fabricates_citations() {
        let binder = CitationBinder::default();
        let segments = segment_answer("Chroma persists collections to local disk storage.");

        let bound = binder.bind(segments, &[]).unwrap();

        assert!(!bound.fully_cited);
        assert!(bound.segments[0].citations.is_empty());
        assert_eq!(bound.segments[0].verification, Verification::Unverified);
    }

    #[test]
    fn test_token_overlap_support_without_substring() {
        let binder = CitationBinder::default();
        // Paraphrase: not a substring of the chunk, but shares most tokens
        let segments =
            segment_answer("You initialize a Chroma vector store by calling chromadb.Client().");

        let bound = binder.bind(segments, &chroma_chunks()).unwrap();

        assert!(bound.fully_cited);
        assert_eq!(bound.segments[0].citations[0].chunk_id, "docs/chroma_init.md");
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            UnsupportedClaimPolicy::parse("flag"),
            Some(UnsupportedClaimPolicy::Flag)
        );
        assert_eq!(
            UnsupportedClaimPolicy::parse("REDACT"),
            Some(UnsupportedClaimPolicy::Redact)
        );
        assert_eq!(
            UnsupportedClaimPolicy::parse("reject"),
            Some(UnsupportedClaimPolicy::Reject)
        );
        assert_eq!(UnsupportedClaimPolicy::parse("ignore"), None);
    }
}
