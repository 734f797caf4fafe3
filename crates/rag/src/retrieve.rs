//! Retriever interface and the in-memory implementation.
//!
//! Retrieval internals (vector index, embeddings, ranking) are an opaque
//! external collaborator behind the [`Retriever`] trait. The bundled
//! [`MemoryRetriever`] is a deterministic stand-in backed by a JSONL corpus,
//! good enough for demos and tests; it is deliberately not a vector index.

use std::collections::HashSet;
use std::path::Path;

use docschat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::normalize::NormalizedQuery;
use crate::text::content_tokens;

/// A retrievable unit of source text. Owned by the retriever; read-only to
/// downstream components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Identifier, unique within the knowledge base
    pub id: String,

    /// Text span of the chunk
    pub text: String,

    /// Source URL or path of the originating document
    pub source_url: String,

    /// Relevance score assigned by the retriever (higher is better)
    pub score: f32,

    /// Section metadata, when the source document has sections
    pub section: Option<String>,
}

/// Opaque retrieval collaborator.
///
/// `retrieve` returns chunks ordered by descending relevance. An empty
/// result is not an error here; the assembler decides what zero chunks
/// means for the request.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    /// Get the retriever name (e.g., "memory").
    fn name(&self) -> &str;

    /// Retrieve up to `k` chunks relevant to the normalized query.
    async fn retrieve(&self, query: &NormalizedQuery, k: usize) -> AppResult<Vec<RetrievedChunk>>;
}

/// One corpus entry as stored in the JSONL file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusEntry {
    /// Chunk identifier (e.g., "docs/chroma_init.md")
    pub id: String,

    /// Chunk text
    pub text: String,

    /// Source URL or path
    #[serde(default)]
    pub source_url: String,

    /// Optional section label
    #[serde(default)]
    pub section: Option<String>,
}

/// Deterministic in-memory retriever scored by content-token overlap.
pub struct MemoryRetriever {
    entries: Vec<CorpusEntry>,
}

impl MemoryRetriever {
    /// Create a retriever over the given corpus entries.
    pub fn new(entries: Vec<CorpusEntry>) -> Self {
        Self { entries }
    }

    /// Load a corpus from a JSONL file, one entry per non-empty line.
    pub fn from_jsonl(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Retrieval(format!("Failed to read corpus {:?}: {}", path, e))
        })?;

        let mut entries = Vec::new();
        for (lineno, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry: CorpusEntry = serde_json::from_str(line).map_err(|e| {
                AppError::Retrieval(format!(
                    "Malformed corpus entry at {:?}:{}: {}",
                    path,
                    lineno + 1,
                    e
                ))
            })?;
            entries.push(entry);
        }

        tracing::info!("Loaded {} corpus entries from {:?}", entries.len(), path);
        Ok(Self { entries })
    }

    /// Number of entries in the corpus.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fraction of query tokens found in the entry text.
    fn score(query_tokens: &HashSet<String>, entry: &CorpusEntry) -> f32 {
        if query_tokens.is_empty() {
            return 0.0;
        }

        let entry_tokens: HashSet<String> = content_tokens(&entry.text).into_iter().collect();
        let overlap = query_tokens.intersection(&entry_tokens).count();

        overlap as f32 / query_tokens.len() as f32
    }
}

#[async_trait::async_trait]
impl Retriever for MemoryRetriever {
    fn name(&self) -> &str {
        "memory"
    }

    async fn retrieve(&self, query: &NormalizedQuery, k: usize) -> AppResult<Vec<RetrievedChunk>> {
        let mut query_tokens: HashSet<String> =
            content_tokens(&query.text).into_iter().collect();
        for term in &query.expansion_terms {
            query_tokens.extend(content_tokens(term));
        }

        if query_tokens.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f32, &CorpusEntry)> = self
            .entries
            .iter()
            .map(|entry| (Self::score(&query_tokens, entry), entry))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        // Order by score, ties broken by id so results are stable
        scored.sort_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then_with(|| a.1.id.cmp(&b.1.id))
        });
        scored.truncate(k);

        tracing::debug!(
            "Memory retriever matched {} chunks for query '{}'",
            scored.len(),
            query.text
        );

        Ok(scored
            .into_iter()
            .map(|(score, entry)| RetrievedChunk {
                id: entry.id.clone(),
                text: entry.text.clone(),
                source_url: entry.source_url.clone(),
                score,
                section: entry.section.clone(),
            })
            .collect())
    }
}
