//! Query normalization.
//!
//! Trivial text cleanup ahead of retrieval: case folding, punctuation
//! stripping, and synonym expansion from a static alias table. Pure
//! functions, no side effects; empty input yields an empty result.

use std::collections::BTreeMap;

use unicode_segmentation::UnicodeSegmentation;

/// Recognized normalizer options. All default to on.
#[derive(Debug, Clone, Copy)]
pub struct NormalizerOptions {
    /// Lowercase the input
    pub case_fold: bool,

    /// Remove non-alphanumeric separators
    pub strip_punctuation: bool,

    /// Append known aliases for matched terms
    pub synonym_expand: bool,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            case_fold: true,
            strip_punctuation: true,
            synonym_expand: true,
        }
    }
}

/// A query after normalization. Immutable once created; lives for one
/// request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    /// The raw query as received
    pub raw: String,

    /// The normalized query text
    pub text: String,

    /// Expansion terms drawn from the synonym table
    pub expansion_terms: Vec<String>,
}

/// Static synonym table mapping terms to known aliases.
///
/// Keys are matched against the normalized query: single-word keys match
/// whole tokens, multi-word keys match as phrases. A `BTreeMap` keeps the
/// expansion order deterministic.
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl SynonymTable {
    /// Built-in aliases for the documentation domain.
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();
        let defaults: &[(&str, &[&str])] = &[
            ("chroma", &["chromadb", "vector store"]),
            ("chromadb", &["chroma"]),
            ("embedding", &["embeddings", "vector"]),
            ("init", &["initialize", "setup"]),
            ("initialize", &["init", "setup"]),
            ("llm", &["language model"]),
            ("rag", &["retrieval augmented generation"]),
            ("vector store", &["vector database", "chroma"]),
        ];

        for (term, aliases) in defaults {
            entries.insert(
                (*term).to_string(),
                aliases.iter().map(|a| (*a).to_string()).collect(),
            );
        }

        Self { entries }
    }

    /// Merge extra entries over this table (extra entries win on conflict).
    pub fn with_extra<I>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        for (term, aliases) in extra {
            self.entries.insert(term.to_lowercase(), aliases);
        }
        self
    }

    /// Collect aliases for every table term matched in the normalized text.
    fn expansions(&self, normalized: &str) -> Vec<String> {
        let tokens: Vec<&str> = normalized.unicode_words().collect();
        let mut terms = Vec::new();

        for (term, aliases) in &self.entries {
            let matched = if term.contains(' ') {
                normalized.contains(term.as_str())
            } else {
                tokens.iter().any(|t| t == term)
            };

            if matched {
                for alias in aliases {
                    if !terms.contains(alias) {
                        terms.push(alias.clone());
                    }
                }
            }
        }

        terms
    }
}

/// Query normalizer: options plus the synonym table.
#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    options: NormalizerOptions,
    table: SynonymTable,
}

impl QueryNormalizer {
    /// Create a normalizer with explicit options and synonym table.
    pub fn new(options: NormalizerOptions, table: SynonymTable) -> Self {
        Self { options, table }
    }

    /// Normalize a raw query string.
    ///
    /// Empty input returns the empty normalized string and no expansion
    /// terms; there are no other error conditions.
    pub fn normalize(&self, raw: &str) -> NormalizedQuery {
        if raw.trim().is_empty() {
            return NormalizedQuery {
                raw: raw.to_string(),
                text: String::new(),
                expansion_terms: Vec::new(),
            };
        }

        let mut text = raw.trim().to_string();

        if self.options.case_fold {
            text = text.to_lowercase();
        }

        if self.options.strip_punctuation {
            let replaced: String = text
                .chars()
                .map(|c| if c.is_alphanumeric() { c } else { ' ' })
                .collect();
            text = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
        }

        let expansion_terms = if self.options.synonym_expand {
            self.table.expansions(&text)
        } else {
            Vec::new()
        };

        NormalizedQuery {
            raw: raw.to_string(),
            text,
            expansion_terms,
        }
    }
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        Self::new(NormalizerOptions::default(), SynonymTable::builtin())
    }
}
