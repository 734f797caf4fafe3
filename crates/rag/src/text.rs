//! Shared text tokenization helpers.
//!
//! The retriever, the claim heuristic, and the citation binder all compare
//! text by content tokens: lowercased unicode words with stop words and
//! very short tokens removed.

use unicode_segmentation::UnicodeSegmentation;

/// Stop words filtered out of content-token comparisons.
const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "you", "your", "can", "how", "what", "when", "where",
    "why", "who", "do", "does", "did", "not", "will",
];

/// Extract content tokens from text: lowercased unicode words, minus stop
/// words and tokens shorter than three characters.
///
/// Word segmentation keeps code identifiers like `chromadb.Client` as a
/// single word, so each word is further split on non-alphanumeric
/// characters; documentation text is full of such identifiers and they
/// must match their parts.
pub fn content_tokens(text: &str) -> Vec<String> {
    text.unicode_words()
        .flat_map(|w| w.split(|c: char| !c.is_alphanumeric()))
        .map(|w| w.to_lowercase())
        .filter(|w| w.len() > 2 && !STOP_WORDS.contains(&w.as_str()))
        .collect()
}
