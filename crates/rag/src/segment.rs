//! Answer segmentation and claim detection.
//!
//! Splits generated text into sentence-level segments at unicode sentence
//! boundaries and flags the ones that assert a factual claim. Segments
//! partition the input exactly, so concatenating them reproduces it.

use unicode_segmentation::UnicodeSegmentation;

use crate::text::content_tokens;
use crate::types::AnswerSegment;

/// Phrases that mark a segment as a hedge rather than a claim.
const HEDGES: &[&str] = &[
    "could not find",
    "couldn't find",
    "no information",
    "i don't know",
    "do not know",
    "not mentioned in",
];

/// Openers that mark a segment as conversational rather than factual.
const GREETINGS: &[&str] = &[
    "hello", "hi ", "hi!", "hi,", "hey", "thanks", "thank you", "you're welcome",
];

/// Split generated text into ordered answer segments with claim flags.
pub fn segment_answer(text: &str) -> Vec<AnswerSegment> {
    text.split_sentence_bound_indices()
        .map(|(start, sentence)| {
            AnswerSegment::new(sentence, start, start + sentence.len(), is_claim(sentence))
        })
        .collect()
}

/// Heuristic: does this sentence assert a factual claim?
///
/// Questions, greetings, explicit hedges, and fragments with fewer than
/// three content tokens are not claims.
fn is_claim(sentence: &str) -> bool {
    let trimmed = sentence.trim();
    if trimmed.is_empty() || trimmed.ends_with('?') {
        return false;
    }

    let lower = trimmed.to_lowercase();

    if GREETINGS.iter().any(|g| lower.starts_with(g)) {
        return false;
    }

    if HEDGES.iter().any(|h| lower.contains(h)) {
        return false;
    }

    content_tokens(trimmed).len() >= 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_partition_text() {
        let text = "Chroma is a vector database. Call chromadb.Client() to start. Done?";
        let segments = segment_answer(text);

        let rebuilt: String = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(rebuilt, text);
        assert!(segments.len() >= 3);
    }

    #[test]
    fn test_offsets_match_text() {
        let text = "First sentence here. Second sentence follows.";
        let segments = segment_answer(text);

        for segment in &segments {
            assert_eq!(&text[segment.start..segment.end], segment.text);
        }
    }

    #[test]
    fn test_question_is_not_claim() {
        let segments = segment_answer("What is a vector store?");
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].is_claim);
    }

    #[test]
    fn test_factual_sentence_is_claim() {
        let segments = segment_answer("Chroma persists collections to local disk storage.");
        assert_eq!(segments.len(), 1);
        assert!(segments[0].is_claim);
    }

    #[test]
    fn test_hedge_is_not_claim() {
        let segments =
            segment_answer("I could not find this information in the available documentation.");
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].is_claim);
    }

    #[test]
    fn test_greeting_is_not_claim() {
        let segments = segment_answer("Hello there, happy to help with the documentation.");
        assert!(!segments[0].is_claim);
    }

    #[test]
    fn test_short_fragment_is_not_claim() {
        let segments = segment_answer("Yes indeed.");
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].is_claim);
    }

    #[test]
    fn test_empty_text() {
        assert!(segment_answer("").is_empty());
    }
}
