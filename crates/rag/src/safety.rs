//! Safety and content-moderation guardrails.
//!
//! Minimal, extensible stubs wired into the query and answer pipeline:
//! a denylist check on input and length sanitization on output. Swap in a
//! proper classifier or moderation API for production use.

use docschat_core::{AppError, AppResult};

/// Built-in denylist of disallowed substrings.
pub const DEFAULT_DENYLIST: &[&str] = &["illegal", "hack", "bomb", "how to make a weapon"];

/// Check a query against the denylist (built-in entries plus any extras
/// from configuration). Matching is lowercased substring matching.
pub fn check_input(text: &str, extra: &[String]) -> AppResult<()> {
    let lower = text.to_lowercase();

    let mut matches: Vec<&str> = DEFAULT_DENYLIST
        .iter()
        .copied()
        .filter(|term| lower.contains(term))
        .collect();
    matches.extend(
        extra
            .iter()
            .map(String::as_str)
            .filter(|term| lower.contains(&term.to_lowercase())),
    );

    if matches.is_empty() {
        Ok(())
    } else {
        Err(AppError::Blocked(matches.join(", ")))
    }
}

/// Truncate text to at most `max_len` bytes at a word boundary, appending
/// an ellipsis when anything was cut.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }

    // Back off to a char boundary before slicing
    let mut cut = max_len;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }

    let truncated = &text[..cut];
    match truncated.rfind(char::is_whitespace) {
        Some(last_space) => format!("{}...", truncated[..last_space].trim_end()),
        None => format!("{}...", truncated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_input() {
        assert!(check_input("How do I initialize a Chroma vector store?", &[]).is_ok());
    }

    #[test]
    fn test_denylisted_input() {
        let result = check_input("how to make a weapon at home", &[]);
        assert!(matches!(result, Err(AppError::Blocked(_))));
    }

    #[test]
    fn test_extra_denylist_entries() {
        let extra = vec!["forbidden topic".to_string()];
        let result = check_input("Tell me about the Forbidden Topic", &extra);
        assert!(result.is_err());
    }

    #[test]
    fn test_truncate_short_text() {
        assert_eq!(truncate_text("Short text", 100), "Short text");
    }

    #[test]
    fn test_truncate_at_word_boundary() {
        let long = "This is a very long answer that needs to be truncated at some point";
        let result = truncate_text(long, 30);

        assert!(result.len() <= 33); // 30 + "..."
        assert!(result.ends_with("..."));
        assert!(!result.contains("truncated"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "répétition répétition répétition";
        let result = truncate_text(text, 15);
        assert!(result.ends_with("..."));
    }
}
