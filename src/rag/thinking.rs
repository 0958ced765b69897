// Separation of model reasoning from the visible answer
use regex::Regex;
use std::sync::OnceLock;

/// Opening reasoning delimiter
pub const THINK_OPEN: &str = "<think>";

/// Closing reasoning delimiter
pub const THINK_CLOSE: &str = "</think>";

fn think_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Non-greedy and dot-matches-newline: each open tag pairs with the first close after it
    PATTERN.get_or_init(|| Regex::new(r"(?s)<think>(.*?)</think>").expect("static pattern"))
}

/// Split generated text into `(visible_text, thinking_fragments)`.
///
/// Every `<think>…</think>` span is removed from the visible text and its
/// inner text collected in document order; the remainder is trimmed.
/// An unmatched tag is left in place. Nested tags are not understood: the
/// inner close tag ends the outer span.
pub fn process_message(content: &str) -> (String, Vec<String>) {
    let pattern = think_pattern();

    let thinking = pattern
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();
    let visible = pattern.replace_all(content, "");

    (visible.trim().to_string(), thinking)
}
