//! Splitting a knowledge document into passages.

use std::sync::LazyLock;

use regex_lite::Regex;

/// A newline, any run of whitespace (including further newlines), and a
/// closing newline: one or more blank lines.
#[allow(clippy::expect_used)]
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("blank line pattern"));

/// Split `document` on blank lines.
///
/// Runs of blank lines of any length count as one delimiter. Passages that
/// are empty or whitespace-only are dropped; the rest keep their text and
/// document order.
pub fn split_passages(document: &str) -> Vec<String> {
    BLANK_LINES
        .split(document)
        .filter(|passage| !passage.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Split `text` into consecutive windows of at most `window` words.
///
/// Words are whitespace-separated and re-joined with single spaces. A
/// `window` of zero is treated as one.
pub fn split_word_windows(text: &str, window: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(window.max(1))
        .map(|chunk| chunk.join(" "))
        .collect()
}
