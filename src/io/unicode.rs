//! Unicode utilities for text shown in summaries.
//!
//! Chat content is arbitrary user text, so truncation has to respect
//! grapheme clusters rather than bytes or chars.

use std::borrow::Cow;
use unicode_segmentation::UnicodeSegmentation;

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "…";

/// Counts the number of grapheme clusters in a string.
///
/// # Examples
///
/// ```
/// use roomscribe::io::unicode::grapheme_count;
///
/// assert_eq!(grapheme_count("Hello"), 5);
/// assert_eq!(grapheme_count("世界"), 2);
/// ```
#[must_use]
pub fn grapheme_count(s: &str) -> usize {
    s.graphemes(true).count()
}

/// Truncates a string at a grapheme cluster boundary.
///
/// Returns at most `max_graphemes` grapheme clusters.
#[must_use]
pub fn truncate_graphemes(s: &str, max_graphemes: usize) -> &str {
    let end_byte = s
        .grapheme_indices(true)
        .nth(max_graphemes)
        .map_or(s.len(), |(offset, _)| offset);
    &s[..end_byte]
}

/// Shortens `s` to `max_graphemes` clusters, ending with [`ELLIPSIS`] when cut.
///
/// # Examples
///
/// ```
/// use roomscribe::io::unicode::preview;
///
/// assert_eq!(preview("short", 10), "short");
/// assert_eq!(preview("a longer sentence", 8), "a longe…");
/// ```
#[must_use]
pub fn preview(s: &str, max_graphemes: usize) -> Cow<'_, str> {
    if max_graphemes == 0 {
        return Cow::Borrowed("");
    }
    let head = truncate_graphemes(s, max_graphemes);
    if head.len() == s.len() {
        return Cow::Borrowed(s);
    }
    let head = truncate_graphemes(head, max_graphemes - 1);
    Cow::Owned(format!("{}{ELLIPSIS}", head.trim_end()))
}

/// Collapses internal line breaks so a message fits on one line.
#[must_use]
pub fn single_line(s: &str) -> Cow<'_, str> {
    if s.contains(['\n', '\r']) {
        Cow::Owned(s.split_whitespace().collect::<Vec<_>>().join(" "))
    } else {
        Cow::Borrowed(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grapheme_count() {
        assert_eq!(grapheme_count("Hello"), 5);
        assert_eq!(grapheme_count("世界"), 2);
        assert_eq!(grapheme_count(""), 0);
        // Family emoji is a single grapheme cluster
        assert_eq!(grapheme_count("👨‍👩‍👧"), 1);
    }

    #[test]
    fn test_truncate_graphemes() {
        assert_eq!(truncate_graphemes("Hello", 3), "Hel");
        assert_eq!(truncate_graphemes("世界!", 2), "世界");
        assert_eq!(truncate_graphemes("Hello", 10), "Hello");
        assert_eq!(truncate_graphemes("Hello", 0), "");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("Hello", 5), "Hello");
        assert_eq!(preview("Hello, world", 6), "Hello…");
        assert_eq!(preview("世界和平", 3), "世界…");
        assert_eq!(preview("anything", 0), "");
    }

    #[test]
    fn test_preview_keeps_emoji_whole() {
        let text = "ok 👨‍👩‍👧 done";
        let cut = preview(text, 5);
        assert!(cut.starts_with("ok 👨‍👩‍👧"));
        assert!(cut.ends_with(ELLIPSIS));
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("one line"), "one line");
        assert_eq!(single_line("first\nsecond\r\nthird"), "first second third");
    }
}
