//! Plain string helpers

/// Escape the characters that are significant in HTML text content.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Whitespace separated word count, as shown in the status line.
pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Character count (Unicode scalar values, not bytes).
pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Whitespace that Markdown and HTML collapse; non-breaking space is kept.
pub fn is_collapsible_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c')
}
