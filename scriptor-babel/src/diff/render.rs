//! Diff rendering
//!
//! The engine only produces edit scripts; these helpers turn them into the
//! markup a compare panel shows, or into unified-style plain text for
//! terminals.

use super::inline::{InlineDiffSpan, SpanOp};
use super::lines::{LineDiffEntry, LineKind};
use crate::common::text::escape_html;

/// One `<div>` per line: `added`/`removed` classes with `+ `/`- ` prefixes.
pub fn lines_to_html(entries: &[LineDiffEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let line = escape_html(&entry.line);
            match entry.kind {
                LineKind::Insert => format!("<div class=\"added\">+ {line}</div>"),
                LineKind::Delete => format!("<div class=\"removed\">- {line}</div>"),
                LineKind::Context => format!("<div>{line}</div>"),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plain text with `+ `, `- ` and two-space prefixes, one entry per line.
pub fn lines_to_text(entries: &[LineDiffEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let prefix = match entry.kind {
            LineKind::Insert => "+ ",
            LineKind::Delete => "- ",
            LineKind::Context => "  ",
        };
        out.push_str(prefix);
        out.push_str(&entry.line);
        out.push('\n');
    }
    out
}

/// Inline preview: inserted and deleted runs wrapped in marker spans.
pub fn spans_to_html(spans: &[InlineDiffSpan]) -> String {
    let mut out = String::new();
    for span in spans {
        let text = escape_html(&span.text);
        match span.op {
            SpanOp::Equal => out.push_str(&text),
            SpanOp::Insert => out.push_str(&format!("<span class=\"diff-add\">{text}</span>")),
            SpanOp::Delete => out.push_str(&format!("<span class=\"diff-del\">{text}</span>")),
        }
    }
    out
}
