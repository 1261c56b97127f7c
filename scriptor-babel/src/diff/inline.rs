//! Character-level preview diff
//!
//! Used for the live "unsaved changes" preview while editing. It is a
//! different tool from the line diff: spans of characters rather than whole
//! lines, computed by `similar`, and its result type is kept separate so the
//! two outputs cannot be mixed up.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanOp {
    Equal,
    Insert,
    Delete,
}

/// A run of characters sharing one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineDiffSpan {
    pub op: SpanOp,
    pub text: String,
}

/// Character diff from `old` to `new`, adjacent changes of one kind merged.
pub fn diff_chars(old: &str, new: &str) -> Vec<InlineDiffSpan> {
    let diff = TextDiff::from_chars(old, new);
    let mut spans: Vec<InlineDiffSpan> = Vec::new();

    for change in diff.iter_all_changes() {
        let op = match change.tag() {
            ChangeTag::Equal => SpanOp::Equal,
            ChangeTag::Insert => SpanOp::Insert,
            ChangeTag::Delete => SpanOp::Delete,
        };
        match spans.last_mut() {
            Some(last) if last.op == op => last.text.push_str(change.value()),
            _ => spans.push(InlineDiffSpan {
                op,
                text: change.value().to_string(),
            }),
        }
    }
    spans
}
