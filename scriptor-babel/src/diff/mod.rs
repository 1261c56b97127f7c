//! Change review
//!
//! - [`lines`]: LCS line diff for comparing a document against a baseline file.
//! - [`inline`]: character diff for the live preview of unsaved edits.
//! - [`render`]: markup and text renderings of both.

pub mod inline;
pub mod lines;
pub mod render;

pub use inline::{diff_chars, InlineDiffSpan, SpanOp};
pub use lines::{diff_lines, split_lines, DiffSummary, LineDiffEntry, LineKind};
