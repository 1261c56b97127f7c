//! Format implementations
//!
//! Each format converts between the rich tree and one text representation.

pub mod html;
pub mod markdown;

pub use html::HtmlFormat;
pub use markdown::{MarkdownConverter, MarkdownFormat};
