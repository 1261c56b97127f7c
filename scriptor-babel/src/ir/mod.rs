//! Rich content tree shared by every format.
//!
//! Formats convert to and from [`nodes::RichDocument`]; the inline
//! normalizer and the session operate on it directly.

pub mod nodes;
