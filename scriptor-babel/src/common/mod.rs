//! Format-agnostic building blocks shared by the converters.

pub mod dom;
pub mod header;
pub mod text;
