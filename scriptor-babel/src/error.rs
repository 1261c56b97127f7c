//! Error types for format and session operations

use thiserror::Error;

/// Errors that can occur during format operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Format does not support the requested direction
    #[error("Operation not supported: {0}")]
    NotSupported(String),
    /// A pluggable stage (expander, sanitizer) was not provided
    #[error("Missing collaborator: {0}")]
    CollaboratorMissing(&'static str),
}

/// Errors surfaced by an editing [`Session`](crate::session::Session)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The file offered for loading is neither Markdown nor plain text
    #[error("Unsupported mime type '{mime}' for '{name}'")]
    UnsupportedFile { name: String, mime: String },
    /// Reverse conversion failed; the previous document is kept
    #[error("Failed to parse file: {0}")]
    Load(#[from] FormatError),
}
