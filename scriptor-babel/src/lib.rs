//! Rich text ↔ Markdown conversion and change tracking for Scriptor
//!
//!     This crate is the core of the editor: it converts between the rich content tree the user
//!     edits and the Markdown text that gets persisted, and it tracks how that text drifts from
//!     the last saved version.
//!
//!     This is a pure lib, that is, it powers the scriptor cli but is shell agnostic: no code
//!     should suppose a shell environment, be it std print, env vars etc. Notifications and
//!     draft storage are traits the host provides.
//!
//! Architecture
//!
//!     .
//!     ├── error.rs                # FormatError, SessionError
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── ir                      # The rich content tree
//!     ├── common
//!     │   ├── header.rs           # Metadata header codec
//!     │   ├── dom.rs              # html5ever tree helpers
//!     │   └── text.rs
//!     ├── transforms.rs           # Inline normalizer, diagram fence rewrite
//!     ├── formats
//!     │   ├── markdown            # Converter, serializer, comrak expander
//!     │   └── html                # Sanitizer, markup reader, surface markup writer
//!     ├── diff                    # Line diff engine, inline preview diff, renderers
//!     └── session                 # Change-tracking orchestrator
//!
//! Core Algorithms
//!
//!     Two pieces carry the weight. The Markdown converter must be stable under repeated round
//!     trips and keep the regions a generic converter would mangle (tables, diagram blocks,
//!     blank paragraphs, the metadata header) intact; see ./formats/markdown/mod.rs. The line
//!     diff is a plain LCS table with a fixed tie-break so the same inputs always give the same
//!     script; see ./diff/lines.rs.
//!
//!     Reading Markdown goes through markup: comrak expands it, the sanitizer strips anything
//!     unsafe, and the sanitized markup is read into the rich tree. Writing is direct, from the
//!     tree to text, with no markup in between.
//!
//! Testing
//!
//!     tests
//!     ├── lib.rs
//!     ├── <area>
//!     │   ├── mod.rs
//!     │   └── <testname>.rs
//!     └── fixtures
//!
//!     Rust does not discover tests in subdirectories, so each area is included from tests/lib.rs.

pub mod common;
pub mod diff;
pub mod error;
pub mod format;
pub mod formats;
pub mod ir;
pub mod lint;
pub mod registry;
pub mod session;
pub mod transforms;

pub use common::header::{MetadataHeader, ParsedText};
pub use error::{FormatError, SessionError};
pub use format::Format;
pub use formats::{HtmlFormat, MarkdownConverter, MarkdownFormat};
pub use ir::nodes::{RichDocument, RichNode};
pub use lint::{lint, LintIssue, LintRules};
pub use registry::FormatRegistry;
pub use session::{DirtyState, EditMode, ExportedFile, InputReport, Session, SessionOptions};
