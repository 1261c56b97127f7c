//! Markdown format implementation
//!
//! Bidirectional conversion between the rich tree and Markdown text.
//!
//! # Directions
//!
//! Export (rich → text) is a direct writer over the tree, see
//! [`serializer`]. It is always available.
//!
//! Import (text → rich) goes through two pluggable stages and then reads the
//! resulting markup:
//!
//! ```text
//! body ─▶ MarkupExpander ─▶ MarkupSanitizer ─▶ markup reader ─▶ diagram rewrite ─▶ normalize
//! ```
//!
//! When either stage is missing the converter still exports, but
//! [`MarkdownConverter::from_text`] fails with
//! [`FormatError::CollaboratorMissing`].
//!
//! # Element Mapping Table
//!
//! | Rich node                   | Markdown                          | Import Notes                     |
//! |-----------------------------|-----------------------------------|----------------------------------|
//! | `h1`..`h6`                  | `#`×level (or setext for 1 and 2) | Direct                           |
//! | `p`                         | Paragraph                         | Direct                           |
//! | blank `p`                   | Extra blank line                  | Recovered from blank-line runs   |
//! | `em` / `strong` / `s`       | `_` / `**` / `~~` (`*` in words)  | `del` normalized to `s`          |
//! | `ul` / `ol` / `li`          | `-` / `1.` items                  | `start` kept, tight/loose kept   |
//! | task checkbox               | `[ ]` / `[x]`                     | Direct                           |
//! | `pre > code.language-x`     | Fenced block with info string     | Direct                           |
//! | `Diagram`                   | ```` ```mermaid ```` fence        | Fence rewritten to a diagram     |
//! | `Table`                     | Pipe table                        | First row is the header          |
//! | `Link` / `Image`            | `[text](href "t")` / `![a](src)`  | Direct                           |
//! | `blockquote`                | `> ` prefixed lines               | Direct                           |
//! | `hr`                        | `* * *`                           | Direct                           |
//!
//! # Lossy Conversions
//!
//! - Whitespace inside inline text collapses to single spaces.
//! - Element attributes other than list `start`, code language and checkbox
//!   state are not written.
//! - Blank paragraphs inside blockquotes and list items are dropped on export.
//! - Emphasis whose content starts or ends with punctuation next to a word may
//!   come back with that punctuation outside the emphasis.
//! - Bare email addresses in text come back as `mailto:` links. Bare `www.`
//!   and `scheme://` runs are escaped and stay text.

pub mod escape;
pub mod expander;
pub mod serializer;

use crate::common::header;
use crate::error::FormatError;
use crate::format::Format;
use crate::formats::html::parser::parse_markup;
use crate::formats::html::sanitizer::{DomSanitizer, MarkupSanitizer, SanitizeProfile};
use crate::ir::nodes::RichDocument;
use crate::transforms;
use expander::{ComrakExpander, ExpanderOptions, MarkupExpander};
use serializer::{serialize_to_markdown, SerializerRules};

/// Rich tree ↔ Markdown converter with pluggable import stages.
pub struct MarkdownConverter {
    rules: SerializerRules,
    import: ExpanderOptions,
    profile: SanitizeProfile,
    expander: Option<Box<dyn MarkupExpander>>,
    sanitizer: Option<Box<dyn MarkupSanitizer>>,
}

impl MarkdownConverter {
    /// Converter with the built-in expander and sanitizer.
    pub fn new() -> Self {
        MarkdownConverter {
            rules: SerializerRules::default(),
            import: ExpanderOptions::default(),
            profile: SanitizeProfile::html(),
            expander: Some(Box::new(ComrakExpander)),
            sanitizer: Some(Box::new(DomSanitizer)),
        }
    }

    /// Converter with no import stages: export only.
    pub fn export_only() -> Self {
        MarkdownConverter {
            expander: None,
            sanitizer: None,
            ..Self::new()
        }
    }

    pub fn with_rules(mut self, rules: SerializerRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_import_options(mut self, options: ExpanderOptions) -> Self {
        self.import = options;
        self
    }

    pub fn with_profile(mut self, profile: SanitizeProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_expander(mut self, expander: Option<Box<dyn MarkupExpander>>) -> Self {
        self.expander = expander;
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: Option<Box<dyn MarkupSanitizer>>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn rules(&self) -> &SerializerRules {
        &self.rules
    }

    /// Whether text can be read back into a rich tree.
    pub fn can_import(&self) -> bool {
        self.expander.is_some() && self.sanitizer.is_some()
    }

    /// Serialize a rich tree to Markdown body text.
    pub fn to_text(&self, doc: &RichDocument) -> String {
        serialize_to_markdown(doc, &self.rules)
    }

    /// Read Markdown body text (header already stripped) into a rich tree.
    pub fn from_text(&self, body: &str) -> Result<RichDocument, FormatError> {
        let expander = self
            .expander
            .as_deref()
            .ok_or(FormatError::CollaboratorMissing("markup expander"))?;
        let sanitizer = self
            .sanitizer
            .as_deref()
            .ok_or(FormatError::CollaboratorMissing("markup sanitizer"))?;

        let unsafe_markup = expander.render(body, &self.import)?;
        let markup = sanitizer.sanitize(&unsafe_markup, &self.profile)?;
        tracing::debug!(
            source_len = body.len(),
            markup_len = markup.len(),
            "expanded markdown"
        );

        let mut doc = parse_markup(&markup, Some(body))?;
        transforms::rewrite_diagram_fences(&mut doc, &self.rules.diagram_language);
        transforms::normalize_in_place(&mut doc);
        Ok(doc)
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MarkdownConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkdownConverter")
            .field("rules", &self.rules)
            .field("import", &self.import)
            .field("can_import", &self.can_import())
            .finish()
    }
}

/// Format implementation for Markdown
///
/// Parsing drops a leading metadata header; use [`header::decompose`] to
/// keep it.
#[derive(Debug, Default)]
pub struct MarkdownFormat {
    converter: MarkdownConverter,
}

impl MarkdownFormat {
    pub fn new(converter: MarkdownConverter) -> Self {
        MarkdownFormat { converter }
    }

    pub fn converter(&self) -> &MarkdownConverter {
        &self.converter
    }
}

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "CommonMark Markdown with tables, strikethrough, task lists and diagram fences"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        self.converter.can_import()
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<RichDocument, FormatError> {
        let parsed = header::decompose(source);
        self.converter.from_text(&parsed.body)
    }

    fn serialize(&self, doc: &RichDocument) -> Result<String, FormatError> {
        Ok(self.converter.to_text(doc))
    }
}
