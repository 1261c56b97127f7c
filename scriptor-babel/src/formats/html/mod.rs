//! HTML format implementation
//!
//! The HTML here is the markup of the rich editing surface, not a publishing
//! target: a flat fragment of block elements that a host loads into and reads
//! back from its editor.
//!
//! # Library Choice
//!
//! We use the `html5ever` + `markup5ever_rcdom` pair for both directions:
//! - `html5ever`: browser-grade HTML5 parser from the Servo project
//! - `markup5ever_rcdom`: reference-counted DOM used to build and serialize
//!
//! Parsing is tolerant of malformed markup, which matters because surface
//! markup comes from contenteditable regions and clipboard pastes.
//!
//! # Element Mapping
//!
//! | Rich node      | HTML                                                     |
//! |----------------|----------------------------------------------------------|
//! | `Element`      | Same tag and attributes                                  |
//! | blank `p`      | `<p><br></p>`                                            |
//! | `Table`        | `<table>` with `<thead>` for leading header rows         |
//! | `Diagram`      | `<div class="mermaid" contenteditable="false" data-code>` |
//! | `Image`        | `<img src alt title>`                                    |
//! | `Link`         | `<a href title>`                                         |
//!
//! Markup read through [`HtmlFormat::parse`] is sanitized first; see
//! [`sanitizer`] for what survives.

pub mod parser;
pub mod sanitizer;
pub mod serializer;

use crate::error::FormatError;
use crate::format::Format;
use crate::ir::nodes::RichDocument;
use sanitizer::{DomSanitizer, MarkupSanitizer, SanitizeProfile};
use serializer::DiagramRenderer;

/// Format implementation for editing-surface HTML
#[derive(Default)]
pub struct HtmlFormat {
    renderer: Option<Box<dyn DiagramRenderer>>,
    profile: SanitizeProfile,
}

impl HtmlFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a renderer used for diagram previews.
    pub fn with_renderer(mut self, renderer: Box<dyn DiagramRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_profile(mut self, profile: SanitizeProfile) -> Self {
        self.profile = profile;
        self
    }
}

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "Rich editing surface markup (HTML fragment)"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<RichDocument, FormatError> {
        let markup = DomSanitizer.sanitize(source, &self.profile)?;
        parser::parse_markup(&markup, None)
    }

    fn serialize(&self, doc: &RichDocument) -> Result<String, FormatError> {
        serializer::serialize_to_html(doc, self.renderer.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::nodes::RichNode;

    #[test]
    fn parse_sanitizes_surface_markup() {
        let doc = HtmlFormat::new()
            .parse(r#"<p onclick="x()">Hi<script>bad()</script></p>"#)
            .expect("parse");
        assert_eq!(
            doc.children,
            vec![RichNode::paragraph(vec![RichNode::text("Hi")])]
        );
    }

    #[test]
    fn surface_round_trip_keeps_diagrams() {
        let format = HtmlFormat::new();
        let doc = RichDocument::new(vec![
            RichNode::paragraph(vec![RichNode::text("before")]),
            RichNode::diagram("graph TD\nA-->B"),
        ]);
        let html = format.serialize(&doc).expect("serialize");
        assert_eq!(format.parse(&html).expect("parse"), doc);
    }
}
