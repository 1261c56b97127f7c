//! Markdown → markup expansion
//!
//! The reverse converter never reads Markdown itself; it asks a
//! [`MarkupExpander`] for HTML and reads that back. [`ComrakExpander`] is the
//! built-in implementation.

use crate::error::FormatError;
use comrak::{markdown_to_html, ComrakOptions};

/// Expands Markdown into (possibly unsafe) markup.
pub trait MarkupExpander: Send + Sync {
    fn render(&self, body: &str, options: &ExpanderOptions) -> Result<String, FormatError>;
}

/// Options handed to the expander
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpanderOptions {
    /// Raw HTML in the source is omitted instead of passed through.
    pub disallow_raw_markup: bool,
    /// Bare `https://...` and `www.` URLs become links.
    pub autolink_bare_urls: bool,
    /// Soft line breaks render as `<br>`.
    pub convert_line_breaks: bool,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extensions {
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
}

impl Default for ExpanderOptions {
    fn default() -> Self {
        ExpanderOptions {
            disallow_raw_markup: true,
            autolink_bare_urls: true,
            convert_line_breaks: false,
            extensions: Extensions {
                tables: true,
                strikethrough: true,
                tasklists: true,
            },
        }
    }
}

/// Expander backed by comrak.
///
/// Block elements carry `data-sourcepos` so the reader can recover blank
/// paragraphs from the source layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComrakExpander;

impl ComrakExpander {
    fn comrak_options(options: &ExpanderOptions) -> ComrakOptions<'static> {
        let mut comrak = ComrakOptions::default();
        comrak.extension.table = options.extensions.tables;
        comrak.extension.strikethrough = options.extensions.strikethrough;
        comrak.extension.tasklist = options.extensions.tasklists;
        comrak.extension.autolink = options.autolink_bare_urls;
        comrak.render.unsafe_ = !options.disallow_raw_markup;
        comrak.render.hardbreaks = options.convert_line_breaks;
        comrak.render.sourcepos = true;
        comrak
    }
}

impl MarkupExpander for ComrakExpander {
    fn render(&self, body: &str, options: &ExpanderOptions) -> Result<String, FormatError> {
        Ok(markdown_to_html(body, &Self::comrak_options(options)))
    }
}
