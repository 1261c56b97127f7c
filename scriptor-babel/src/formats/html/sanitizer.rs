//! Allowlist markup sanitizer
//!
//! The markup is parsed with html5ever, then copied node by node into a fresh
//! tree keeping only what the profile allows:
//!
//! - Script-capable elements (`script`, `style`, `iframe`, `svg`, ...) are
//!   dropped together with their content.
//! - Unknown elements are unwrapped: their children are kept.
//! - Comments, doctypes and processing instructions are dropped.
//! - Attributes outside the allowlist (including every `on*` handler) are
//!   removed; `href`/`src` must use a safe URL scheme.

use crate::common::dom::{self, append, create_element, create_text};
use crate::error::FormatError;
use markup5ever_rcdom::{Handle, NodeData};
use url::Url;

/// Strips script-capable content from untrusted markup.
pub trait MarkupSanitizer: Send + Sync {
    fn sanitize(&self, markup: &str, profile: &SanitizeProfile) -> Result<String, FormatError>;
}

/// Knobs that loosen or tighten the allowlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeProfile {
    /// Keep `data-*` attributes (diagram sources, source positions).
    pub allow_data_attributes: bool,
    /// Keep `data:image/...` URLs on `<img src>`.
    pub allow_data_images: bool,
}

impl SanitizeProfile {
    /// Profile for rich document content.
    pub fn html() -> Self {
        SanitizeProfile {
            allow_data_attributes: true,
            allow_data_images: true,
        }
    }
}

impl Default for SanitizeProfile {
    fn default() -> Self {
        Self::html()
    }
}

const DROPPED_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "frame", "frameset", "object", "embed", "applet", "noscript",
    "template", "svg", "math", "form", "textarea", "select", "button", "head", "title", "link",
    "meta", "base",
];

const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "hr", "h1", "h2", "h3", "h4", "h5", "h6", "strong", "b", "em", "i", "s", "strike",
    "del", "u", "code", "pre", "kbd", "sub", "sup", "mark", "blockquote", "ul", "ol", "li", "a",
    "img", "table", "thead", "tbody", "tfoot", "tr", "th", "td", "caption", "div", "span",
    "section", "figure", "figcaption", "input",
];

const ALLOWED_ATTRIBUTES: &[&str] = &[
    "class",
    "id",
    "title",
    "lang",
    "dir",
    "href",
    "src",
    "alt",
    "align",
    "start",
    "type",
    "checked",
    "disabled",
    "colspan",
    "rowspan",
    "width",
    "height",
    "contenteditable",
];

/// Default sanitizer backed by html5ever
#[derive(Debug, Default, Clone, Copy)]
pub struct DomSanitizer;

impl MarkupSanitizer for DomSanitizer {
    fn sanitize(&self, markup: &str, profile: &SanitizeProfile) -> Result<String, FormatError> {
        let parsed = dom::parse_body(markup)?;
        let clean = create_element("body", vec![]);
        copy_children(parsed.body(), &clean, profile);
        dom::serialize_children(&clean)
    }
}

fn copy_children(source: &Handle, target: &Handle, profile: &SanitizeProfile) {
    for child in source.children.borrow().iter() {
        copy_node(child, target, profile);
    }
}

fn copy_node(node: &Handle, target: &Handle, profile: &SanitizeProfile) {
    match &node.data {
        NodeData::Text { contents } => append(target, create_text(&contents.borrow())),
        NodeData::Element { .. } => {
            let Some(tag) = dom::element_name(node) else {
                return;
            };
            if DROPPED_WITH_CONTENT.contains(&tag.as_str()) {
                return;
            }
            if !ALLOWED_TAGS.contains(&tag.as_str()) {
                copy_children(node, target, profile);
                return;
            }
            let attrs = dom::attributes(node);
            if tag == "input" && !is_checkbox(&attrs) {
                return;
            }
            let kept: Vec<(&str, &str)> = attrs
                .iter()
                .filter(|(name, value)| keep_attribute(&tag, name, value, profile))
                .map(|(name, value)| (name.as_str(), value.as_str()))
                .collect();
            let element = create_element(&tag, kept);
            copy_children(node, &element, profile);
            append(target, element);
        }
        _ => {}
    }
}

fn is_checkbox(attrs: &[(String, String)]) -> bool {
    attrs
        .iter()
        .any(|(name, value)| name == "type" && value.eq_ignore_ascii_case("checkbox"))
}

fn keep_attribute(tag: &str, name: &str, value: &str, profile: &SanitizeProfile) -> bool {
    if name.starts_with("data-") {
        return profile.allow_data_attributes;
    }
    if !ALLOWED_ATTRIBUTES.contains(&name) {
        return false;
    }
    match name {
        "href" | "src" => is_safe_url(tag, name, value, profile),
        _ => true,
    }
}

fn is_safe_url(tag: &str, attribute: &str, value: &str, profile: &SanitizeProfile) -> bool {
    match Url::parse(value.trim()) {
        Ok(url) => match url.scheme() {
            "http" | "https" | "mailto" | "tel" => true,
            "data" => {
                profile.allow_data_images
                    && tag == "img"
                    && attribute == "src"
                    && url.path().starts_with("image/")
            }
            _ => false,
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}
