//! Tree rewrites applied between parsing and serialization
//!
//! [`normalize`] canonicalizes markup variants an editing surface produces for
//! the same formatting, so the text converter only has to know one spelling:
//!
//! | Input                                  | Output         |
//! |----------------------------------------|----------------|
//! | `<b>`                                  | `<strong>`     |
//! | `<i>`                                  | `<em>`         |
//! | `<strike>`, `<del>`                    | `<s>`          |
//! | `<span>` with no attributes            | children only  |
//! | `<span data-id="..">` (only that attr) | children only  |
//!
//! Tables and diagram blocks are leaves here and are never entered.
//!
//! [`rewrite_diagram_fences`] turns fenced code blocks tagged with the diagram
//! language into [`DiagramBlock`](crate::ir::nodes::DiagramBlock) leaves.

use crate::ir::nodes::{Element, RichDocument, RichNode};

/// Attribute the editing surface uses for its own node bookkeeping
pub const BOOKKEEPING_ATTRIBUTE: &str = "data-id";

/// Returns a normalized copy, leaving `doc` untouched.
pub fn normalize(doc: &RichDocument) -> RichDocument {
    let mut copy = doc.clone();
    normalize_in_place(&mut copy);
    copy
}

pub fn normalize_in_place(doc: &mut RichDocument) {
    doc.children = normalize_nodes(std::mem::take(&mut doc.children));
}

fn normalize_nodes(nodes: Vec<RichNode>) -> Vec<RichNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            RichNode::Element(mut element) => {
                if let Some(tag) = canonical_tag(&element.tag) {
                    element.tag = tag.to_string();
                }
                element.children = normalize_nodes(element.children);
                if is_bare_wrapper(&element) {
                    out.extend(element.children);
                } else {
                    out.push(RichNode::Element(element));
                }
            }
            RichNode::Link(mut link) => {
                link.children = normalize_nodes(link.children);
                out.push(RichNode::Link(link));
            }
            other => out.push(other),
        }
    }
    out
}

fn canonical_tag(tag: &str) -> Option<&'static str> {
    match tag {
        "b" => Some("strong"),
        "i" => Some("em"),
        "strike" | "del" => Some("s"),
        _ => None,
    }
}

fn is_bare_wrapper(element: &Element) -> bool {
    element.tag == "span"
        && element
            .attributes
            .iter()
            .all(|(name, _)| name == BOOKKEEPING_ATTRIBUTE)
}

/// Replaces `pre > code.language-{language}` blocks with diagram leaves.
///
/// The fenced content always ends with the newline that preceded the closing
/// fence; exactly one trailing newline is dropped so the stored source is what
/// sat between the fences.
pub fn rewrite_diagram_fences(doc: &mut RichDocument, language: &str) {
    rewrite_nodes(&mut doc.children, language);
}

fn rewrite_nodes(nodes: &mut [RichNode], language: &str) {
    for node in nodes.iter_mut() {
        let source = match node {
            RichNode::Element(element) if element.tag == "pre" => {
                diagram_source(element, language)
            }
            RichNode::Element(element) => {
                rewrite_nodes(&mut element.children, language);
                None
            }
            _ => None,
        };
        if let Some(source) = source {
            *node = RichNode::diagram(source);
        }
    }
}

fn diagram_source(pre: &Element, language: &str) -> Option<String> {
    let class = format!("language-{language}");
    let code = match pre.children.as_slice() {
        [RichNode::Element(code)] if code.tag == "code" => code,
        _ => return None,
    };
    let tagged = code.has_class(&class) || pre.attribute("lang") == Some(language);
    if !tagged {
        return None;
    }
    let text: String = code.children.iter().map(RichNode::plain_text).collect();
    Some(text.strip_suffix('\n').unwrap_or(&text).to_string())
}
