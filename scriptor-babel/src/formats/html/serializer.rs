//! HTML serialization (rich tree → surface markup)
//!
//! Produces the fragment an editing surface loads: one top-level element per
//! block, diagrams as non-editable `div.mermaid` containers that carry their
//! source in `data-code`.

use crate::common::dom::{self, append, create_element, create_text};
use crate::error::FormatError;
use crate::ir::nodes::{RichDocument, RichNode, Table, TableCellAlignment};
use markup5ever_rcdom::Handle;

/// Renders diagram source into preview markup (e.g. SVG).
pub trait DiagramRenderer: Send + Sync {
    fn render(&self, source: &str) -> Result<String, String>;
}

/// Serialize a rich document to an HTML fragment.
pub fn serialize_to_html(
    doc: &RichDocument,
    renderer: Option<&dyn DiagramRenderer>,
) -> Result<String, FormatError> {
    let root = create_element("div", vec![]);
    for node in &doc.children {
        append_node(&root, node, renderer);
    }
    dom::serialize_children(&root)
}

fn append_node(parent: &Handle, node: &RichNode, renderer: Option<&dyn DiagramRenderer>) {
    match node {
        RichNode::Text(text) => append(parent, create_text(text)),
        RichNode::Element(element) => {
            let attrs = element
                .attributes
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str()))
                .collect();
            let handle = create_element(&element.tag, attrs);
            if element.tag == "p" && element.children.is_empty() {
                append(&handle, create_element("br", vec![]));
            }
            for child in &element.children {
                append_node(&handle, child, renderer);
            }
            append(parent, handle);
        }
        RichNode::Link(link) => {
            let mut attrs = vec![("href", link.href.as_str())];
            if let Some(title) = &link.title {
                attrs.push(("title", title.as_str()));
            }
            let handle = create_element("a", attrs);
            for child in &link.children {
                append_node(&handle, child, renderer);
            }
            append(parent, handle);
        }
        RichNode::Image(image) => {
            let mut attrs = vec![("src", image.src.as_str()), ("alt", image.alt.as_str())];
            if let Some(title) = &image.title {
                attrs.push(("title", title.as_str()));
            }
            append(parent, create_element("img", attrs));
        }
        RichNode::Table(table) => append(parent, table_element(table, renderer)),
        RichNode::Diagram(diagram) => {
            let handle = create_element(
                "div",
                vec![
                    ("class", "mermaid"),
                    ("contenteditable", "false"),
                    ("data-code", diagram.source.as_str()),
                ],
            );
            append_preview(&handle, &diagram.source, renderer);
            append(parent, handle);
        }
    }
}

/// Rendered preview when available, the plain source otherwise.
fn append_preview(container: &Handle, source: &str, renderer: Option<&dyn DiagramRenderer>) {
    let rendered = renderer.map(|renderer| renderer.render(source));
    match rendered {
        Some(Ok(markup)) => match dom::parse_body(&markup) {
            Ok(parsed) => {
                for child in parsed.take_children() {
                    append(container, child);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "diagram preview markup unreadable");
                append(container, create_text(source));
            }
        },
        Some(Err(message)) => {
            tracing::warn!(error = %message, "diagram render failed, showing source");
            append(container, create_text(source));
        }
        None => append(container, create_text(source)),
    }
}

fn table_element(table: &Table, renderer: Option<&dyn DiagramRenderer>) -> Handle {
    let handle = create_element("table", vec![]);
    let header_rows = table
        .rows
        .iter()
        .take_while(|row| !row.cells.is_empty() && row.cells.iter().all(|c| c.header))
        .count();
    let (head, body) = table.rows.split_at(header_rows);

    for (section_tag, rows) in [("thead", head), ("tbody", body)] {
        if rows.is_empty() {
            continue;
        }
        let section = create_element(section_tag, vec![]);
        for row in rows {
            let tr = create_element("tr", vec![]);
            for cell in &row.cells {
                let tag = if cell.header { "th" } else { "td" };
                let attrs = match cell.align {
                    TableCellAlignment::Left => vec![("align", "left")],
                    TableCellAlignment::Right => vec![("align", "right")],
                    TableCellAlignment::Center => vec![("align", "center")],
                    TableCellAlignment::None => vec![],
                };
                let td = create_element(tag, attrs);
                for child in &cell.content {
                    append_node(&td, child, renderer);
                }
                append(&tr, td);
            }
            append(&section, tr);
        }
        append(&handle, section);
    }
    handle
}
