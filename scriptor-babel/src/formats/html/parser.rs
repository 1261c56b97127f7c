//! Markup reading (HTML → rich tree)
//!
//! Reads already sanitized markup into a [`RichDocument`]. When the markup was
//! expanded from Markdown with source positions, the gaps between top-level
//! blocks are measured against the source so runs of blank lines come back as
//! blank paragraphs.

use crate::common::dom;
use crate::common::text::is_collapsible_space;
use crate::ir::nodes::{
    DiagramBlock, Element, Image, Link, RichDocument, RichNode, Table, TableCell,
    TableCellAlignment, TableRow,
};
use crate::error::FormatError;
use markup5ever_rcdom::{Handle, NodeData};

/// Attribute carrying `start_line:start_col-end_line:end_col`
pub const SOURCEPOS_ATTRIBUTE: &str = "data-sourcepos";

/// Elements whose whitespace-only text children are layout noise
const CONTAINER_TAGS: &[&str] = &[
    "body",
    "div",
    "section",
    "blockquote",
    "ul",
    "ol",
    "table",
    "thead",
    "tbody",
    "tfoot",
    "tr",
    "figure",
];

const BLOCK_TAGS: &[&str] = &[
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "li",
    "blockquote",
    "pre",
    "hr",
    "table",
    "div",
    "section",
    "figure",
];

/// Reads sanitized markup into a rich document.
///
/// `source` is the Markdown the markup was expanded from, if any.
pub fn parse_markup(markup: &str, source: Option<&str>) -> Result<RichDocument, FormatError> {
    let parsed = dom::parse_body(markup)?;
    let body = parsed.body();
    let children = match source {
        Some(source) => read_positioned_blocks(body, source),
        None => read_children(body),
    };
    Ok(RichDocument::new(children))
}

fn read_children(parent: &Handle) -> Vec<RichNode> {
    let parent_tag = dom::element_name(parent).unwrap_or_default();
    let children = parent.children.borrow();
    let mut nodes = Vec::with_capacity(children.len());
    for (index, child) in children.iter().enumerate() {
        if let Some(text) = dom::text_contents(child) {
            if text.chars().all(is_collapsible_space) {
                let prev_is_block = index > 0 && is_block(&children[index - 1]);
                let next_is_block = children.get(index + 1).map(is_block).unwrap_or(false);
                if CONTAINER_TAGS.contains(&parent_tag.as_str()) || prev_is_block || next_is_block
                {
                    continue;
                }
            }
            nodes.push(RichNode::Text(text));
            continue;
        }
        if let Some(node) = read_node(child) {
            nodes.push(node);
        }
    }
    nodes
}

fn is_block(handle: &Handle) -> bool {
    dom::element_name(handle)
        .map(|tag| BLOCK_TAGS.contains(&tag.as_str()))
        .unwrap_or(false)
}

fn read_node(handle: &Handle) -> Option<RichNode> {
    let tag = dom::element_name(handle)?;
    let attrs = dom::attributes(handle);
    let attr = |name: &str| {
        attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    };

    let node = match tag.as_str() {
        "table" => RichNode::Table(read_table(handle)),
        "img" => RichNode::Image(Image {
            src: attr("src").unwrap_or_default(),
            alt: attr("alt").unwrap_or_default(),
            title: attr("title"),
        }),
        "a" => RichNode::Link(Link {
            href: attr("href").unwrap_or_default(),
            title: attr("title"),
            children: read_children(handle),
        }),
        "div" if has_class(&attrs, "mermaid") => RichNode::Diagram(DiagramBlock {
            source: attr("data-code").unwrap_or_else(|| text_of(handle)),
        }),
        _ => {
            let mut element = Element::new(&tag).with_children(read_children(handle));
            element.attributes = attrs
                .into_iter()
                .filter(|(name, _)| name != SOURCEPOS_ATTRIBUTE)
                .collect();
            RichNode::Element(element)
        }
    };
    Some(node)
}

fn has_class(attrs: &[(String, String)], class: &str) -> bool {
    attrs
        .iter()
        .any(|(name, value)| name == "class" && value.split_whitespace().any(|c| c == class))
}

fn text_of(handle: &Handle) -> String {
    let mut out = String::new();
    collect_text(handle, &mut out);
    out
}

fn collect_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        out.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        collect_text(child, out);
    }
}

fn read_table(handle: &Handle) -> Table {
    let mut rows = Vec::new();
    collect_rows(handle, &mut rows);
    Table { rows }
}

fn collect_rows(handle: &Handle, rows: &mut Vec<TableRow>) {
    for child in handle.children.borrow().iter() {
        match dom::element_name(child).as_deref() {
            Some("tr") => rows.push(read_row(child)),
            Some("thead") | Some("tbody") | Some("tfoot") => collect_rows(child, rows),
            _ => {}
        }
    }
}

fn read_row(handle: &Handle) -> TableRow {
    let cells = handle
        .children
        .borrow()
        .iter()
        .filter_map(|cell| {
            let tag = dom::element_name(cell)?;
            if tag != "th" && tag != "td" {
                return None;
            }
            let attrs = dom::attributes(cell);
            Some(TableCell {
                content: read_children(cell),
                header: tag == "th",
                align: cell_alignment(&attrs),
            })
        })
        .collect();
    TableRow { cells }
}

fn cell_alignment(attrs: &[(String, String)]) -> TableCellAlignment {
    let declared = attrs.iter().find_map(|(name, value)| match name.as_str() {
        "align" => Some(value.trim().to_ascii_lowercase()),
        "style" => value
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .find(|(prop, _)| prop.trim() == "text-align")
            .map(|(_, v)| v.trim().to_ascii_lowercase()),
        _ => None,
    });
    match declared.as_deref() {
        Some("left") => TableCellAlignment::Left,
        Some("right") => TableCellAlignment::Right,
        Some("center") => TableCellAlignment::Center,
        _ => TableCellAlignment::None,
    }
}

/// Line span `(start, end)` of a block, 1-based and inclusive.
fn source_span(handle: &Handle) -> Option<(usize, usize)> {
    let attrs = dom::attributes(handle);
    let (_, value) = attrs.iter().find(|(name, _)| name == SOURCEPOS_ATTRIBUTE)?;
    let (start, end) = value.split_once('-')?;
    let line = |pos: &str| pos.split(':').next()?.trim().parse::<usize>().ok();
    Some((line(start)?, line(end)?))
}

/// Pulls a block's end back over trailing blank lines.
///
/// A list's reported span runs through the blank line that follows it.
fn last_content_line(lines: &[&str], start: usize, end: usize) -> usize {
    let mut last = end.min(lines.len());
    while last > start && lines[last - 1].trim().is_empty() {
        last -= 1;
    }
    last
}

fn blank_paragraphs(count: usize) -> impl Iterator<Item = RichNode> {
    std::iter::repeat_with(|| RichNode::paragraph(Vec::new())).take(count)
}

/// Top-level read that turns extra blank source lines into blank paragraphs.
///
/// One blank line between blocks is plain separation; every further blank
/// line is a blank paragraph. Blank lines before the first block each count,
/// and after the last block every blank line beyond the final newline counts.
fn read_positioned_blocks(body: &Handle, source: &str) -> Vec<RichNode> {
    let lines: Vec<&str> = source.split('\n').collect();
    let blank_between = |from: usize, to: usize| {
        lines
            .get(from..to.min(lines.len()))
            .map(|slice| slice.iter().filter(|l| l.trim().is_empty()).count())
            .unwrap_or(0)
    };

    let children = body.children.borrow();
    let mut nodes = Vec::with_capacity(children.len());
    // Index into `lines` just past the previous block; None when unknown.
    let mut cursor: Option<usize> = Some(0);
    let mut seen_block = false;

    for child in children.iter() {
        if dom::text_contents(child).is_some() {
            continue;
        }
        let span = source_span(child);
        if let (Some(after_prev), Some((start, _))) = (cursor, span) {
            let blanks = blank_between(after_prev, start.saturating_sub(1));
            let extra = if seen_block {
                blanks.saturating_sub(1)
            } else {
                blanks
            };
            nodes.extend(blank_paragraphs(extra));
        }
        if let Some(node) = read_node(child) {
            nodes.push(node);
        }
        seen_block = true;
        cursor = span.map(|(start, end)| last_content_line(&lines, start, end));
    }

    if let Some(after_last) = cursor {
        let trailing = blank_between(after_last, lines.len());
        nodes.extend(blank_paragraphs(trailing.saturating_sub(1)));
    }
    nodes
}
