//! Rich content tree
//!
//! The tree mirrors what a rich editing surface holds: generic markup
//! elements plus dedicated leaves for the structured regions the text
//! converter must treat specially (tables, diagrams, images, links).

/// Root of a rich document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RichDocument {
    pub children: Vec<RichNode>,
}

impl RichDocument {
    pub fn new(children: Vec<RichNode>) -> Self {
        RichDocument { children }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RichNode {
    Text(String),
    Element(Element),
    Table(Table),
    Diagram(DiagramBlock),
    Image(Image),
    Link(Link),
}

impl RichNode {
    pub fn text(value: impl Into<String>) -> Self {
        RichNode::Text(value.into())
    }

    pub fn element(tag: &str, children: Vec<RichNode>) -> Self {
        RichNode::Element(Element::new(tag).with_children(children))
    }

    pub fn paragraph(children: Vec<RichNode>) -> Self {
        RichNode::element("p", children)
    }

    pub fn diagram(source: impl Into<String>) -> Self {
        RichNode::Diagram(DiagramBlock {
            source: source.into(),
        })
    }

    /// Returns the element if this node is one with the given tag.
    pub fn as_element(&self, tag: &str) -> Option<&Element> {
        match self {
            RichNode::Element(element) if element.tag == tag => Some(element),
            _ => None,
        }
    }

    /// Concatenated text content of this node and its descendants.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &RichNode, out: &mut String) {
    match node {
        RichNode::Text(text) => out.push_str(text),
        RichNode::Element(element) => element.children.iter().for_each(|c| collect_text(c, out)),
        RichNode::Link(link) => link.children.iter().for_each(|c| collect_text(c, out)),
        RichNode::Image(image) => out.push_str(&image.alt),
        RichNode::Diagram(diagram) => out.push_str(&diagram.source),
        RichNode::Table(table) => {
            for cell in table.rows.iter().flat_map(|row| row.cells.iter()) {
                cell.content.iter().for_each(|c| collect_text(c, out));
            }
        }
    }
}

/// A generic markup element (paragraph, heading, emphasis, list, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<RichNode>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_children(mut self, children: Vec<RichNode>) -> Self {
        self.children = children;
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Assigns an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

/// Pipe-table leaf; opaque to inline normalization
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub content: Vec<RichNode>,
    pub header: bool,
    pub align: TableCellAlignment,
}

impl TableCell {
    pub fn new(content: Vec<RichNode>) -> Self {
        TableCell {
            content,
            header: false,
            align: TableCellAlignment::None,
        }
    }

    pub fn header(content: Vec<RichNode>) -> Self {
        TableCell {
            header: true,
            ..TableCell::new(content)
        }
    }

    pub fn aligned(mut self, align: TableCellAlignment) -> Self {
        self.align = align;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableCellAlignment {
    Left,
    Right,
    Center,
    #[default]
    None,
}

/// Diagram source, stored and exported verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub src: String,
    pub alt: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub href: String,
    pub title: Option<String>,
    pub children: Vec<RichNode>,
}
