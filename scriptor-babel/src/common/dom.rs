//! Small helpers over the html5ever reference-counted DOM
//!
//! Used by the sanitizer, the markup reader and the surface markup writer.

use crate::error::FormatError;
use html5ever::tendril::TendrilSink;
use html5ever::{
    ns, parse_document, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute,
    LocalName, QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::default::Default;
use std::rc::Rc;

/// A parsed document together with its `<body>` element.
///
/// rcdom empties every descendant when the document node drops, so the
/// body is only readable while this value is alive.
pub struct ParsedBody {
    _dom: RcDom,
    body: Handle,
}

impl ParsedBody {
    pub fn body(&self) -> &Handle {
        &self.body
    }

    /// Detaches the body's children so they outlive the document.
    pub fn take_children(&self) -> Vec<Handle> {
        std::mem::take(&mut *self.body.children.borrow_mut())
    }
}

/// Parses `markup` as an HTML document and locates its `<body>` element.
pub fn parse_body(markup: &str) -> Result<ParsedBody, FormatError> {
    let dom = parse_document(RcDom::default(), Default::default()).one(markup);
    let body = find_element(&dom.document, "body")
        .ok_or_else(|| FormatError::ParseError("markup has no body".to_string()))?;
    Ok(ParsedBody { _dom: dom, body })
}

fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    if element_name(handle).as_deref() == Some(tag) {
        return Some(handle.clone());
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

/// Lowercase local name of an element node.
pub fn element_name(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

/// Attributes of an element node, in document order.
pub fn attributes(handle: &Handle) -> Vec<(String, String)> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

pub fn text_contents(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// Create an HTML element with attributes
pub fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
pub fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

pub fn append(parent: &Handle, child: Handle) {
    parent.children.borrow_mut().push(child);
}

/// Serializes every child of `parent`, without `parent` itself.
pub fn serialize_children(parent: &Handle) -> Result<String, FormatError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    for child in parent.children.borrow().iter() {
        let serializable = SerializableHandle::from(child.clone());
        serialize(&mut output, &serializable, opts.clone()).map_err(|e| {
            FormatError::SerializationError(format!("HTML serialization failed: {e}"))
        })?;
    }

    String::from_utf8(output)
        .map_err(|e| FormatError::SerializationError(format!("UTF-8 conversion failed: {e}")))
}
