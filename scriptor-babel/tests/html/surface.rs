use crate::fixture;
use scriptor_babel::format::Format;
use scriptor_babel::formats::html::serializer::DiagramRenderer;
use scriptor_babel::formats::markdown::MarkdownConverter;
use scriptor_babel::formats::HtmlFormat;
use scriptor_babel::ir::nodes::{RichDocument, RichNode};
use scriptor_babel::registry::FormatRegistry;
use scriptor_babel::transforms;

#[test]
fn test_surface_markup_to_markdown() {
    let doc = HtmlFormat::new()
        .parse(&fixture("surface.html"))
        .expect("Failed to parse html");
    let doc = transforms::normalize(&doc);
    let output = MarkdownConverter::new().to_text(&doc);

    println!("Output:\n{output}");

    assert!(output.starts_with("# Surface\n\n"));
    assert!(output.contains("Some **bold** and _italic_ and ~~gone~~ text."));
    assert!(output.contains("[good link](https://example.org)"));
    assert!(!output.contains("javascript"));
    assert!(!output.contains("alert"));
    assert!(!output.contains("steal"));
    assert!(output.contains("example.org)\n\n\n```mermaid\ngraph LR\n  A-->B\n```"));
    assert!(output.ends_with("- one\n- two\n"));
}

#[test]
fn test_surface_diagram_is_a_leaf() {
    let doc = HtmlFormat::new()
        .parse(&fixture("surface.html"))
        .expect("Failed to parse html");
    assert!(doc
        .children
        .contains(&RichNode::diagram("graph LR\n  A-->B")));
}

#[test]
fn test_markdown_to_surface_markup() {
    let registry = FormatRegistry::default();
    let html = registry
        .convert("A\n\n\nB\n\n```mermaid\ngraph TD\nA-->B\n```\n", "markdown", "html")
        .expect("convert");
    assert_eq!(
        html,
        "<p>A</p><p><br></p><p>B</p>\
         <div class=\"mermaid\" contenteditable=\"false\" data-code=\"graph TD\nA-->B\">graph TD\nA--&gt;B</div>"
    );
}

struct Boxes;

impl DiagramRenderer for Boxes {
    fn render(&self, source: &str) -> Result<String, String> {
        Ok(format!("<svg data-lines=\"{}\"></svg>", source.lines().count()))
    }
}

#[test]
fn test_surface_round_trip_with_rendered_preview() {
    let format = HtmlFormat::new().with_renderer(Box::new(Boxes));
    let doc = RichDocument::new(vec![RichNode::diagram("graph TD\nA-->B")]);

    let html = format.serialize(&doc).expect("serialize");
    assert!(html.contains("data-lines=\"2\""));

    let reparsed = format.parse(&html).expect("parse");
    assert_eq!(reparsed.children, doc.children);
}
