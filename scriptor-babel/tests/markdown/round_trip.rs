use crate::fixture;
use scriptor_babel::common::header;
use scriptor_babel::formats::markdown::serializer::{HeadingStyle, SerializerRules};
use scriptor_babel::formats::markdown::MarkdownConverter;
use scriptor_babel::ir::nodes::{RichDocument, RichNode};

fn cycle(converter: &MarkdownConverter, text: &str) -> String {
    let doc = converter
        .from_text(text)
        .expect("Failed to parse markdown");
    converter.to_text(&doc)
}

#[test]
fn test_kitchensink_is_stable_after_one_round_trip() {
    let converter = MarkdownConverter::new();
    let body = header::decompose(&fixture("kitchensink.md")).body;

    let first = cycle(&converter, &body);
    let second = cycle(&converter, &first);

    assert_eq!(first, second);
}

#[test]
fn test_kitchensink_content_survives() {
    let converter = MarkdownConverter::new();
    let body = header::decompose(&fixture("kitchensink.md")).body;
    let output = cycle(&converter, &body);

    println!("Output:\n{output}");

    assert!(output.starts_with("# Kitchen sink\n\n"));
    assert!(output.contains("**strong**"));
    assert!(output.contains("_emphasis_"));
    assert!(output.contains("~~struck~~"));
    assert!(output.contains("`inline code`"));
    assert!(output.contains("[link](https://example.org \"Example\")"));
    assert!(output.contains("- Pears\n  - Conference\n  - Williams"));
    assert!(output.contains("3. Third\n4. Fourth"));
    assert!(output.contains("- [ ] Open task\n- [x] Done task"));
    assert!(output.contains("```mermaid\ngraph TD\n  A-->B\n  B-->C\n```"));
    assert!(output.contains("```rust\nfn main() {\n    println!(\"hi\");\n}\n```"));
    assert!(output.contains("> Quoted line one."));
    assert!(output.contains("\n* * *\n"));
    assert!(output.contains("hard break  \nnext line."));
    assert!(output.contains("![Alt text](https://example.org/image.png \"Image title\")"));
}

#[test]
fn test_soft_breaks_join_into_one_line() {
    let converter = MarkdownConverter::new();
    assert_eq!(cycle(&converter, "one\ntwo\n"), "one two\n");
}

#[test]
fn test_diagram_source_survives_byte_for_byte() {
    let converter = MarkdownConverter::new();
    let doc = RichDocument::new(vec![RichNode::diagram("graph TD\nA-->B")]);

    let text = converter.to_text(&doc);
    assert_eq!(text, "```mermaid\ngraph TD\nA-->B\n```\n");

    let reparsed = converter.from_text(&text).expect("parse");
    assert_eq!(reparsed.children, vec![RichNode::diagram("graph TD\nA-->B")]);
    assert_eq!(converter.to_text(&reparsed), text);
}

#[test]
fn test_diagram_source_is_not_escaped() {
    let converter = MarkdownConverter::new();
    let source = "graph LR\n  a[*start*] -->|_x_| b";
    let doc = RichDocument::new(vec![RichNode::diagram(source)]);
    let text = converter.to_text(&doc);
    assert!(text.contains(source));
    assert_eq!(
        converter.from_text(&text).expect("parse").children,
        vec![RichNode::diagram(source)]
    );
}

#[test]
fn test_variant_markup_is_normalized() {
    let converter = MarkdownConverter::new();
    let doc = RichDocument::new(vec![RichNode::paragraph(vec![
        RichNode::element("b", vec![RichNode::text("bold")]),
        RichNode::text(" "),
        RichNode::element("i", vec![RichNode::text("it")]),
        RichNode::text(" "),
        RichNode::element("del", vec![RichNode::text("gone")]),
    ])]);
    assert_eq!(converter.to_text(&doc), "**bold** _it_ ~~gone~~\n");

    let reparsed = converter.from_text("__bold__ *it*\n").expect("parse");
    assert_eq!(
        reparsed.children,
        vec![RichNode::paragraph(vec![
            RichNode::element("strong", vec![RichNode::text("bold")]),
            RichNode::text(" "),
            RichNode::element("em", vec![RichNode::text("it")]),
        ])]
    );
}

#[test]
fn test_markdown_characters_in_text_are_escaped() {
    let converter = MarkdownConverter::new();
    let doc = RichDocument::new(vec![RichNode::paragraph(vec![RichNode::text(
        "2 * 3 and a_b and [not a link]",
    )])]);
    let text = converter.to_text(&doc);
    assert_eq!(cycle(&converter, &text), text);
    assert_eq!(
        converter.from_text(&text).expect("parse").children,
        doc.children
    );
}

#[test]
fn test_bare_urls_reload_as_text() {
    let converter = MarkdownConverter::new();
    let doc = RichDocument::new(vec![RichNode::paragraph(vec![RichNode::text(
        "see www.example.com or https://example.org/a today",
    )])]);
    let text = converter.to_text(&doc);
    assert_eq!(
        converter.from_text(&text).expect("parse").children,
        doc.children
    );
}

#[test]
fn test_heading_ending_in_hash_keeps_it() {
    let converter = MarkdownConverter::new();
    let doc = RichDocument::new(vec![RichNode::element(
        "h2",
        vec![RichNode::text("Item #")],
    )]);
    let text = converter.to_text(&doc);
    assert_eq!(
        converter.from_text(&text).expect("parse").children,
        doc.children
    );
}

#[test]
fn test_setext_headings() {
    let rules = SerializerRules {
        heading_style: HeadingStyle::Setext,
        ..SerializerRules::default()
    };
    let converter = MarkdownConverter::new().with_rules(rules);
    let output = cycle(&converter, "# Title\n\n## Sub\n\n### Deep\n");
    assert_eq!(output, "Title\n=====\n\nSub\n---\n\n### Deep\n");
}
