use scriptor_babel::formats::markdown::MarkdownConverter;
use scriptor_babel::ir::nodes::{RichDocument, RichNode};

fn blank() -> RichNode {
    RichNode::paragraph(Vec::new())
}

fn para(text: &str) -> RichNode {
    RichNode::paragraph(vec![RichNode::text(text)])
}

#[test]
fn test_blank_paragraph_between_blocks_is_an_extra_line() {
    let converter = MarkdownConverter::new();
    let doc = RichDocument::new(vec![para("A"), blank(), para("B")]);
    assert_eq!(converter.to_text(&doc), "A\n\n\nB\n");
}

#[test]
fn test_blank_line_runs_become_blank_paragraphs() {
    let converter = MarkdownConverter::new();
    let doc = converter.from_text("A\n\n\n\nB\n").expect("parse");
    assert_eq!(doc.children, vec![para("A"), blank(), blank(), para("B")]);
    assert_eq!(converter.to_text(&doc), "A\n\n\n\nB\n");
}

#[test]
fn test_leading_and_trailing_blank_paragraphs() {
    let converter = MarkdownConverter::new();
    let doc = RichDocument::new(vec![blank(), para("A"), blank(), blank()]);
    let text = converter.to_text(&doc);
    assert_eq!(text, "\nA\n\n\n");

    let reparsed = converter.from_text(&text).expect("parse");
    assert_eq!(reparsed.children, doc.children);
}

#[test]
fn test_single_separator_adds_nothing() {
    let converter = MarkdownConverter::new();
    let doc = converter.from_text("# T\n\nBody\n").expect("parse");
    assert_eq!(doc.children.len(), 2);
    assert!(!doc.children.contains(&blank()));
}

#[test]
fn test_document_of_only_blank_paragraphs() {
    let converter = MarkdownConverter::new();
    let doc = RichDocument::new(vec![blank(), blank()]);
    assert_eq!(converter.to_text(&doc), "\n\n");
}

#[test]
fn test_blank_paragraph_after_tight_list_survives() {
    let converter = MarkdownConverter::new();
    let text = "- a\n- b\n\n\nB\n";
    let doc = converter.from_text(text).expect("parse");
    assert_eq!(doc.children.len(), 3);
    assert_eq!(doc.children[1], blank());
    assert_eq!(converter.to_text(&doc), text);
}

#[test]
fn test_blank_paragraph_after_loose_list_survives() {
    let converter = MarkdownConverter::new();
    let text = "1. a\n\n2. b\n\n\n\nB\n";
    let doc = converter.from_text(text).expect("parse");
    assert_eq!(doc.children.len(), 4);
    assert_eq!(&doc.children[1..3], &[blank(), blank()]);
    assert_eq!(converter.to_text(&doc), text);
}

#[test]
fn test_blank_paragraph_inside_blockquote_is_dropped() {
    let converter = MarkdownConverter::new();
    let doc = RichDocument::new(vec![RichNode::element(
        "blockquote",
        vec![para("a"), blank(), para("b")],
    )]);
    let text = converter.to_text(&doc);
    assert_eq!(text, "> a\n>\n> b\n");

    let reparsed = converter.from_text(&text).expect("parse");
    assert_eq!(converter.to_text(&reparsed), text);
}
