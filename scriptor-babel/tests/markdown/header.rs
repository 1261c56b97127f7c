use crate::fixture;
use scriptor_babel::common::header::{self, MetadataHeader};
use scriptor_babel::format::Format;
use scriptor_babel::formats::markdown::MarkdownFormat;

#[test]
fn test_fixture_header_is_read_in_order() {
    let parsed = header::parse(&fixture("kitchensink.md"));
    let entries: Vec<_> = parsed.header.iter().collect();
    assert_eq!(
        entries,
        vec![("title", "Kitchen sink"), ("author", "Scriptor")]
    );
    assert!(parsed.body.starts_with("\n# Kitchen sink\n"));
}

#[test]
fn test_header_serializes_as_key_value_lines() {
    let header: MetadataHeader = [("title", "Doc"), ("draft", "true")].into_iter().collect();
    assert_eq!(header::serialize(&header), "title: Doc\ndraft: true");

    let parsed = header::parse("---\ntitle: Doc\ndraft: true\n---\n");
    assert_eq!(parsed.header, header);
    assert_eq!(parsed.body, "");
}

#[test]
fn test_payload_round_trips_through_compose() {
    let source = fixture("kitchensink.md");
    let parsed = header::decompose(&source);
    assert_eq!(header::compose(&parsed.header, &parsed.body), source);
}

#[test]
fn test_markdown_format_ignores_the_header() {
    let with_header = MarkdownFormat::default()
        .parse("---\ntitle: Doc\n---\n\n# Body\n")
        .expect("parse");
    let without = MarkdownFormat::default().parse("# Body\n").expect("parse");
    assert_eq!(with_header, without);
}

#[test]
fn test_thematic_break_later_in_body_is_not_a_header() {
    let raw = "Intro\n\n---\n\nkey: value\n\n---\n";
    let parsed = header::parse(raw);
    assert!(parsed.header.is_empty());
    assert_eq!(parsed.body, raw);
}
