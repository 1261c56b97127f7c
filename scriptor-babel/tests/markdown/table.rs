use scriptor_babel::formats::markdown::MarkdownConverter;
use scriptor_babel::ir::nodes::{RichNode, Table, TableCellAlignment};

fn first_table(nodes: &[RichNode]) -> &Table {
    nodes
        .iter()
        .find_map(|node| match node {
            RichNode::Table(table) => Some(table),
            _ => None,
        })
        .expect("Should have table")
}

#[test]
fn test_table_round_trip() {
    let md = r#"| Fruit | Count |
| --- | ---: |
| Apples | 3 |
| Pears | 5 |
"#;
    let converter = MarkdownConverter::new();
    let doc = converter.from_text(md).expect("Failed to parse markdown");
    let output = converter.to_text(&doc);

    assert_eq!(
        output,
        "| Fruit  | Count |\n| ------ | ----: |\n| Apples | 3     |\n| Pears  | 5     |\n"
    );
    assert_eq!(converter.to_text(&converter.from_text(&output).expect("parse")), output);
}

#[test]
fn test_table_alignment_import() {
    let md = r#"| Left | Center | Right | Plain |
| :--- | :----: | ----: | ----- |
| L    | C      | R     | P     |
"#;
    let doc = MarkdownConverter::new().from_text(md).expect("parse");
    let table = first_table(&doc.children);

    let header: Vec<_> = table.rows[0].cells.iter().map(|c| (c.header, c.align)).collect();
    assert_eq!(
        header,
        vec![
            (true, TableCellAlignment::Left),
            (true, TableCellAlignment::Center),
            (true, TableCellAlignment::Right),
            (true, TableCellAlignment::None),
        ]
    );
    assert!(table.rows[1].cells.iter().all(|c| !c.header));
}

#[test]
fn test_table_cells_keep_inline_markup() {
    let md = "| A | B |\n| --- | --- |\n| **bold** | `a\\|b` |\n";
    let converter = MarkdownConverter::new();
    let output = converter.to_text(&converter.from_text(md).expect("parse"));

    assert!(output.contains("**bold**"));
    assert!(output.contains(r"`a\|b`"));
}
