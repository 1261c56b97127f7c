use proptest::prelude::*;
use scriptor_babel::formats::markdown::MarkdownConverter;
use scriptor_babel::ir::nodes::{
    Image, Link, RichDocument, RichNode, Table, TableCell, TableCellAlignment, TableRow,
};

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn emphasis() -> impl Strategy<Value = RichNode> {
    (prop::sample::select(vec!["em", "strong", "s"]), word())
        .prop_map(|(tag, text)| RichNode::element(tag, vec![RichNode::Text(text)]))
}

fn code() -> impl Strategy<Value = RichNode> {
    word().prop_map(|text| RichNode::element("code", vec![RichNode::Text(text)]))
}

/// Words, spaces and punctuation with emphasis runs that may sit inside a word.
fn cell_node() -> impl Strategy<Value = RichNode> {
    prop_oneof![
        4 => word().prop_map(RichNode::Text),
        2 => Just(RichNode::text(" ")),
        2 => emphasis(),
        1 => code(),
    ]
}

fn inline_node() -> impl Strategy<Value = RichNode> {
    let link = (word(), word(), prop::option::of(word())).prop_map(|(text, path, title)| {
        RichNode::Link(Link {
            href: format!("https://example.org/{path}"),
            title,
            children: vec![RichNode::Text(text)],
        })
    });
    let image = (word(), word(), prop::option::of(word())).prop_map(|(alt, name, title)| {
        RichNode::Image(Image {
            src: format!("https://example.org/{name}.png"),
            alt,
            title,
        })
    });
    prop_oneof![
        6 => cell_node(),
        2 => prop::sample::select(vec![".", ",", "!", "?", ";", ":"]).prop_map(RichNode::text),
        1 => link,
        1 => image,
    ]
}

fn starting_with_word(
    nodes: impl Strategy<Value = Vec<RichNode>>,
) -> impl Strategy<Value = Vec<RichNode>> {
    (word(), nodes).prop_map(|(first, rest)| {
        let mut nodes = vec![RichNode::Text(first)];
        nodes.extend(rest);
        nodes
    })
}

fn inline() -> impl Strategy<Value = Vec<RichNode>> {
    starting_with_word(prop::collection::vec(inline_node(), 0..6))
}

fn heading() -> impl Strategy<Value = RichNode> {
    (1..=6u8, inline()).prop_map(|(level, children)| {
        RichNode::element(&format!("h{level}"), children)
    })
}

fn list() -> impl Strategy<Value = RichNode> {
    (any::<bool>(), prop::collection::vec(inline(), 1..4)).prop_map(|(ordered, items)| {
        let items = items
            .into_iter()
            .map(|children| RichNode::element("li", children))
            .collect();
        RichNode::element(if ordered { "ol" } else { "ul" }, items)
    })
}

fn table() -> impl Strategy<Value = RichNode> {
    let alignment = prop::sample::select(vec![
        TableCellAlignment::None,
        TableCellAlignment::Left,
        TableCellAlignment::Center,
        TableCellAlignment::Right,
    ]);
    let cell = || starting_with_word(prop::collection::vec(cell_node(), 0..3));
    (1..4usize, 1..3usize)
        .prop_flat_map(move |(columns, body_rows)| {
            (
                prop::collection::vec((cell(), alignment.clone()), columns),
                prop::collection::vec(prop::collection::vec(cell(), columns), body_rows),
            )
        })
        .prop_map(|(header, body)| {
            let mut rows = vec![TableRow {
                cells: header
                    .into_iter()
                    .map(|(content, align)| TableCell::header(content).aligned(align))
                    .collect(),
            }];
            let aligns: Vec<TableCellAlignment> = rows[0].cells.iter().map(|c| c.align).collect();
            rows.extend(body.into_iter().map(|cells| TableRow {
                cells: cells
                    .into_iter()
                    .zip(&aligns)
                    .map(|(content, align)| TableCell::new(content).aligned(*align))
                    .collect(),
            }));
            RichNode::Table(Table { rows })
        })
}

fn diagram() -> impl Strategy<Value = RichNode> {
    prop::collection::vec("[A-Z]-->[A-Z]", 1..4)
        .prop_map(|edges| RichNode::diagram(format!("graph TD\n  {}", edges.join("\n  "))))
}

fn blockquote() -> impl Strategy<Value = RichNode> {
    (prop::collection::vec(inline(), 1..3), any::<bool>()).prop_map(|(paragraphs, blank)| {
        let mut children: Vec<RichNode> =
            paragraphs.into_iter().map(RichNode::paragraph).collect();
        if blank {
            children.insert(1, RichNode::paragraph(Vec::new()));
        }
        RichNode::element("blockquote", children)
    })
}

fn block() -> impl Strategy<Value = RichNode> {
    prop_oneof![
        4 => inline().prop_map(RichNode::paragraph),
        2 => Just(RichNode::paragraph(Vec::new())),
        2 => heading(),
        2 => list(),
        1 => table(),
        1 => diagram(),
        1 => blockquote(),
    ]
}

fn list_tag(node: &RichNode) -> Option<&str> {
    ["ul", "ol"]
        .into_iter()
        .find(|tag| node.as_element(tag).is_some())
}

fn is_blank(node: &RichNode) -> bool {
    node.as_element("p").is_some_and(|p| p.children.is_empty())
}

/// Two lists of the same kind with only blank lines between them are one list.
fn separate_lists(blocks: Vec<RichNode>) -> Vec<RichNode> {
    let mut out: Vec<RichNode> = Vec::with_capacity(blocks.len());
    let mut last_list: Option<String> = None;
    for block in blocks {
        if is_blank(&block) {
            out.push(block);
            continue;
        }
        let tag = list_tag(&block).map(str::to_string);
        if tag.is_some() && tag == last_list {
            out.push(RichNode::paragraph(vec![RichNode::text("between")]));
        }
        last_list = tag;
        out.push(block);
    }
    out
}

fn document() -> impl Strategy<Value = RichDocument> {
    prop::collection::vec(block(), 1..7)
        .prop_map(|blocks| RichDocument::new(separate_lists(blocks)))
}

proptest! {
    #[test]
    fn exported_markdown_reloads_to_the_same_text(doc in document()) {
        let converter = MarkdownConverter::new();
        let text = converter.to_text(&doc);
        let reloaded = converter.from_text(&text).expect("exported markdown parses");
        prop_assert_eq!(converter.to_text(&reloaded), text);
    }
}
