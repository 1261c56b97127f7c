//! Markdown serialization (rich tree → Markdown)
//!
//! A direct writer over the rich tree, configured by [`SerializerRules`].
//! Besides the usual block and inline mappings it has three special cases:
//!
//! - Diagram leaves are written as a fence tagged with the diagram language,
//!   the stored source copied in verbatim.
//! - Paragraphs without visible content are not dropped. Each one adds a blank
//!   line at its position, so `A`, blank, `B` becomes `A\n\n\nB`.
//! - Tables are written as pipe tables; the first row is the header row.
//!
//! Text escaping and the emphasis delimiter checks live in [`super::escape`].
//! A configured delimiter that would not read back as emphasis where it sits
//! (inside a word, or against punctuation) is swapped for the other emphasis
//! character. If neither fits, edge punctuation moves outside the delimiters,
//! and as a last resort the content is written without them.

use super::escape::{delimiter_fits, escape_run, escape_title, swapped_delimiter, LineState};
use crate::common::text::is_collapsible_space;
use crate::ir::nodes::{Element, Image, Link, RichDocument, RichNode, Table, TableCellAlignment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStyle {
    #[default]
    Atx,
    Setext,
}

/// Output conventions for the Markdown writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerRules {
    pub heading_style: HeadingStyle,
    pub bullet_marker: char,
    pub code_fence: String,
    pub emphasis_delimiter: String,
    pub strong_delimiter: String,
    pub strike_delimiter: String,
    pub horizontal_rule: String,
    /// Info string reserved for diagram fences
    pub diagram_language: String,
}

impl Default for SerializerRules {
    fn default() -> Self {
        SerializerRules {
            heading_style: HeadingStyle::Atx,
            bullet_marker: '-',
            code_fence: "```".to_string(),
            emphasis_delimiter: "_".to_string(),
            strong_delimiter: "**".to_string(),
            strike_delimiter: "~~".to_string(),
            horizontal_rule: "* * *".to_string(),
            diagram_language: "mermaid".to_string(),
        }
    }
}

/// Serialize a rich document to Markdown.
pub fn serialize_to_markdown(doc: &RichDocument, rules: &SerializerRules) -> String {
    let writer = MarkdownWriter { rules };
    let joined = join_blocks(writer.blocks(&doc.children));
    let mut out = joined.text;
    if joined.has_content {
        out.push('\n');
    }
    out.push_str(&"\n".repeat(joined.trailing_blanks));
    out
}

enum Block {
    Content(String),
    Blank,
}

struct Joined {
    text: String,
    trailing_blanks: usize,
    has_content: bool,
}

fn join_blocks(blocks: Vec<Block>) -> Joined {
    let mut text = String::new();
    let mut pending = 0;
    let mut has_content = false;
    for block in blocks {
        match block {
            Block::Blank => pending += 1,
            Block::Content(content) => {
                if has_content {
                    text.push_str("\n\n");
                }
                text.push_str(&"\n".repeat(pending));
                text.push_str(&content);
                pending = 0;
                has_content = true;
            }
        }
    }
    Joined {
        text,
        trailing_blanks: pending,
        has_content,
    }
}

const CONTAINER_TAGS: &[&str] = &[
    "div", "section", "article", "main", "header", "footer", "aside", "figure", "li", "body",
];

fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol" | "blockquote" | "pre" | "hr"
    ) || CONTAINER_TAGS.contains(&tag)
}

fn is_block_node(node: &RichNode) -> bool {
    match node {
        RichNode::Table(_) | RichNode::Diagram(_) => true,
        RichNode::Element(element) => is_block_tag(&element.tag),
        _ => false,
    }
}

struct MarkdownWriter<'a> {
    rules: &'a SerializerRules,
}

impl MarkdownWriter<'_> {
    fn blocks(&self, nodes: &[RichNode]) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut run: Vec<RichNode> = Vec::new();
        for node in nodes {
            if is_block_node(node) {
                self.flush_run(&mut run, &mut blocks);
                self.block(node, &mut blocks);
            } else {
                run.push(node.clone());
            }
        }
        self.flush_run(&mut run, &mut blocks);
        blocks
    }

    /// Loose inline content between blocks forms an implicit paragraph.
    fn flush_run(&self, run: &mut Vec<RichNode>, blocks: &mut Vec<Block>) {
        if run.is_empty() {
            return;
        }
        let text = self.paragraph_text(run);
        run.clear();
        if !text.is_empty() {
            blocks.push(Block::Content(text));
        }
    }

    fn block(&self, node: &RichNode, blocks: &mut Vec<Block>) {
        match node {
            RichNode::Table(table) => {
                if let Some(text) = self.table(table) {
                    blocks.push(Block::Content(text));
                }
            }
            RichNode::Diagram(diagram) => {
                blocks.push(Block::Content(
                    self.fenced(&self.rules.diagram_language, &diagram.source),
                ));
            }
            RichNode::Element(element) => self.element_block(element, blocks),
            _ => {}
        }
    }

    fn element_block(&self, element: &Element, blocks: &mut Vec<Block>) {
        let tag = element.tag.as_str();
        match tag {
            "p" => {
                let text = self.paragraph_text(&element.children);
                if text.trim().is_empty() {
                    blocks.push(Block::Blank);
                } else {
                    blocks.push(Block::Content(text));
                }
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = usize::from(tag.as_bytes()[1] - b'0');
                blocks.push(Block::Content(self.heading(level, element)));
            }
            "ul" | "ol" => {
                if let Some(text) = self.list(element) {
                    blocks.push(Block::Content(text));
                }
            }
            "blockquote" => blocks.push(Block::Content(self.blockquote(element))),
            "pre" => blocks.push(Block::Content(self.code_block(element))),
            "hr" => blocks.push(Block::Content(self.rules.horizontal_rule.clone())),
            _ => blocks.extend(self.blocks(&element.children)),
        }
    }

    fn paragraph_text(&self, nodes: &[RichNode]) -> String {
        self.inline(nodes, false).trim().to_string()
    }

    fn inline(&self, nodes: &[RichNode], in_table: bool) -> String {
        let line = if in_table {
            LineState::after(None)
        } else {
            LineState::line_start()
        };
        let mut writer = InlineWriter::new(self.rules, in_table, line, None);
        writer.last_space = true;
        writer.nodes(nodes);
        writer.out
    }

    fn heading(&self, level: usize, element: &Element) -> String {
        let text = self.inline(&element.children, false);
        let text = text.trim();
        if self.rules.heading_style == HeadingStyle::Setext && level <= 2 && !text.is_empty() {
            let underline = if level == 1 { "=" } else { "-" };
            let width = text
                .lines()
                .map(|line| line.chars().count())
                .max()
                .unwrap_or(0)
                .max(3);
            return format!("{text}\n{}", underline.repeat(width));
        }
        let hashes = "#".repeat(level);
        if text.is_empty() {
            hashes
        } else {
            format!("{hashes} {}", text.replace("  \n", " "))
        }
    }

    fn list(&self, list: &Element) -> Option<String> {
        let ordered = list.tag == "ol";
        let start = list
            .attribute("start")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(1);
        let items: Vec<&Element> = list
            .children
            .iter()
            .filter_map(|child| child.as_element("li"))
            .collect();
        if items.is_empty() {
            return None;
        }
        let loose = items
            .iter()
            .any(|item| item.children.iter().any(|c| c.as_element("p").is_some()));

        let rendered: Vec<String> = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let marker = if ordered {
                    format!("{}.", start + index as u64)
                } else {
                    self.rules.bullet_marker.to_string()
                };
                let parts: Vec<String> = self
                    .blocks(&item.children)
                    .into_iter()
                    .filter_map(|block| match block {
                        Block::Content(text) => Some(text),
                        Block::Blank => None,
                    })
                    .collect();
                let content = parts.join(if loose { "\n\n" } else { "\n" });
                indent_item(&marker, &content)
            })
            .collect();
        Some(rendered.join(if loose { "\n\n" } else { "\n" }))
    }

    fn blockquote(&self, quote: &Element) -> String {
        // A blank paragraph has no Markdown form inside a quote.
        let blocks = self
            .blocks(&quote.children)
            .into_iter()
            .filter(|block| matches!(block, Block::Content(_)))
            .collect();
        let joined = join_blocks(blocks);
        if joined.text.is_empty() {
            return ">".to_string();
        }
        joined
            .text
            .split('\n')
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn code_block(&self, pre: &Element) -> String {
        let (language, text) = match pre.children.as_slice() {
            [RichNode::Element(code)] if code.tag == "code" => (
                code_language(code).or_else(|| pre.attribute("lang").map(str::to_string)),
                code.children.iter().map(RichNode::plain_text).collect::<String>(),
            ),
            children => (
                pre.attribute("lang").map(str::to_string),
                children.iter().map(RichNode::plain_text).collect::<String>(),
            ),
        };
        let content = text.strip_suffix('\n').unwrap_or(&text);
        self.fenced(language.as_deref().unwrap_or(""), content)
    }

    fn fenced(&self, info: &str, content: &str) -> String {
        let fence = fence_for(&self.rules.code_fence, content);
        if content.is_empty() {
            format!("{fence}{info}\n{fence}")
        } else {
            format!("{fence}{info}\n{content}\n{fence}")
        }
    }

    fn table(&self, table: &Table) -> Option<String> {
        let rows: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|cell| {
                        self.inline(&flatten_blocks(&cell.content), true)
                            .replace("  \n", " ")
                            .trim()
                            .to_string()
                    })
                    .collect()
            })
            .collect();
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return None;
        }

        // Calculate column widths, minimum 3 for the alignment markers
        let mut col_widths = vec![3; columns];
        for row in &rows {
            for (i, text) in row.iter().enumerate() {
                col_widths[i] = col_widths[i].max(text.chars().count());
            }
        }

        let row_line = |row: &[String]| {
            let mut line = String::from("|");
            for (i, &width) in col_widths.iter().enumerate() {
                let text = row.get(i).map(String::as_str).unwrap_or("");
                line.push_str(&format!(" {text:width$} |"));
            }
            line
        };

        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(row_line(&rows[0]));

        let mut separator = String::from("|");
        for (i, &width) in col_widths.iter().enumerate() {
            let align = table.rows[0]
                .cells
                .get(i)
                .map(|cell| cell.align)
                .unwrap_or(TableCellAlignment::None);
            let dashes = "-".repeat(width.saturating_sub(2));
            match align {
                TableCellAlignment::Left => separator.push_str(&format!(" :{dashes}- |")),
                TableCellAlignment::Right => separator.push_str(&format!(" -{dashes}: |")),
                TableCellAlignment::Center => separator.push_str(&format!(" :{dashes}: |")),
                TableCellAlignment::None => separator.push_str(&format!(" -{dashes}- |")),
            }
        }
        lines.push(separator);

        for row in &rows[1..] {
            lines.push(row_line(row));
        }
        Some(lines.join("\n"))
    }
}

fn code_language(code: &Element) -> Option<String> {
    code.attribute("class")?
        .split_whitespace()
        .find_map(|class| class.strip_prefix("language-"))
        .map(str::to_string)
}

/// The configured fence, lengthened past any run of its character in `content`.
fn fence_for(base: &str, content: &str) -> String {
    let fence_char = base.chars().next().unwrap_or('`');
    let base_len = base.chars().count().max(3);
    let mut longest = 0;
    let mut current = 0;
    for c in content.chars() {
        if c == fence_char {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    let len = if longest >= base_len { longest + 1 } else { base_len };
    fence_char.to_string().repeat(len)
}

fn indent_item(marker: &str, content: &str) -> String {
    if content.is_empty() {
        return marker.to_string();
    }
    let pad = " ".repeat(marker.len() + 1);
    let mut out = String::new();
    for (index, line) in content.split('\n').enumerate() {
        if index == 0 {
            out.push_str(marker);
            out.push(' ');
            out.push_str(line);
        } else {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&pad);
                out.push_str(line);
            }
        }
    }
    out
}

/// Cell content may hold paragraphs; tables only take one line of inlines.
fn flatten_blocks(nodes: &[RichNode]) -> Vec<RichNode> {
    let mut out = Vec::new();
    for node in nodes {
        match node {
            RichNode::Element(element) if is_block_node(node) => {
                if !out.is_empty() {
                    out.push(RichNode::text(" "));
                }
                out.extend(flatten_blocks(&element.children));
            }
            other => out.push(other.clone()),
        }
    }
    out
}

fn link_destination(target: &str) -> String {
    if target.contains(|c: char| c.is_whitespace() || c == '(' || c == ')') {
        format!("<{}>", target.replace('<', "%3C").replace('>', "%3E"))
    } else {
        target.to_string()
    }
}

fn link_title(title: &Option<String>) -> String {
    match title {
        Some(title) if !title.is_empty() => format!(" \"{}\"", escape_title(title)),
        _ => String::new(),
    }
}

/// First character the writer emits for `nodes`.
///
/// Delimited runs are reported by their content: the run may be written
/// without delimiters, and a word character is the stricter guess.
fn leading_char(nodes: &[RichNode]) -> Option<char> {
    nodes.iter().find_map(|node| match node {
        RichNode::Text(text) => text
            .chars()
            .next()
            .map(|c| if is_collapsible_space(c) { ' ' } else { c }),
        RichNode::Link(_) => Some('['),
        RichNode::Image(_) => Some('!'),
        RichNode::Element(element) => match element.tag.as_str() {
            "code" | "kbd" => Some('`'),
            "br" => Some('\n'),
            "input" => Some('['),
            _ => leading_char(&element.children),
        },
        other => other.plain_text().chars().next(),
    })
}

/// Splits ASCII punctuation off the outer edges of the first and last text children.
fn peel_punctuation(children: &[RichNode]) -> Option<(String, Vec<RichNode>, String)> {
    let is_edge = |c: char| c.is_ascii_punctuation();
    let mut inner = children.to_vec();
    let mut head = String::new();
    let mut tail = String::new();

    if let Some(RichNode::Text(text)) = inner.first_mut() {
        let rest = text.trim_start_matches(is_edge);
        head = text[..text.len() - rest.len()].to_string();
        *text = rest.to_string();
    }
    if let Some(RichNode::Text(text)) = inner.last_mut() {
        let rest = text.trim_end_matches(is_edge);
        tail = text[rest.len()..].to_string();
        text.truncate(rest.len());
    }
    if head.is_empty() && tail.is_empty() {
        return None;
    }
    inner.retain(|node| !matches!(node, RichNode::Text(text) if text.is_empty()));
    Some((head, inner, tail))
}

/// Writes inline content, collapsing whitespace the way a browser would.
struct InlineWriter<'a> {
    rules: &'a SerializerRules,
    in_table: bool,
    out: String,
    /// Whether the last visible output was a space or line break.
    last_space: bool,
    line: LineState,
    /// Markup the enclosing writer puts right after this content.
    after: Option<char>,
}

impl<'a> InlineWriter<'a> {
    fn new(
        rules: &'a SerializerRules,
        in_table: bool,
        line: LineState,
        after: Option<char>,
    ) -> Self {
        InlineWriter {
            rules,
            in_table,
            out: String::new(),
            last_space: false,
            line,
            after,
        }
    }

    /// Renders `nodes` for placement between `open` and `close` markup.
    fn nested(&self, nodes: &[RichNode], open: char, close: char) -> InlineWriter<'a> {
        let mut writer = InlineWriter::new(
            self.rules,
            self.in_table,
            LineState::after(Some(open)),
            Some(close),
        );
        writer.last_space = self.last_space;
        writer.nodes(nodes);
        writer
    }

    fn nodes(&mut self, nodes: &[RichNode]) {
        self.nodes_before(nodes, self.after);
    }

    /// Writes `nodes` where `tail` is the character that follows the last one.
    fn nodes_before(&mut self, nodes: &[RichNode], tail: Option<char>) {
        for (index, node) in nodes.iter().enumerate() {
            let next = leading_char(&nodes[index + 1..]).or(tail);
            self.node(node, next);
        }
    }

    fn node(&mut self, node: &RichNode, next: Option<char>) {
        match node {
            RichNode::Text(text) => self.text(text),
            RichNode::Link(link) => self.link(link),
            RichNode::Image(image) => self.image(image),
            RichNode::Element(element) => self.element(element, next),
            RichNode::Diagram(diagram) => self.text(&diagram.source),
            RichNode::Table(_) => self.text(&node.plain_text()),
        }
    }

    /// Appends already formed Markdown.
    fn markup(&mut self, markup: &str) {
        if markup.starts_with('[') && self.line.prev == Some('!') && self.out.ends_with('!') {
            self.out.pop();
            self.out.push_str("\\!");
        }
        self.out.push_str(markup);
        self.line.wrote(markup);
    }

    fn text(&mut self, text: &str) {
        let mut collapsed = String::with_capacity(text.len());
        for c in text.chars() {
            if is_collapsible_space(c) {
                if !self.last_space {
                    collapsed.push(' ');
                    self.last_space = true;
                }
            } else {
                collapsed.push(c);
                self.last_space = false;
            }
        }
        let escaped = escape_run(&collapsed, &mut self.line, self.in_table);
        self.out.push_str(&escaped);
    }

    fn element(&mut self, element: &Element, next: Option<char>) {
        let rules = self.rules;
        match element.tag.as_str() {
            "em" | "i" => {
                self.delimited(&rules.emphasis_delimiter, true, &element.children, next)
            }
            "strong" | "b" => {
                self.delimited(&rules.strong_delimiter, true, &element.children, next)
            }
            "s" | "strike" | "del" => {
                self.delimited(&rules.strike_delimiter, false, &element.children, next)
            }
            "code" | "kbd" => self.code_span(element),
            "br" => {
                let kept = self.out.trim_end_matches(' ').len();
                self.out.truncate(kept);
                self.out.push_str("  \n");
                self.line = LineState::line_start();
                self.last_space = true;
            }
            "input" => {
                if element.attribute("type") == Some("checkbox") {
                    let mark = if element.attribute("checked").is_some() {
                        "[x]"
                    } else {
                        "[ ]"
                    };
                    self.markup(mark);
                    self.last_space = false;
                }
            }
            tag if is_block_tag(tag) => {
                if !self.last_space && !self.out.is_empty() {
                    self.markup(" ");
                    self.last_space = true;
                }
                self.nodes_before(&element.children, next);
            }
            _ => self.nodes_before(&element.children, next),
        }
    }

    /// Wraps content in `delimiter`, moving edge whitespace outside.
    fn delimited(
        &mut self,
        delimiter: &str,
        swappable: bool,
        children: &[RichNode],
        next: Option<char>,
    ) {
        let mut candidates = vec![delimiter.to_string()];
        if swappable {
            candidates.extend(swapped_delimiter(delimiter));
        }
        if self.try_delimited(&candidates, children, next) {
            return;
        }

        // `_a._` before a letter cannot close, `_a_.` can.
        if let Some((head, inner, tail)) = peel_punctuation(children) {
            self.text(&head);
            let inner_next = tail.chars().next().or(next);
            if !inner.is_empty() && !self.try_delimited(&candidates, &inner, inner_next) {
                self.nodes_before(&inner, inner_next);
            }
            self.text(&tail);
            return;
        }
        self.nodes_before(children, next);
    }

    /// Writes the first candidate that reads back as a delimited run; false writes nothing.
    fn try_delimited(
        &mut self,
        candidates: &[String],
        children: &[RichNode],
        next: Option<char>,
    ) -> bool {
        let before = self.line.prev;
        for candidate in candidates {
            let Some(mark) = candidate.chars().next() else {
                continue;
            };
            let inner = self.nested(children, mark, mark);
            let content = inner.out.trim_start();
            let lead = &inner.out[..inner.out.len() - content.len()];
            let core = content.trim_end();
            let trail = &content[core.len()..];
            if core.is_empty() {
                self.markup(&inner.out);
                self.last_space = inner.last_space;
                return true;
            }

            let open_before = if lead.is_empty() { before } else { Some(' ') };
            let close_after = if trail.is_empty() { next } else { Some(' ') };
            if close_after == Some(mark)
                || !delimiter_fits(candidate, open_before, core, close_after)
            {
                continue;
            }
            self.markup(&format!("{lead}{candidate}{core}{candidate}{trail}"));
            self.last_space = inner.last_space && !trail.is_empty();
            return true;
        }
        false
    }

    fn code_span(&mut self, element: &Element) {
        let code: String = element
            .children
            .iter()
            .map(RichNode::plain_text)
            .collect::<String>()
            .replace('\n', " ");
        if code.is_empty() {
            return;
        }
        let mut longest = 0;
        let mut current = 0;
        for c in code.chars() {
            if c == '`' {
                current += 1;
                longest = longest.max(current);
            } else {
                current = 0;
            }
        }
        let fence = "`".repeat(longest + 1);
        let needs_padding = code.starts_with('`')
            || code.ends_with('`')
            || (code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty());
        let code = if self.in_table {
            code.replace('|', r"\|")
        } else {
            code
        };
        if needs_padding {
            self.markup(&format!("{fence} {code} {fence}"));
        } else {
            self.markup(&format!("{fence}{code}{fence}"));
        }
        self.last_space = false;
    }

    fn link(&mut self, link: &Link) {
        let inner = self.nested(&link.children, '[', ']');
        self.markup(&format!(
            "[{}]({}{})",
            inner.out.trim(),
            link_destination(&link.href),
            link_title(&link.title)
        ));
        self.last_space = false;
    }

    fn image(&mut self, image: &Image) {
        let alt = escape_run(&image.alt, &mut LineState::after(Some('[')), self.in_table);
        self.markup(&format!(
            "![{alt}]({}{})",
            link_destination(&image.src),
            link_title(&image.title)
        ));
        self.last_space = false;
    }
}
