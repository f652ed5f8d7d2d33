use std::sync::OnceLock;

use regex::Regex;

use crate::model::{Mark, Node, NodeType};

const LINK_ATTR: &str = "data-border-number-link";

/// Serialize blocks into clipboard HTML
pub fn to_html(blocks: &[Node]) -> String {
    let mut out = String::new();
    for block in blocks {
        write_node(block, &mut out);
    }
    out
}

fn element_name(kind: NodeType) -> Option<&'static str> {
    match kind {
        NodeType::Paragraph => Some("p"),
        NodeType::BorderNumber => Some("border-number"),
        NodeType::BorderNumberNumber => Some("border-number-number"),
        NodeType::BorderNumberContent => Some("border-number-content"),
        NodeType::Doc | NodeType::Text => None,
    }
}

fn write_node(node: &Node, out: &mut String) {
    if let Some(text) = node.text_str() {
        write_text(text, node.marks(), out);
        return;
    }
    let name = element_name(node.kind());
    if let Some(name) = name {
        out.push_str(&format!("<{name}>"));
    }
    for child in node.content() {
        write_node(child, out);
    }
    if let Some(name) = name {
        out.push_str(&format!("</{name}>"));
    }
}

fn write_text(text: &str, marks: &[Mark], out: &mut String) {
    for mark in marks {
        match mark {
            Mark::Strong => out.push_str("<strong>"),
            Mark::Emphasis => out.push_str("<em>"),
            Mark::BorderNumberLink { nr } => out.push_str(&format!(
                "<a {LINK_ATTR}=\"{}\">",
                html_escape::encode_double_quoted_attribute(nr)
            )),
        }
    }
    out.push_str(&html_escape::encode_text(text));
    for mark in marks.iter().rev() {
        out.push_str(match mark {
            Mark::Strong => "</strong>",
            Mark::Emphasis => "</em>",
            Mark::BorderNumberLink { .. } => "</a>",
        });
    }
}

fn tag_regex() -> &'static Regex {
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    TAG_REGEX.get_or_init(|| {
        Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9-]*)([^>]*)>").expect("Invalid tag regex")
    })
}

fn link_attr_regex() -> &'static Regex {
    static LINK_REGEX: OnceLock<Regex> = OnceLock::new();
    LINK_REGEX.get_or_init(|| {
        Regex::new(r#"data-border-number-link\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("Invalid link attribute regex")
    })
}

/// An element being assembled while reading HTML
struct Frame {
    kind: NodeType,
    children: Vec<Node>,
}

/// Read clipboard HTML back into blocks.
///
/// Understands the elements written by [`to_html`] and common inline
/// formatting; every other element is dropped while its text is kept.
/// Whatever the input, the result never nests border numbers.
pub fn parse_html(html: &str) -> Vec<Node> {
    let mut frames = vec![Frame {
        kind: NodeType::Doc,
        children: Vec::new(),
    }];
    // open inline elements and the mark each one applies
    let mut marks: Vec<(String, Option<Mark>)> = Vec::new();
    let mut last = 0;

    for caps in tag_regex().captures_iter(html) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_text(&mut frames, &marks, &html[last..whole.start()]);
        last = whole.end();

        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();
        let attrs = caps.get(3).map_or("", |m| m.as_str());

        if let Some(kind) = block_kind(&name) {
            if closing {
                close_until(&mut frames, kind);
            } else {
                // blocks never open inside inline content
                while frames.last().is_some_and(|frame| frame.kind.is_textblock()) {
                    close_top(&mut frames);
                }
                frames.push(Frame {
                    kind,
                    children: Vec::new(),
                });
            }
            continue;
        }
        if closing {
            if let Some(index) = marks.iter().rposition(|(open, _)| *open == name) {
                marks.truncate(index);
            }
        } else if let Some(mark) = inline_mark(&name, attrs) {
            marks.push((name, mark));
        }
    }
    push_text(&mut frames, &marks, &html[last..]);

    while frames.len() > 1 {
        close_top(&mut frames);
    }
    frames
        .pop()
        .map(|root| into_blocks(root.children))
        .unwrap_or_default()
}

fn block_kind(name: &str) -> Option<NodeType> {
    match name {
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" => Some(NodeType::Paragraph),
        "border-number" => Some(NodeType::BorderNumber),
        "border-number-number" => Some(NodeType::BorderNumberNumber),
        "border-number-content" => Some(NodeType::BorderNumberContent),
        _ => None,
    }
}

/// `Some(None)` for inline elements without a mark of their own
fn inline_mark(name: &str, attrs: &str) -> Option<Option<Mark>> {
    match name {
        "strong" | "b" => Some(Some(Mark::Strong)),
        "em" | "i" => Some(Some(Mark::Emphasis)),
        "a" => Some(link_attr_regex().captures(attrs).and_then(|caps| {
            let nr = caps.get(1).or_else(|| caps.get(2))?;
            Some(Mark::border_number_link(
                html_escape::decode_html_entities(nr.as_str()).into_owned(),
            ))
        })),
        "span" | "u" | "code" => Some(None),
        _ => None,
    }
}

fn push_text(frames: &mut [Frame], marks: &[(String, Option<Mark>)], raw: &str) {
    let Some(frame) = frames.last_mut() else {
        return;
    };
    let text = html_escape::decode_html_entities(raw);
    let inline = frame.kind.is_textblock();
    if text.is_empty() || (!inline && text.trim().is_empty()) {
        return;
    }
    let text = if inline { text.as_ref() } else { text.trim() };
    let mut applied: Vec<Mark> = Vec::new();
    for mark in marks.iter().filter_map(|(_, mark)| mark.clone()) {
        if !applied.contains(&mark) {
            applied.push(mark);
        }
    }
    frame.children.push(Node::text_with_marks(text, applied));
}

/// Close frames up to and including the innermost one of `kind`; a stray
/// closing tag is ignored
fn close_until(frames: &mut Vec<Frame>, kind: NodeType) {
    let Some(index) = frames.iter().rposition(|frame| frame.kind == kind) else {
        return;
    };
    if index == 0 {
        return;
    }
    while frames.len() > index {
        close_top(frames);
    }
}

fn close_top(frames: &mut Vec<Frame>) {
    let Some(frame) = frames.pop() else {
        return;
    };
    let node = build(frame);
    if let Some(parent) = frames.last_mut() {
        parent.children.extend(node);
    }
}

fn build(frame: Frame) -> Option<Node> {
    match frame.kind {
        NodeType::Paragraph | NodeType::BorderNumberNumber => {
            let inline = frame.children.into_iter().flat_map(inline_of).collect();
            Some(Node::new(frame.kind, inline))
        }
        NodeType::BorderNumberContent => Some(Node::border_number_content(paragraphs_of(
            frame.children,
        ))),
        NodeType::BorderNumber => {
            let mut number = None;
            let mut blocks = Vec::new();
            for child in frame.children {
                match child.kind() {
                    NodeType::BorderNumberNumber if number.is_none() => number = Some(child),
                    NodeType::BorderNumberNumber => {}
                    NodeType::BorderNumberContent => blocks.extend(child.content().iter().cloned()),
                    _ => blocks.push(child),
                }
            }
            Some(Node::border_number(
                number.unwrap_or_else(|| Node::border_number_number("")),
                Node::border_number_content(paragraphs_of(blocks)),
            ))
        }
        NodeType::Doc | NodeType::Text => None,
    }
}

/// Bring structured blocks from outside into shape. Border numbers get
/// exactly one label and one content node; nested ones are flattened into
/// their parent's paragraphs.
pub fn repair_blocks(nodes: Vec<Node>) -> Vec<Node> {
    let repaired = nodes
        .into_iter()
        .flat_map(|node| match node.kind() {
            NodeType::Doc => node
                .content()
                .iter()
                .cloned()
                .filter_map(repair)
                .collect::<Vec<_>>(),
            _ => repair(node).into_iter().collect(),
        })
        .collect();
    into_blocks(repaired)
}

fn repair(node: Node) -> Option<Node> {
    if node.is_text() {
        return Some(node);
    }
    let children = node.content().iter().cloned().filter_map(repair).collect();
    build(Frame {
        kind: node.kind(),
        children,
    })
}

/// Text runs of a node, or the node itself when it is one
fn inline_of(node: Node) -> Vec<Node> {
    if node.is_text() {
        return vec![node];
    }
    node.content().iter().cloned().flat_map(inline_of).collect()
}

/// Blocks allowed at the top level. Loose text becomes paragraphs.
fn into_blocks(nodes: Vec<Node>) -> Vec<Node> {
    let mut blocks = Vec::new();
    let mut loose = Vec::new();
    for node in nodes {
        match node.kind() {
            NodeType::Text => loose.push(node),
            NodeType::Paragraph | NodeType::BorderNumber => {
                flush_loose(&mut loose, &mut blocks);
                blocks.push(node);
            }
            NodeType::BorderNumberContent => {
                flush_loose(&mut loose, &mut blocks);
                blocks.extend(node.content().iter().cloned());
            }
            // a label without its border number
            NodeType::BorderNumberNumber | NodeType::Doc => flush_loose(&mut loose, &mut blocks),
        }
    }
    flush_loose(&mut loose, &mut blocks);
    blocks
}

/// Blocks allowed inside border number content: paragraphs only
fn paragraphs_of(nodes: Vec<Node>) -> Vec<Node> {
    into_blocks(nodes)
        .into_iter()
        .flat_map(|block| match block.border_number_parts() {
            Some((_, content)) => content.content().to_vec(),
            None => vec![block],
        })
        .filter(|block| block.kind() == NodeType::Paragraph)
        .collect()
}

fn flush_loose(loose: &mut Vec<Node>, blocks: &mut Vec<Node>) {
    if !loose.is_empty() {
        blocks.push(Node::paragraph(std::mem::take(loose)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{bn, doc, link, p};
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_marks_and_escape() {
        let blocks = vec![Node::paragraph(vec![
            Node::text("<1> "),
            link("2", "Rn. 2"),
            Node::text_with_marks("!", vec![Mark::Strong, Mark::Emphasis]),
        ])];
        assert_eq!(
            to_html(&blocks),
            "<p>&lt;1&gt; <a data-border-number-link=\"2\">Rn. 2</a><strong><em>!</em></strong></p>"
        );
    }

    #[test]
    fn test_own_output_reads_back() {
        let blocks = vec![
            bn("1", vec![Node::paragraph(vec![Node::text("see "), link("2", "Rn. 2")])]),
            p("a & b"),
        ];
        assert_eq!(parse_html(&to_html(&blocks)), blocks);
    }

    #[test]
    fn test_foreign_markup_is_reduced_to_blocks() {
        let html = "<html><body><div><h2>Title</h2>loose <b>bold</b></div>\
                    <ul><li>item</li></ul></body></html>";
        let d = doc(parse_html(html));
        assert_snapshot!(d.to_string(), @r#"doc(p("Title"), p("loose", strong("bold")), p("item"))"#);
    }

    #[test]
    fn test_nested_border_numbers_are_flattened() {
        let html = "<border-number><border-number-number>1</border-number-number>\
                    <border-number-content><border-number><border-number-number>2</border-number-number>\
                    <border-number-content><p>inner</p></border-number-content></border-number>\
                    </border-number-content></border-number>";
        let blocks = parse_html(html);
        assert_eq!(blocks, vec![bn("1", vec![p("inner")])]);
    }

    #[test]
    fn test_border_number_without_label_or_content_element() {
        let blocks = parse_html("<border-number><p>text</p></border-number>");
        assert_eq!(
            blocks,
            vec![Node::border_number(
                Node::border_number_number(""),
                Node::border_number_content(vec![p("text")])
            )]
        );
        assert!(doc(blocks).check().is_ok());
    }

    #[test]
    fn test_unclosed_elements_are_closed() {
        assert_eq!(parse_html("<p>one<p>two"), vec![p("one"), p("two")]);
    }

    #[test]
    fn test_repair_adds_missing_content() {
        let malformed = Node::new(
            NodeType::BorderNumber,
            vec![Node::border_number_number("1")],
        );
        let blocks = repair_blocks(vec![malformed]);
        assert_eq!(blocks, vec![bn("1", vec![])]);
        assert!(doc(blocks).check().is_ok());
    }

    #[test]
    fn test_repair_flattens_nested_border_numbers() {
        let nested = bn("1", vec![p("a")]);
        let outer = Node::border_number(
            Node::border_number_number("2"),
            Node::border_number_content(vec![nested, p("b")]),
        );
        let blocks = repair_blocks(vec![outer]);
        assert_snapshot!(doc(blocks.clone()).to_string(), @r#"doc(bn(num("2"), content(p("a"), p("b"))))"#);
        assert!(doc(blocks).check().is_ok());
    }

    #[test]
    fn test_repair_keeps_valid_blocks_and_wraps_loose_text() {
        let valid = vec![p("x"), bn("3", vec![p("y")])];
        assert_eq!(repair_blocks(valid.clone()), valid);
        assert_eq!(repair_blocks(vec![Node::text("loose")]), vec![p("loose")]);
        assert_eq!(repair_blocks(vec![doc(vec![p("inner")])]), vec![p("inner")]);
    }
}
