use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use crate::model::{Mark, Node};

/// Read plain clipboard text as Markdown. Every paragraph, heading or list
/// item becomes a paragraph; strong and emphasis become marks.
pub fn parse_plain_text(text: &str) -> Vec<Node> {
    let parser = Parser::new(text);
    let mut blocks = Vec::new();
    let mut inline: Option<Vec<Node>> = None;
    let mut marks: Vec<Mark> = Vec::new();

    for event in parser {
        match event {
            Event::Start(Tag::Paragraph | Tag::Heading { .. } | Tag::Item) => {
                flush(&mut inline, &mut blocks);
                inline = Some(Vec::new());
            }
            Event::End(
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::CodeBlock,
            ) => {
                flush(&mut inline, &mut blocks);
            }
            Event::Start(Tag::Strong) => marks.push(Mark::Strong),
            Event::Start(Tag::Emphasis) => marks.push(Mark::Emphasis),
            Event::End(TagEnd::Strong) => pop_mark(&mut marks, &Mark::Strong),
            Event::End(TagEnd::Emphasis) => pop_mark(&mut marks, &Mark::Emphasis),
            Event::Text(text) | Event::Code(text) => {
                inline
                    .get_or_insert_with(Vec::new)
                    .push(Node::text_with_marks(text.to_string(), marks.clone()));
            }
            Event::SoftBreak => {
                inline
                    .get_or_insert_with(Vec::new)
                    .push(Node::text_with_marks(" ", marks.clone()));
            }
            Event::HardBreak => {
                inline
                    .get_or_insert_with(Vec::new)
                    .push(Node::text_with_marks("\n", marks.clone()));
            }
            _ => {}
        }
    }
    flush(&mut inline, &mut blocks);
    blocks
}

fn flush(inline: &mut Option<Vec<Node>>, blocks: &mut Vec<Node>) {
    if let Some(content) = inline.take()
        && !content.is_empty()
    {
        blocks.push(Node::paragraph(content));
    }
}

fn pop_mark(marks: &mut Vec<Mark>, mark: &Mark) {
    if let Some(index) = marks.iter().rposition(|m| m == mark) {
        marks.remove(index);
    }
}
