// Shared builders for unit tests

use crate::editing::{Dispatch, EditorState, Selection, Transaction};
use crate::model::{Mark, Node};
use crate::options::EngineOptions;

pub fn doc(content: Vec<Node>) -> Node {
    Node::doc(content)
}

pub fn p(text: &str) -> Node {
    Node::paragraph_text(text)
}

pub fn bn(label: &str, blocks: Vec<Node>) -> Node {
    Node::border_number(
        Node::border_number_number(label),
        Node::border_number_content(blocks),
    )
}

pub fn link(nr: &str, text: &str) -> Node {
    Node::text_with_marks(text, vec![Mark::border_number_link(nr)])
}

pub fn state(doc: Node, from: usize, to: usize) -> EditorState {
    EditorState::new(doc, EngineOptions::default()).with_selection(Selection::new(from, to))
}

pub fn caret(doc: Node, pos: usize) -> EditorState {
    state(doc, pos, pos)
}

/// Run `command` with a recording dispatch; returns its result and the
/// committed transaction, if any
pub fn dispatched<F>(state: &EditorState, command: F) -> (bool, Option<Transaction>)
where
    F: FnOnce(&EditorState, Dispatch<'_>) -> bool,
{
    let mut committed = None;
    let mut record = |tr: Transaction| committed = Some(tr);
    let handled = command(state, Some(&mut record));
    (handled, committed)
}
