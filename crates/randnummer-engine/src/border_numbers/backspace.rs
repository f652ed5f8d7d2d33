use crate::border_numbers::remove_border_numbers;
use crate::editing::{Dispatch, EditorState, Selection, Transaction};
use crate::model::{Mark, Node, NodeType, ResolvedPos};

/// How a single Backspace press is interpreted. Derived from the selection
/// on every keypress, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackspaceIntent {
    /// Caret inside a number label or directly after it: remove the border
    /// number
    CursorInsideOrAtNumberLabel,
    /// Range containing number labels: default deletion proceeds, the
    /// labels are invalidated afterwards
    RangeSelectionSpanningBorderNumbers { labels: Vec<String> },
    /// Caret directly after a link: delete the whole link span
    CursorImmediatelyAfterLinkMark { from: usize, to: usize },
    Default,
}

pub fn resolve_backspace_intent(state: &EditorState) -> BackspaceIntent {
    let sel = state.selection();
    let doc = state.doc();

    if !sel.is_empty() {
        let labels = labels_in_range(doc, sel);
        if labels.is_empty() {
            return BackspaceIntent::Default;
        }
        return BackspaceIntent::RangeSelectionSpanningBorderNumbers { labels };
    }

    let Ok(rp) = doc.resolve(sel.from()) else {
        return BackspaceIntent::Default;
    };
    if at_number_label(&rp) {
        return BackspaceIntent::CursorInsideOrAtNumberLabel;
    }
    match link_span_before(&rp) {
        Some((from, to)) => BackspaceIntent::CursorImmediatelyAfterLinkMark { from, to },
        None => BackspaceIntent::Default,
    }
}

/// Backspace handler. Returns `false` when the host should run its default
/// deletion.
pub fn handle_backspace(state: &EditorState, dispatch: Dispatch<'_>) -> bool {
    let intent = resolve_backspace_intent(state);
    log::debug!("Backspace at {:?} resolved to {intent:?}", state.selection());

    match intent {
        BackspaceIntent::CursorInsideOrAtNumberLabel => remove_border_numbers(state, dispatch),
        BackspaceIntent::RangeSelectionSpanningBorderNumbers { labels } => {
            if dispatch.is_some() {
                let scheduler = state.scheduler();
                scheduler.schedule_invalidation(labels);
                scheduler.schedule_renumber();
            }
            false
        }
        BackspaceIntent::CursorImmediatelyAfterLinkMark { from, to } => {
            let Some(dispatch) = dispatch else {
                return true;
            };
            let mut tr = state.transform();
            if let Err(err) = tr.delete(from, to) {
                log::error!("Discarding link deletion: {err}");
                return false;
            }
            dispatch(Transaction::new(tr).with_selection(Selection::caret(from)));
            true
        }
        BackspaceIntent::Default => false,
    }
}

/// Caret inside a label, or at the very start of the first block of a
/// border number's content
fn at_number_label(rp: &ResolvedPos<'_>) -> bool {
    let parent = rp.parent();
    if parent.kind() == NodeType::BorderNumberNumber {
        return true;
    }
    if rp.parent_offset() != 0 {
        return false;
    }
    if parent.kind() == NodeType::BorderNumberContent {
        return true;
    }
    let depth = rp.depth();
    depth >= 1
        && rp.node(depth - 1).map(Node::kind) == Some(NodeType::BorderNumberContent)
        && rp.index(depth - 1) == Some(0)
}

/// Labels of all number nodes a range touches, in document order. A border
/// number starting inside the range counts even when the range ends before
/// its label.
fn labels_in_range(doc: &Node, sel: Selection) -> Vec<String> {
    let mut labels = Vec::new();
    doc.nodes_between(sel.from(), sel.to(), &mut |node, pos, _, _| {
        match node.kind() {
            NodeType::BorderNumber if pos >= sel.from() => {
                if let Some(number) = node
                    .child(0)
                    .filter(|n| n.kind() == NodeType::BorderNumberNumber)
                {
                    labels.push(number.text_content());
                }
                false
            }
            NodeType::BorderNumberNumber => {
                labels.push(node.text_content());
                false
            }
            _ => !node.is_textblock(),
        }
    });
    labels
}

/// Maximal run around the character before the caret that carries the same
/// border number link
fn link_span_before(rp: &ResolvedPos<'_>) -> Option<(usize, usize)> {
    let mark = rp
        .marks_before()
        .iter()
        .find(|mark| mark.link_target().is_some())?;
    let parent = rp.parent();
    let start = rp.start(rp.depth())?;

    // child ranges relative to the parent's content start
    let mut ranges = Vec::with_capacity(parent.child_count());
    let mut pos = 0;
    for child in parent.content() {
        ranges.push((pos, pos + child.node_size(), has_mark(child, mark)));
        pos += child.node_size();
    }

    let offset = rp.parent_offset();
    let index = ranges
        .iter()
        .position(|&(from, to, _)| from < offset && offset <= to)?;
    let mut first = index;
    while first > 0 && ranges[first - 1].2 {
        first -= 1;
    }
    let mut last = index;
    while last + 1 < ranges.len() && ranges[last + 1].2 {
        last += 1;
    }
    Some((start + ranges[first].0, start + ranges[last].1))
}

fn has_mark(node: &Node, mark: &Mark) -> bool {
    node.is_text() && node.marks().contains(mark)
}
