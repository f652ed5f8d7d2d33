use crate::clipboard::{ClipboardPayload, MarkupInspector, PayloadInspector};
use crate::editing::{Bias, Dispatch, EditorState, Selection, Transaction};
use crate::model::{Node, NodeType};

/// Paste handler: payloads carrying border numbers are inserted as new
/// top-level blocks after the block holding the selection start.
pub fn handle_paste(state: &EditorState, dispatch: Dispatch<'_>, payload: &ClipboardPayload) -> bool {
    let Some(inspector) = inspector_for(state) else {
        return false;
    };
    insert_at_block_boundary(state, dispatch, payload, state.selection().from(), &inspector)
}

/// Drop handler, like [`handle_paste`] for content dropped at `at`
pub fn handle_drop(
    state: &EditorState,
    dispatch: Dispatch<'_>,
    payload: &ClipboardPayload,
    at: usize,
) -> bool {
    let Some(inspector) = inspector_for(state) else {
        return false;
    };
    insert_at_block_boundary(state, dispatch, payload, at, &inspector)
}

fn inspector_for(state: &EditorState) -> Option<MarkupInspector> {
    match MarkupInspector::from_options(state.options()) {
        Ok(inspector) => Some(inspector),
        Err(err) => {
            log::error!("Invalid border number marker tags: {err}");
            None
        }
    }
}

/// Insert the payload's blocks after the top-level block containing `pos`.
///
/// Returns `false` without touching anything when the payload carries no
/// border numbers, or when `pos` sits in an empty top-level paragraph where
/// the default insertion already does the right thing. Renumbering is
/// scheduled whenever border numbers were detected.
pub fn insert_at_block_boundary(
    state: &EditorState,
    dispatch: Dispatch<'_>,
    payload: &ClipboardPayload,
    pos: usize,
    inspector: &dyn PayloadInspector,
) -> bool {
    if !inspector.contains_border_numbers(payload) {
        return false;
    }
    if dispatch.is_some() {
        state.scheduler().schedule_renumber();
    }

    let doc = state.doc();
    let Ok(rp) = doc.resolve(pos.min(doc.content_size())) else {
        return false;
    };
    let top = rp.node(1);
    if top.is_some_and(|node| node.kind() == NodeType::Paragraph && node.content_size() == 0) {
        log::debug!("Pasting border numbers into an empty paragraph, using default insertion");
        return false;
    }

    let blocks = payload.blocks();
    if blocks.is_empty() {
        return false;
    }
    let Some(dispatch) = dispatch else {
        return true;
    };

    let at = rp.after(1).unwrap_or(rp.pos());
    let inserted: usize = blocks.iter().map(Node::node_size).sum();
    let mut tr = state.transform();
    if let Err(err) = tr.insert(at, blocks) {
        log::error!("Discarding border number paste: {err}");
        return false;
    }
    log::debug!("Inserted pasted border numbers at {at}");

    let selection = Selection::caret(at + inserted).normalized(tr.doc(), Bias::Backward);
    dispatch(Transaction::new(tr).with_selection(selection));
    true
}
