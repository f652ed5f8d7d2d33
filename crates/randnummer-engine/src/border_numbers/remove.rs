use crate::editing::{Bias, Dispatch, EditorState, Transaction};
use crate::model::{Node, NodeType};
use crate::transform::{Retained, StepError, Transform};

/// Border numbers found in a range
struct Located {
    positions: Vec<usize>,
    /// The last node visited in the range was an empty textblock
    ends_in_empty_textblock: bool,
}

/// Unwrap every border number touched by the selection, or delete it when
/// its content holds no text.
///
/// With a dispatch, the removed labels are scheduled for link invalidation
/// together with a renumbering pass. Malformed border numbers are skipped.
pub fn remove_border_numbers(state: &EditorState, dispatch: Dispatch<'_>) -> bool {
    let sel = state.selection();
    let located = locate(state.doc(), sel.from(), sel.to());
    if located.positions.is_empty() {
        return false;
    }

    let (tr, labels) = match unwrap(state.transform(), &located.positions) {
        Ok(result) => result,
        Err(err) => {
            log::error!("Discarding border number removal: {err}");
            return false;
        }
    };
    if !tr.doc_changed() {
        return false;
    }
    let Some(dispatch) = dispatch else {
        return true;
    };
    log::debug!("Removed border numbers {labels:?}");

    let bias = if located.ends_in_empty_textblock {
        Bias::Backward
    } else {
        Bias::Forward
    };
    let selection = sel.map(tr.mapping()).normalized(tr.doc(), bias);
    dispatch(Transaction::new(tr).with_selection(selection));

    let scheduler = state.scheduler();
    scheduler.schedule_invalidation(labels);
    scheduler.schedule_renumber();
    true
}

fn locate(doc: &Node, from: usize, to: usize) -> Located {
    let mut located = Located {
        positions: Vec::new(),
        ends_in_empty_textblock: false,
    };
    doc.nodes_between(from, to, &mut |node, pos, _, _| {
        located.ends_in_empty_textblock = node.is_textblock() && node.content_size() == 0;
        if node.kind() == NodeType::BorderNumber {
            located.positions.push(pos);
        }
        true
    });
    located
}

/// Process `positions` back to front so that earlier positions stay valid.
/// Returns the transform and the removed labels in document order.
fn unwrap(mut tr: Transform, positions: &[usize]) -> Result<(Transform, Vec<String>), StepError> {
    let mut labels = Vec::new();
    for &pos in positions.iter().rev() {
        let Some(node) = tr.doc().node_at(pos).cloned() else {
            continue;
        };
        let Some((number, content)) = node.border_number_parts() else {
            log::warn!(
                "Skipping malformed border number at {pos} with {} children",
                node.child_count()
            );
            continue;
        };
        labels.push(number.text_content());

        let end = pos + node.node_size();
        if content.text_content().is_empty() {
            tr.delete(pos, end)?;
        } else {
            // content interior, re-inserted where the wrapper started
            let inner = pos + 1 + number.node_size() + 1;
            let retained = Retained {
                from: inner,
                to: inner + content.content_size(),
                new_start: pos,
            };
            tr.replace_retaining(pos, end, content.content().to_vec(), retained)?;
        }
    }
    labels.reverse();
    Ok((tr, labels))
}
