use crate::editing::{Dispatch, EditorState, Transaction};
use crate::model::Node;
use crate::transform::{StepError, Transform};

/// Rewrite every number label into a strict document-order sequence
/// starting at `first`.
///
/// Only labels that differ from their sequence value are touched, so an
/// already sequential document yields `Ok(None)`. Malformed border numbers
/// are neither counted nor rewritten.
pub fn make_border_numbers_sequential(
    doc: &Node,
    first: usize,
) -> Result<Option<Transform>, StepError> {
    // (label content start, label content end, current label)
    let mut labels = Vec::new();
    doc.descendants(&mut |node, pos, _, _| {
        if let Some((number, _)) = node.border_number_parts() {
            let start = pos + 2;
            labels.push((start, start + number.content_size(), number.text_content()));
        }
        !node.is_textblock()
    });

    let mut tr = Transform::new(doc.clone());
    for (index, (from, to, current)) in labels.into_iter().enumerate() {
        let expected = (first + index).to_string();
        if current == expected {
            continue;
        }
        let mapping = tr.mapping();
        let (from, to) = (mapping.map(from), mapping.map(to));
        tr.replace(from, to, vec![Node::text(expected)])?;
    }

    if !tr.doc_changed() {
        return Ok(None);
    }
    log::debug!("Renumbered {} border number labels", tr.steps().len());
    Ok(Some(tr))
}

/// `doc` with sequential labels
pub fn renumbered(doc: &Node, first: usize) -> Result<Node, StepError> {
    Ok(make_border_numbers_sequential(doc, first)?
        .map_or_else(|| doc.clone(), |tr| tr.doc().clone()))
}

/// Command form of [`make_border_numbers_sequential`]; the selection is
/// carried through the label rewrites.
pub fn renumber(state: &EditorState, dispatch: Dispatch<'_>) -> bool {
    match make_border_numbers_sequential(state.doc(), state.options().first_number) {
        Ok(Some(tr)) => {
            if let Some(dispatch) = dispatch {
                dispatch(Transaction::new(tr));
            }
            true
        }
        Ok(None) => false,
        Err(err) => {
            log::error!("Discarding renumbering: {err}");
            false
        }
    }
}
