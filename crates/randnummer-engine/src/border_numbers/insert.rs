use crate::editing::{Bias, Dispatch, EditorState, Transaction};
use crate::model::{Node, NodeType};
use crate::transform::{Retained, StepError, Transform};

/// Wrap every non-empty paragraph touched by the selection into a border
/// number with a placeholder label.
///
/// Paragraphs that already sit inside a border number are skipped, so
/// wrapping never nests. With a dispatch, a renumbering pass is scheduled
/// whether or not anything was wrapped. Returns `false` when there was
/// nothing to wrap.
pub fn add_border_numbers(state: &EditorState, dispatch: Dispatch<'_>) -> bool {
    let sel = state.selection();
    let targets = wrap_targets(state.doc(), sel.from(), sel.to());

    let Some(dispatch) = dispatch else {
        return !targets.is_empty();
    };
    state.scheduler().schedule_renumber();
    if targets.is_empty() {
        log::debug!("No paragraph to wrap in {}..{}", sel.from(), sel.to());
        return false;
    }

    let tr = match wrap(state, &targets) {
        Ok(tr) => tr,
        Err(err) => {
            log::error!("Discarding border number insertion: {err}");
            return false;
        }
    };
    log::debug!("Wrapped {} paragraphs into border numbers", targets.len());

    let selection = sel.map(tr.mapping()).normalized(tr.doc(), Bias::Forward);
    dispatch(Transaction::new(tr).with_selection(selection));
    true
}

/// Positions of the paragraphs to wrap, in document order
fn wrap_targets(doc: &Node, from: usize, to: usize) -> Vec<(usize, Node)> {
    let mut targets = Vec::new();
    doc.nodes_between(from, to, &mut |node, pos, parent, _| {
        if parent.kind() == NodeType::BorderNumberContent {
            return false;
        }
        if node.kind() == NodeType::Paragraph {
            if node.content_size() > 0 {
                targets.push((pos, node.clone()));
            }
            return false;
        }
        !node.is_textblock()
    });
    targets
}

fn wrap(state: &EditorState, targets: &[(usize, Node)]) -> Result<Transform, StepError> {
    let label = &state.options().placeholder_label;
    let mut tr = state.transform();
    for (pos, paragraph) in targets {
        // Earlier wrappers pushed this paragraph back
        let at = tr.mapping().map(*pos);
        let number = Node::border_number_number(label);
        let retained = Retained {
            from: at,
            to: at + paragraph.node_size(),
            // wrapper open, number, content open
            new_start: at + 1 + number.node_size() + 1,
        };
        let wrapped = Node::border_number(number, Node::border_number_content(vec![paragraph.clone()]));
        tr.replace_retaining(at, at + paragraph.node_size(), vec![wrapped], retained)?;
    }
    Ok(tr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::Selection;
    use crate::tests::{bn, caret, dispatched, doc, p, state};
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wraps_single_paragraph() {
        // Given a paragraph fully selected
        let s = state(doc(vec![p("Test content")]), 0, 14);

        // When inserting border numbers
        let (handled, tr) = dispatched(&s, add_border_numbers);

        // Then one wrapper with the placeholder label is created
        assert!(handled);
        let tr = tr.unwrap();
        assert_snapshot!(tr.doc().to_string(), @r#"doc(bn(num("0"), content(p("Test content"))))"#);
        assert_eq!(tr.steps().len(), 1);
        // The selection covers the paragraph text inside the content
        assert_eq!(tr.selection(), Some(Selection::new(6, 18)));
        assert!(s.scheduler().peek().renumber);
    }

    #[test]
    fn test_caret_keeps_its_character() {
        // caret between "ab" and "cd"
        let s = caret(doc(vec![p("abcd")]), 3);
        let (_, tr) = dispatched(&s, add_border_numbers);
        let tr = tr.unwrap();
        let sel = tr.selection().unwrap();
        assert!(sel.is_empty());
        let rp = tr.doc().resolve(sel.from()).unwrap();
        assert_eq!(rp.parent().kind(), NodeType::Paragraph);
        assert_eq!(rp.parent_offset(), 2);
    }

    #[test]
    fn test_selection_at_first_wrapped_paragraph() {
        // p("ab") 0..4 becomes bn at 0 with p at 5, text 6..8
        let d = doc(vec![p("ab"), p("cd")]);

        let (_, tr) = dispatched(&caret(d.clone(), 1), add_border_numbers);
        assert_eq!(tr.unwrap().selection(), Some(Selection::caret(6)));

        let (_, tr) = dispatched(&caret(d.clone(), 3), add_border_numbers);
        assert_eq!(tr.unwrap().selection(), Some(Selection::caret(8)));

        // a range starting in front of the paragraph moves into its text
        let (_, tr) = dispatched(&state(d, 0, 3), add_border_numbers);
        let tr = tr.unwrap();
        assert_snapshot!(tr.doc().to_string(), @r#"doc(bn(num("0"), content(p("ab"))), p("cd"))"#);
        assert_eq!(tr.selection(), Some(Selection::new(6, 8)));
    }

    #[test]
    fn test_wraps_every_paragraph_in_range_with_shift() {
        let d = doc(vec![p("one"), p(""), p("two"), p("three")]);
        // from inside "one" to inside "two"
        let s = state(d, 2, 10);
        let (handled, tr) = dispatched(&s, add_border_numbers);
        assert!(handled);
        let tr = tr.unwrap();
        assert_snapshot!(tr.doc().to_string(), @r#"doc(bn(num("0"), content(p("one"))), p(), bn(num("0"), content(p("two"))), p("three"))"#);
        assert_eq!(tr.steps().len(), 2);

        let sel = tr.selection().unwrap();
        let start = tr.doc().resolve(sel.from()).unwrap();
        let end = tr.doc().resolve(sel.to()).unwrap();
        assert_eq!((start.parent().text_content(), start.parent_offset()), ("one".to_string(), 1));
        assert_eq!((end.parent().text_content(), end.parent_offset()), ("two".to_string(), 2));
    }

    #[test]
    fn test_already_wrapped_range_is_a_noop() {
        let s = state(doc(vec![bn("1", vec![p("Test content")])]), 0, 21);
        let (handled, tr) = dispatched(&s, add_border_numbers);
        assert!(!handled);
        assert!(tr.is_none());
        // Renumbering is still requested
        assert!(s.scheduler().peek().renumber);
    }

    #[test]
    fn test_mixed_range_never_nests() {
        let d = doc(vec![p("a"), bn("1", vec![p("b"), p("c")]), p("d")]);
        let size = d.content_size();
        let s = state(d, 0, size);
        let (_, tr) = dispatched(&s, add_border_numbers);
        assert_snapshot!(tr.unwrap().doc().to_string(), @r#"doc(bn(num("0"), content(p("a"))), bn(num("1"), content(p("b"), p("c"))), bn(num("0"), content(p("d"))))"#);
    }

    #[test]
    fn test_dry_run_schedules_nothing() {
        let s = caret(doc(vec![p("abc")]), 2);
        assert!(add_border_numbers(&s, None));
        assert!(!s.scheduler().is_pending());

        let empty = caret(doc(vec![p("")]), 1);
        assert!(!add_border_numbers(&empty, None));
    }

    #[test]
    fn test_caret_between_blocks_wraps_nothing() {
        let s = caret(doc(vec![p("ab"), p("cd")]), 4);
        assert!(!add_border_numbers(&s, None));
    }

    #[test]
    fn test_custom_placeholder_label() {
        let options = crate::options::EngineOptions {
            placeholder_label: "?".to_string(),
            ..Default::default()
        };
        let s = EditorState::new(doc(vec![p("x")]), options).with_selection(Selection::caret(1));
        let (_, tr) = dispatched(&s, add_border_numbers);
        assert_eq!(tr.unwrap().doc(), &doc(vec![bn("?", vec![p("x")])]));
    }
}
