use crate::model::Node;

/// Whether a link target currently resolves to a number label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Valid,
    Invalid,
}

impl LinkStatus {
    pub fn is_valid(self) -> bool {
        self == LinkStatus::Valid
    }
}

/// A maximal run of text carrying the same border number link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan {
    pub from: usize,
    pub to: usize,
    pub nr: String,
    pub status: LinkStatus,
}

/// Labels of all well-formed border numbers in document order
pub fn border_number_labels(doc: &Node) -> Vec<String> {
    let mut labels = Vec::new();
    doc.descendants(&mut |node, _, _, _| {
        if let Some((number, _)) = node.border_number_parts() {
            labels.push(number.text_content());
        }
        !node.is_textblock()
    });
    labels
}

/// Validity of a link to `nr`, derived from the labels of `doc`
pub fn link_status(doc: &Node, nr: &str) -> LinkStatus {
    status_in(&border_number_labels(doc), nr)
}

fn status_in(labels: &[String], nr: &str) -> LinkStatus {
    if labels.iter().any(|label| label == nr) {
        LinkStatus::Valid
    } else {
        LinkStatus::Invalid
    }
}

/// All link spans of `doc` in document order. Neighbouring text runs
/// linking to the same number form one span even if other marks differ.
pub fn border_number_links(doc: &Node) -> Vec<LinkSpan> {
    let labels = border_number_labels(doc);
    let mut spans: Vec<LinkSpan> = Vec::new();
    doc.descendants(&mut |node, pos, _, _| {
        let Some(nr) = node.marks().iter().find_map(|mark| mark.link_target()) else {
            return !node.is_text();
        };
        let end = pos + node.node_size();
        match spans.last_mut() {
            Some(last) if last.to == pos && last.nr == nr => last.to = end,
            _ => spans.push(LinkSpan {
                from: pos,
                to: end,
                nr: nr.to_string(),
                status: status_in(&labels, nr),
            }),
        }
        false
    });
    spans
}

/// Link spans pointing at one of the `removed` labels that no longer
/// resolve in `doc`
pub fn invalidate_border_number_links(doc: &Node, removed: &[String]) -> Vec<LinkSpan> {
    let invalid: Vec<LinkSpan> = border_number_links(doc)
        .into_iter()
        .filter(|span| !span.status.is_valid() && removed.contains(&span.nr))
        .collect();
    for span in &invalid {
        log::info!(
            "Link to border number {} at {}..{} is no longer valid",
            span.nr,
            span.from,
            span.to
        );
    }
    invalid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Mark, NodeType};
    use crate::tests::{bn, doc, link, p};
    use pretty_assertions::assert_eq;

    fn linked_doc() -> Node {
        doc(vec![
            bn("1", vec![p("first")]),
            bn("2", vec![p("second")]),
            Node::paragraph(vec![
                Node::text("see "),
                link("2", "Rn. 2"),
                Node::text(" and "),
                link("5", "Rn. 5"),
            ]),
        ])
    }

    #[test]
    fn test_labels_in_document_order() {
        assert_eq!(border_number_labels(&linked_doc()), vec!["1", "2"]);
    }

    #[test]
    fn test_labels_skip_malformed_border_numbers() {
        let d = doc(vec![
            Node::new(NodeType::BorderNumber, vec![Node::border_number_number("7")]),
            bn("1", vec![p("x")]),
        ]);
        assert_eq!(border_number_labels(&d), vec!["1"]);
    }

    #[test]
    fn test_link_status_is_derived_from_labels() {
        let d = linked_doc();
        assert_eq!(link_status(&d, "2"), LinkStatus::Valid);
        assert_eq!(link_status(&d, "5"), LinkStatus::Invalid);
    }

    #[test]
    fn test_links_with_positions() {
        // bn "1" spans 0..14, bn "2" spans 14..29, paragraph text starts at 30
        let spans = border_number_links(&linked_doc());
        assert_eq!(
            spans,
            vec![
                LinkSpan {
                    from: 34,
                    to: 39,
                    nr: "2".to_string(),
                    status: LinkStatus::Valid,
                },
                LinkSpan {
                    from: 44,
                    to: 49,
                    nr: "5".to_string(),
                    status: LinkStatus::Invalid,
                },
            ]
        );
    }

    #[test]
    fn test_link_split_by_other_marks_is_one_span() {
        let d = doc(vec![Node::paragraph(vec![
            link("3", "Rn"),
            Node::text_with_marks(". 3", vec![Mark::border_number_link("3"), Mark::Strong]),
        ])]);
        let spans = border_number_links(&d);
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].from, spans[0].to), (1, 6));
    }

    #[test]
    fn test_invalidate_reports_only_removed_and_unresolvable() {
        let d = linked_doc();
        let removed = vec!["5".to_string(), "2".to_string(), "9".to_string()];
        let invalid = invalidate_border_number_links(&d, &removed);
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].nr, "5");
    }
}
