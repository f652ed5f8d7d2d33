use crate::model::{Mark, ModelError, Node};

#[derive(Debug, Clone, Copy)]
struct PathEntry<'a> {
    node: &'a Node,
    /// Index of the child of `node` that the position points into or before
    index: usize,
    /// Absolute position of `node`'s content start
    start: usize,
}

/// A position together with the chain of ancestors it lies in.
///
/// Depth 0 is the document itself; `parent()` is the innermost node whose
/// content contains the position (text nodes never are parents).
#[derive(Debug, Clone)]
pub struct ResolvedPos<'a> {
    pos: usize,
    path: Vec<PathEntry<'a>>,
    parent_offset: usize,
}

impl Node {
    /// Resolve `pos` against this node's content
    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos<'_>, ModelError> {
        if pos > self.content_size() {
            return Err(ModelError::PositionOutOfRange {
                pos,
                size: self.content_size(),
            });
        }

        let mut path = Vec::new();
        let mut node = self;
        let mut start = 0;
        let mut offset = pos;
        loop {
            let (index, child_start) = node.find_index(offset);
            path.push(PathEntry { node, index, start });
            let rem = offset - child_start;
            if rem == 0 {
                break;
            }
            let Some(child) = node.child(index) else {
                break;
            };
            if child.is_text() {
                break;
            }
            node = child;
            start += child_start + 1;
            offset = rem - 1;
        }

        Ok(ResolvedPos {
            pos,
            path,
            parent_offset: offset,
        })
    }
}

impl<'a> ResolvedPos<'a> {
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    pub fn parent(&self) -> &'a Node {
        self.path[self.depth()].node
    }

    /// Ancestor at `depth`, `None` when deeper than this position
    pub fn node(&self, depth: usize) -> Option<&'a Node> {
        self.path.get(depth).map(|entry| entry.node)
    }

    /// Index into the ancestor at `depth`
    pub fn index(&self, depth: usize) -> Option<usize> {
        self.path.get(depth).map(|entry| entry.index)
    }

    /// Offset of the position inside its parent's content
    pub fn parent_offset(&self) -> usize {
        self.parent_offset
    }

    /// Absolute content start of the ancestor at `depth`
    pub fn start(&self, depth: usize) -> Option<usize> {
        self.path.get(depth).map(|entry| entry.start)
    }

    /// Absolute content end of the ancestor at `depth`
    pub fn end(&self, depth: usize) -> Option<usize> {
        self.path
            .get(depth)
            .map(|entry| entry.start + entry.node.content_size())
    }

    /// Position directly before the ancestor at `depth` (depth >= 1)
    pub fn before(&self, depth: usize) -> Option<usize> {
        if depth == 0 {
            return None;
        }
        self.start(depth).map(|start| start - 1)
    }

    /// Position directly after the ancestor at `depth` (depth >= 1)
    pub fn after(&self, depth: usize) -> Option<usize> {
        if depth == 0 {
            return None;
        }
        self.end(depth).map(|end| end + 1)
    }

    /// The child of the parent that ends at or contains the character
    /// directly before this position
    pub fn node_before(&self) -> Option<&'a Node> {
        let entry = self.path[self.depth()];
        let (_, child_start) = entry.node.find_index(self.parent_offset);
        if self.parent_offset > child_start {
            return entry.node.child(entry.index);
        }
        entry.index.checked_sub(1).and_then(|i| entry.node.child(i))
    }

    /// The child of the parent that starts at or contains the character
    /// directly after this position
    pub fn node_after(&self) -> Option<&'a Node> {
        let entry = self.path[self.depth()];
        entry.node.child(entry.index)
    }

    /// Marks of the character directly before this position
    pub fn marks_before(&self) -> &'a [Mark] {
        match self.node_before() {
            Some(node) if node.is_text() => node.marks(),
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeType;
    use crate::tests::{bn, doc, link, p};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_inside_top_level_paragraph() {
        let d = doc(vec![p("abc"), p("de")]);
        let rp = d.resolve(2).unwrap();
        assert_eq!(rp.depth(), 1);
        assert_eq!(rp.parent().kind(), NodeType::Paragraph);
        assert_eq!(rp.parent_offset(), 1);
        assert_eq!(rp.start(1), Some(1));
        assert_eq!(rp.end(1), Some(4));
        assert_eq!(rp.before(1), Some(0));
        assert_eq!(rp.after(1), Some(5));
        assert_eq!(rp.index(0), Some(0));
    }

    #[test]
    fn test_resolve_between_blocks() {
        let d = doc(vec![p("abc"), p("de")]);
        let rp = d.resolve(5).unwrap();
        assert_eq!(rp.depth(), 0);
        assert_eq!(rp.parent_offset(), 5);
        assert_eq!(rp.index(0), Some(1));
        assert_eq!(rp.node_before().map(Node::kind), Some(NodeType::Paragraph));
        assert_eq!(rp.node_after().map(Node::kind), Some(NodeType::Paragraph));
        assert_eq!(rp.after(0), None);
    }

    #[test]
    fn test_resolve_inside_border_number_content() {
        let d = doc(vec![bn("1", vec![p("xy")])]);
        // 0 bn, 1 num, 2 "1", 3 /num, 4 content, 5 p, 6 "xy"
        let rp = d.resolve(6).unwrap();
        assert_eq!(rp.depth(), 3);
        assert_eq!(rp.parent().kind(), NodeType::Paragraph);
        assert_eq!(rp.parent_offset(), 0);
        assert_eq!(rp.node(2).map(Node::kind), Some(NodeType::BorderNumberContent));
        assert_eq!(rp.index(2), Some(0));
        assert_eq!(rp.node(1).map(Node::kind), Some(NodeType::BorderNumber));

        let in_label = d.resolve(2).unwrap();
        assert_eq!(in_label.parent().kind(), NodeType::BorderNumberNumber);
    }

    #[test]
    fn test_resolve_out_of_range() {
        let d = doc(vec![p("abc")]);
        assert_eq!(
            d.resolve(6).unwrap_err(),
            ModelError::PositionOutOfRange { pos: 6, size: 5 }
        );
        assert!(d.resolve(5).is_ok());
    }

    #[test]
    fn test_marks_before_inside_and_after_text_run() {
        let d = doc(vec![Node::paragraph(vec![
            Node::text("see "),
            link("4", "Rn. 4"),
            Node::text("."),
        ])]);
        // "see " occupies 1..5, the link 5..10
        assert!(d.resolve(5).unwrap().marks_before().is_empty());
        assert_eq!(
            d.resolve(7).unwrap().marks_before(),
            &[Mark::border_number_link("4")]
        );
        assert_eq!(
            d.resolve(10).unwrap().marks_before(),
            &[Mark::border_number_link("4")]
        );
        assert!(d.resolve(11).unwrap().marks_before().is_empty());
    }
}
