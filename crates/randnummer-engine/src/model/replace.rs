use crate::model::{ModelError, Node};

impl Node {
    /// Return a copy of this tree with `from..to` replaced by `content`.
    ///
    /// Both ends must resolve into the same parent; `content` becomes part of
    /// that parent's children and has to satisfy its content rule. Text runs
    /// cut by either end are split.
    pub fn replace(&self, from: usize, to: usize, content: &[Node]) -> Result<Node, ModelError> {
        if from > to {
            return Err(ModelError::CrossParentReplace { from, to });
        }
        let start = self.resolve(from)?;
        let end = self.resolve(to)?;
        let depth = start.depth();
        if depth != end.depth() || start.start(depth) != end.start(depth) {
            return Err(ModelError::CrossParentReplace { from, to });
        }

        let indices: Vec<usize> = (0..depth).filter_map(|d| start.index(d)).collect();
        replace_in(
            self,
            &indices,
            start.parent_offset(),
            end.parent_offset(),
            content,
        )
    }
}

fn replace_in(
    node: &Node,
    indices: &[usize],
    from: usize,
    to: usize,
    insert: &[Node],
) -> Result<Node, ModelError> {
    let Some((&index, rest)) = indices.split_first() else {
        return splice(node, from, to, insert);
    };

    let mut children = node.content().to_vec();
    let Some(child) = children.get_mut(index) else {
        return Err(ModelError::Malformed(format!(
            "{} has no child {index}",
            node.kind().name()
        )));
    };
    *child = replace_in(child, rest, from, to, insert)?;
    Ok(node.with_content(children))
}

/// Replace `from..to` of `node`'s own content
fn splice(node: &Node, from: usize, to: usize, insert: &[Node]) -> Result<Node, ModelError> {
    let mut children = cut(node, 0, from);
    children.extend(insert.iter().cloned());
    children.extend(cut(node, to, node.content_size()));

    node.kind().check_content(&children)?;
    Ok(node.with_content(children))
}

/// Children of `node` between content offsets `from..to`. Offsets are
/// child boundaries or fall inside a text run.
fn cut(node: &Node, from: usize, to: usize) -> Vec<Node> {
    let mut out = Vec::new();
    let mut pos = 0;
    for child in node.content() {
        let end = pos + child.node_size();
        if end > from && pos < to {
            if child.is_text() && (pos < from || end > to) {
                let cut_from = from.saturating_sub(pos);
                let cut_to = to.min(end) - pos;
                out.push(child.cut_text(cut_from, cut_to));
            } else {
                out.push(child.clone());
            }
        }
        pos = end;
    }
    out
}
