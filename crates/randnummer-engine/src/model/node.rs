use serde::{Deserialize, Serialize};

use crate::model::{Mark, ModelError};

/// Node variants of the document schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Doc,
    Paragraph,
    BorderNumber,
    BorderNumberNumber,
    BorderNumberContent,
    Text,
}

impl NodeType {
    pub fn name(self) -> &'static str {
        match self {
            NodeType::Doc => "doc",
            NodeType::Paragraph => "paragraph",
            NodeType::BorderNumber => "borderNumber",
            NodeType::BorderNumberNumber => "borderNumberNumber",
            NodeType::BorderNumberContent => "borderNumberContent",
            NodeType::Text => "text",
        }
    }

    /// Nodes allowed as children of `Doc`
    pub fn is_block(self) -> bool {
        matches!(self, NodeType::Paragraph | NodeType::BorderNumber)
    }

    /// Nodes whose children are inline text runs
    pub fn is_textblock(self) -> bool {
        matches!(self, NodeType::Paragraph | NodeType::BorderNumberNumber)
    }

    /// Check a child sequence against this type's content rule.
    ///
    /// - `doc`: block*
    /// - `paragraph`, `borderNumberNumber`: text*
    /// - `borderNumber`: borderNumberNumber borderNumberContent
    /// - `borderNumberContent`: paragraph*
    pub fn check_content(self, children: &[Node]) -> Result<(), ModelError> {
        let invalid = |child: &Node| ModelError::InvalidContent {
            parent: self.name(),
            child: child.kind().name(),
        };

        match self {
            NodeType::Doc => children
                .iter()
                .find(|c| !c.kind().is_block())
                .map_or(Ok(()), |c| Err(invalid(c))),
            NodeType::Paragraph | NodeType::BorderNumberNumber => children
                .iter()
                .find(|c| !c.is_text())
                .map_or(Ok(()), |c| Err(invalid(c))),
            NodeType::BorderNumberContent => children
                .iter()
                .find(|c| c.kind() != NodeType::Paragraph)
                .map_or(Ok(()), |c| Err(invalid(c))),
            NodeType::BorderNumber => match children {
                [number, content]
                    if number.kind() == NodeType::BorderNumberNumber
                        && content.kind() == NodeType::BorderNumberContent =>
                {
                    Ok(())
                }
                _ => Err(ModelError::MalformedBorderNumber {
                    children: children.len(),
                }),
            },
            NodeType::Text => children.first().map_or(Ok(()), |c| Err(invalid(c))),
        }
    }
}

/// An immutable node of the document tree.
///
/// Text nodes carry a non-empty string and their marks, every other node
/// carries child nodes. Sizes are cached on construction: a text node
/// occupies one position per character, any other node occupies its
/// content plus one opening and one closing token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NodeRepr", into = "NodeRepr")]
pub struct Node {
    kind: NodeType,
    content: Vec<Node>,
    text: Option<String>,
    marks: Vec<Mark>,
    size: usize,
}

impl Node {
    /// Create a non-text node. Inline children are normalized: empty text
    /// runs are dropped and neighbours with identical marks are merged.
    ///
    /// Content rules are not enforced here so that documents written by
    /// older versions (e.g. a border number missing its content) can still
    /// be represented; use [`Node::check`] or [`NodeType::check_content`].
    pub fn new(kind: NodeType, content: Vec<Node>) -> Self {
        let content = normalize_inline(content);
        let content_size: usize = content.iter().map(Node::node_size).sum();
        Self {
            kind,
            content,
            text: None,
            marks: Vec::new(),
            size: content_size + 2,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::text_with_marks(text, Vec::new())
    }

    pub fn text_with_marks(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        let text = text.into();
        let size = text.chars().count();
        Self {
            kind: NodeType::Text,
            content: Vec::new(),
            text: Some(text),
            marks,
            size,
        }
    }

    pub fn doc(content: Vec<Node>) -> Self {
        Self::new(NodeType::Doc, content)
    }

    pub fn paragraph(content: Vec<Node>) -> Self {
        Self::new(NodeType::Paragraph, content)
    }

    /// Paragraph holding a single unmarked text run (or nothing for "")
    pub fn paragraph_text(text: &str) -> Self {
        Self::paragraph(vec![Self::text(text)])
    }

    pub fn border_number(number: Node, content: Node) -> Self {
        Self::new(NodeType::BorderNumber, vec![number, content])
    }

    pub fn border_number_number(label: &str) -> Self {
        Self::new(NodeType::BorderNumberNumber, vec![Self::text(label)])
    }

    pub fn border_number_content(blocks: Vec<Node>) -> Self {
        Self::new(NodeType::BorderNumberContent, blocks)
    }

    pub fn kind(&self) -> NodeType {
        self.kind
    }

    pub fn content(&self) -> &[Node] {
        &self.content
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.content.get(index)
    }

    pub fn child_count(&self) -> usize {
        self.content.len()
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// The text of a text node
    pub fn text_str(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeType::Text
    }

    pub fn is_textblock(&self) -> bool {
        self.kind.is_textblock()
    }

    /// Number of positions this node occupies inside its parent
    pub fn node_size(&self) -> usize {
        self.size
    }

    /// Number of positions between the opening and closing token
    pub fn content_size(&self) -> usize {
        if self.is_text() { 0 } else { self.size - 2 }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.text {
            Some(text) => out.push_str(text),
            None => self.content.iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// The `(number, content)` children of a well-formed border number
    pub fn border_number_parts(&self) -> Option<(&Node, &Node)> {
        if self.kind != NodeType::BorderNumber {
            return None;
        }
        match self.content.as_slice() {
            [number, content]
                if number.kind == NodeType::BorderNumberNumber
                    && content.kind == NodeType::BorderNumberContent =>
            {
                Some((number, content))
            }
            _ => None,
        }
    }

    /// Index of the child containing `offset` (relative to this node's
    /// content start) and the offset at which that child starts. An offset
    /// on a child boundary resolves to the child after it.
    pub(crate) fn find_index(&self, offset: usize) -> (usize, usize) {
        let mut pos = 0;
        for (index, child) in self.content.iter().enumerate() {
            let end = pos + child.node_size();
            if offset < end {
                return (index, pos);
            }
            pos = end;
        }
        (self.content.len(), pos)
    }

    /// The node that starts exactly at `pos`, searched at any depth
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        let mut node = self;
        let mut pos = pos;
        loop {
            let (index, start) = node.find_index(pos);
            let child = node.child(index)?;
            if start == pos {
                return Some(child);
            }
            if child.is_text() {
                return None;
            }
            pos -= start + 1;
            node = child;
        }
    }

    /// Visit every descendant overlapping `from..to` in document order.
    ///
    /// The callback receives the node, its absolute position, its parent and
    /// its index in the parent; returning `false` skips the node's children.
    /// A collapsed range visits the nodes that strictly contain the position.
    pub fn nodes_between<F>(&self, from: usize, to: usize, f: &mut F)
    where
        F: FnMut(&Node, usize, &Node, usize) -> bool,
    {
        self.nodes_between_at(from, to, 0, f);
    }

    fn nodes_between_at<F>(&self, from: usize, to: usize, offset: usize, f: &mut F)
    where
        F: FnMut(&Node, usize, &Node, usize) -> bool,
    {
        let mut pos = 0;
        for (index, child) in self.content.iter().enumerate() {
            if pos >= to {
                break;
            }
            let end = pos + child.node_size();
            if end > from && f(child, offset + pos, self, index) && child.content_size() > 0 {
                let start = pos + 1;
                child.nodes_between_at(
                    from.saturating_sub(start),
                    child.content_size().min(to - start),
                    offset + start,
                    f,
                );
            }
            pos = end;
        }
    }

    /// Visit every descendant of the whole document
    pub fn descendants<F>(&self, f: &mut F)
    where
        F: FnMut(&Node, usize, &Node, usize) -> bool,
    {
        self.nodes_between(0, self.content_size(), f);
    }

    /// Validate the content rule of this node and all descendants
    pub fn check(&self) -> Result<(), ModelError> {
        if self.is_text() {
            return match &self.text {
                Some(text) if !text.is_empty() => Ok(()),
                _ => Err(ModelError::EmptyText),
            };
        }
        self.kind.check_content(&self.content)?;
        self.content.iter().try_for_each(Node::check)
    }

    pub(crate) fn with_content(&self, content: Vec<Node>) -> Self {
        Self::new(self.kind, content)
    }

    /// Characters `from..to` of a text node, keeping its marks
    pub(crate) fn cut_text(&self, from: usize, to: usize) -> Node {
        let text = self.text.as_deref().unwrap_or_default();
        let sliced: String = text.chars().skip(from).take(to.saturating_sub(from)).collect();
        Node::text_with_marks(sliced, self.marks.clone())
    }
}

/// Drop empty text runs and merge neighbouring runs with identical marks
fn normalize_inline(content: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(content.len());
    for node in content {
        if node.is_text() {
            if node.size == 0 {
                continue;
            }
            if let Some(last) = out.last_mut()
                && last.is_text()
                && last.marks == node.marks
                && let (Some(prev), Some(next)) = (last.text.as_mut(), node.text.as_deref())
            {
                prev.push_str(next);
                last.size += node.size;
                continue;
            }
        }
        out.push(node);
    }
    out
}

/// JSON shape of a node: `{"type": "paragraph", "content": [...]}` or
/// `{"type": "text", "text": "...", "marks": [...]}`
#[derive(Serialize, Deserialize)]
struct NodeRepr {
    #[serde(rename = "type")]
    kind: NodeType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    marks: Vec<Mark>,
}

impl TryFrom<NodeRepr> for Node {
    type Error = ModelError;

    fn try_from(repr: NodeRepr) -> Result<Self, Self::Error> {
        match (repr.kind, repr.text) {
            (NodeType::Text, Some(text)) if !text.is_empty() && repr.content.is_empty() => {
                Ok(Node::text_with_marks(text, repr.marks))
            }
            (NodeType::Text, _) => Err(ModelError::EmptyText),
            (kind, None) if repr.marks.is_empty() => Ok(Node::new(kind, repr.content)),
            (kind, _) => Err(ModelError::Malformed(format!(
                "{} nodes carry neither text nor marks",
                kind.name()
            ))),
        }
    }
}

impl From<Node> for NodeRepr {
    fn from(node: Node) -> Self {
        Self {
            kind: node.kind,
            content: node.content,
            text: node.text,
            marks: node.marks,
        }
    }
}
