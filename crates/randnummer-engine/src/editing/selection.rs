use serde::{Deserialize, Serialize};

use crate::model::{Node, NodeType};
use crate::transform::Mapping;

/// Direction in which a position is moved to reach editable text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    Forward,
    Backward,
}

/// A `(from, to)` pair of positions with `from <= to`; equal ends are a caret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    from: usize,
    to: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self {
            from: anchor.min(head),
            to: anchor.max(head),
        }
    }

    pub fn caret(pos: usize) -> Self {
        Self { from: pos, to: pos }
    }

    pub fn from(&self) -> usize {
        self.from
    }

    pub fn to(&self) -> usize {
        self.to
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    pub fn map(&self, mapping: &Mapping) -> Self {
        Self::new(mapping.map(self.from), mapping.map(self.to))
    }

    /// Restrict both ends to `0..=size`
    pub fn clamp(&self, size: usize) -> Self {
        Self::new(self.from.min(size), self.to.min(size))
    }

    /// Clamp to `doc` and move both ends into paragraph text.
    ///
    /// A caret moves in `bias` direction first and falls back to the other
    /// one; a range pulls its ends inwards. Documents without paragraphs
    /// keep the clamped positions.
    pub fn normalized(&self, doc: &Node, bias: Bias) -> Self {
        let sel = self.clamp(doc.content_size());
        let (primary, secondary) = match bias {
            Bias::Forward => (Bias::Forward, Bias::Backward),
            Bias::Backward => (Bias::Backward, Bias::Forward),
        };
        let near = |pos: usize, first: Bias, second: Bias| {
            text_position(doc, pos, first)
                .or_else(|| text_position(doc, pos, second))
                .unwrap_or(pos)
        };

        if sel.is_empty() {
            return Self::caret(near(sel.from, primary, secondary));
        }

        let from = near(sel.from, Bias::Forward, Bias::Backward);
        let to = near(sel.to, Bias::Backward, Bias::Forward);
        if to < from {
            return Self::caret(if bias == Bias::Forward { from } else { to });
        }
        Self::new(from, to)
    }
}

/// Nearest position inside a paragraph, looking from `pos` in `bias`
/// direction. Number labels are never a caret target.
pub fn text_position(doc: &Node, pos: usize, bias: Bias) -> Option<usize> {
    let mut ranges = Vec::new();
    doc.descendants(&mut |node, node_pos, _, _| {
        if node.kind() == NodeType::Paragraph {
            ranges.push((node_pos + 1, node_pos + 1 + node.content_size()));
            return false;
        }
        !node.is_textblock()
    });

    if ranges.iter().any(|&(start, end)| start <= pos && pos <= end) {
        return Some(pos);
    }
    match bias {
        Bias::Forward => ranges
            .iter()
            .find(|&&(start, _)| start >= pos)
            .map(|&(start, _)| start),
        Bias::Backward => ranges
            .iter()
            .rev()
            .find(|&&(_, end)| end <= pos)
            .map(|&(_, end)| end),
    }
}
