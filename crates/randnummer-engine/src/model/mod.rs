//! Document tree model.
//!
//! A document is an immutable tree of [`Node`]s addressed by flat integer
//! positions. Every non-text node contributes an opening and a closing token,
//! every character of a text node contributes one token. Position `0` is the
//! start of the document content and `doc.content_size()` its end.
//!
//! Positions are only valid for the tree version they were computed on; after
//! an edit they must be carried through the edit's
//! [`Mapping`](crate::transform::Mapping).

mod display;
mod mark;
mod node;
mod replace;
mod resolved;

pub use mark::Mark;
pub use node::{Node, NodeType};
pub use resolved::ResolvedPos;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Position {pos} is outside of the document (size {size})")]
    PositionOutOfRange { pos: usize, size: usize },
    #[error("Replace range {from}..{to} does not start and end in the same parent")]
    CrossParentReplace { from: usize, to: usize },
    #[error("A {parent} node cannot contain a {child} node")]
    InvalidContent {
        parent: &'static str,
        child: &'static str,
    },
    #[error("A border number needs exactly a number and a content child, found {children} children")]
    MalformedBorderNumber { children: usize },
    #[error("Text nodes must not be empty")]
    EmptyText,
    #[error("Malformed node: {0}")]
    Malformed(String),
}
