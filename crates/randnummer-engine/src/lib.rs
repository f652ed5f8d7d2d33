//! Border numbers (Randnummern) for structured legal documents.
//!
//! The engine wraps paragraphs into numbered sections, unwraps them again,
//! intercepts Backspace and paste near them and keeps their labels in
//! sequence. All edits go through [`Transform`]s on an immutable [`Node`]
//! tree and are committed by a host such as [`Editor`].

pub mod border_numbers;
pub mod clipboard;
pub mod editing;
pub mod io;
pub mod model;
pub mod options;
pub mod transform;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use border_numbers::*;
pub use clipboard::{ClipboardPayload, MarkupInspector, PayloadInspector};
pub use editing::*;
pub use io::*;
pub use model::{Mark, ModelError, Node, NodeType, ResolvedPos};
pub use options::EngineOptions;
pub use transform::{Mapping, Retained, Step, StepError, StepMap, Transform};
