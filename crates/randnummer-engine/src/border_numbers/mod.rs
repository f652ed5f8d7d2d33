//! Structural border number commands.
//!
//! Wrapping, unwrapping, Backspace and paste/drop handling, each as a
//! `(state, dispatch)` command that builds one transform and commits it
//! atomically. Renumbering and link invalidation are follow-up passes; the
//! commands only schedule them.

mod backspace;
mod insert;
mod links;
mod paste;
mod remove;
mod renumber;

pub use backspace::{BackspaceIntent, handle_backspace, resolve_backspace_intent};
pub use insert::add_border_numbers;
pub use links::{
    LinkSpan, LinkStatus, border_number_labels, border_number_links, invalidate_border_number_links,
    link_status,
};
pub use paste::{handle_drop, handle_paste, insert_at_block_boundary};
pub use remove::remove_border_numbers;
pub use renumber::{make_border_numbers_sequential, renumber, renumbered};
