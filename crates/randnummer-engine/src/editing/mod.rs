/*!
 * # Editing Core
 *
 * Everything a host needs to drive the structural commands.
 *
 * ## Command contract
 *
 * Every command is a plain function taking `(state, dispatch)`:
 *
 * - **`state`**: an immutable [`EditorState`] snapshot (document, selection,
 *   options and the follow-up [`Scheduler`])
 * - **`dispatch`**: an optional callback that commits one [`Transaction`]
 *
 * The boolean result is the contract with the host: `false` means "do your
 * default thing", `true` means "a change was committed, do nothing further".
 * Passing `None` as dispatch asks whether the command *would* apply without
 * committing or scheduling anything.
 *
 * ## Follow-up passes
 *
 * Renumbering and link invalidation never run inside a command. Commands
 * schedule them on the state's [`Scheduler`]; the [`Editor`] drains the
 * scheduler in [`Editor::settle`] once the transaction is committed, so the
 * passes always observe a committed document. Requests made in between
 * coalesce into one pass.
 */

pub mod editor;
pub mod scheduler;
pub mod selection;
pub mod state;

pub use editor::{Editor, FollowUpServices, InvalidatedLinks, LocalServices};
pub use scheduler::{FollowUp, Scheduler};
pub use selection::{Bias, Selection, text_position};
pub use state::{EditorState, Transaction};

/// Callback committing a transaction; `None` runs a command as a dry run
pub type Dispatch<'a> = Option<&'a mut dyn FnMut(Transaction)>;
