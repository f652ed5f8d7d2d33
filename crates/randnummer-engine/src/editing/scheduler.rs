use std::cell::RefCell;
use std::rc::Rc;

/// Follow-up work requested by commands, run once the edit has been
/// committed. Requests made before the next settle coalesce.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowUp {
    /// Rewrite all number labels into document order
    pub renumber: bool,
    /// Labels whose links must be re-validated, in request order without duplicates
    pub invalidate: Vec<String>,
}

impl FollowUp {
    pub fn is_empty(&self) -> bool {
        !self.renumber && self.invalidate.is_empty()
    }
}

/// Shared handle to the pending follow-up passes of one editor.
///
/// Editing is single-threaded: commands schedule through the handle carried
/// by the state snapshot, the host drains it after committing.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: Rc<RefCell<FollowUp>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_renumber(&self) {
        self.pending.borrow_mut().renumber = true;
    }

    pub fn schedule_invalidation<I>(&self, labels: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut pending = self.pending.borrow_mut();
        for label in labels {
            if !pending.invalidate.contains(&label) {
                pending.invalidate.push(label);
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    /// Copy of what is currently pending
    pub fn peek(&self) -> FollowUp {
        self.pending.borrow().clone()
    }

    /// Take everything pending, leaving the queue empty
    pub fn take(&self) -> FollowUp {
        std::mem::take(&mut *self.pending.borrow_mut())
    }
}
