use crate::border_numbers::{self, LinkSpan};
use crate::clipboard::ClipboardPayload;
use crate::editing::{Bias, Dispatch, EditorState, FollowUp, Selection, Transaction};
use crate::model::{Node, NodeType, ResolvedPos};
use crate::options::EngineOptions;
use crate::transform::{StepError, Transform};

/// Links reported by one invalidation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidatedLinks {
    /// Labels the pass was asked about
    pub labels: Vec<String>,
    /// Links to those labels that no longer resolve
    pub links: Vec<LinkSpan>,
}

/// The passes an [`Editor`] runs once an edit has settled
pub trait FollowUpServices {
    /// Notify about links to `removed` labels, given the committed document
    fn invalidate_border_number_links(&mut self, doc: &Node, removed: &[String]);

    /// Transaction making all labels sequential, `None` when nothing changes
    fn make_border_numbers_sequential(&mut self, state: &EditorState) -> Option<Transaction>;
}

/// In-process follow-up passes that keep the invalidation reports for the
/// host to pick up
#[derive(Debug, Default)]
pub struct LocalServices {
    reports: Vec<InvalidatedLinks>,
}

impl LocalServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[InvalidatedLinks] {
        &self.reports
    }

    pub fn take_reports(&mut self) -> Vec<InvalidatedLinks> {
        std::mem::take(&mut self.reports)
    }
}

impl FollowUpServices for LocalServices {
    fn invalidate_border_number_links(&mut self, doc: &Node, removed: &[String]) {
        let links = border_numbers::invalidate_border_number_links(doc, removed);
        self.reports.push(InvalidatedLinks {
            labels: removed.to_vec(),
            links,
        });
    }

    fn make_border_numbers_sequential(&mut self, state: &EditorState) -> Option<Transaction> {
        match border_numbers::make_border_numbers_sequential(state.doc(), state.options().first_number)
        {
            Ok(tr) => tr.map(Transaction::new),
            Err(err) => {
                log::error!("Renumbering failed: {err}");
                None
            }
        }
    }
}

/// Host for the structural commands.
///
/// Owns the current state, commits whatever a command dispatches and runs
/// the default behaviour when a handler declines. Follow-up passes only run
/// in [`Editor::settle`], always against the committed document.
pub struct Editor<S = LocalServices> {
    state: EditorState,
    services: S,
}

impl Editor<LocalServices> {
    pub fn new(doc: Node, options: EngineOptions) -> Self {
        Self::with_services(doc, options, LocalServices::new())
    }
}

impl<S: FollowUpServices> Editor<S> {
    pub fn with_services(doc: Node, options: EngineOptions, services: S) -> Self {
        Self {
            state: EditorState::new(doc, options),
            services,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn doc(&self) -> &Node {
        self.state.doc()
    }

    pub fn selection(&self) -> Selection {
        self.state.selection()
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.state = self.state.clone().with_selection(selection);
    }

    pub fn services(&self) -> &S {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut S {
        &mut self.services
    }

    pub fn into_doc(self) -> Node {
        self.state.doc().clone()
    }

    /// True when no follow-up pass is waiting
    pub fn is_settled(&self) -> bool {
        !self.state.scheduler().is_pending()
    }

    /// Run `command` and commit what it dispatches
    pub fn run<F>(&mut self, command: F) -> bool
    where
        F: FnOnce(&EditorState, Dispatch<'_>) -> bool,
    {
        let mut committed = Vec::new();
        let handled = {
            let mut commit = |tr: Transaction| committed.push(tr);
            command(&self.state, Some(&mut commit))
        };
        for tr in committed {
            self.state = self.state.apply(tr);
        }
        handled
    }

    pub fn add_border_numbers(&mut self) -> bool {
        self.run(border_numbers::add_border_numbers)
    }

    pub fn remove_border_numbers(&mut self) -> bool {
        self.run(border_numbers::remove_border_numbers)
    }

    pub fn renumber(&mut self) -> bool {
        self.run(border_numbers::renumber)
    }

    /// Backspace with the default deletion as fallback. Returns whether the
    /// document changed.
    pub fn backspace(&mut self) -> bool {
        self.run(border_numbers::handle_backspace) || self.run(default_backspace)
    }

    /// Paste with the default insertion at the selection as fallback
    pub fn paste(&mut self, payload: &ClipboardPayload) -> bool {
        if self.run(|state, dispatch| border_numbers::handle_paste(state, dispatch, payload)) {
            return true;
        }
        let at = self.selection().from();
        self.run(|state, dispatch| default_insert(state, dispatch, payload, at))
    }

    /// Drop at `at` with the default insertion as fallback
    pub fn drop_content(&mut self, payload: &ClipboardPayload, at: usize) -> bool {
        if self.run(|state, dispatch| border_numbers::handle_drop(state, dispatch, payload, at)) {
            return true;
        }
        self.run(|state, dispatch| default_insert(state, dispatch, payload, at))
    }

    /// Run the pending follow-up passes: link invalidation first, then
    /// renumbering. Returns what was run.
    pub fn settle(&mut self) -> FollowUp {
        let follow_up = self.state.scheduler().take();
        if !follow_up.invalidate.is_empty() {
            self.services
                .invalidate_border_number_links(self.state.doc(), &follow_up.invalidate);
        }
        if follow_up.renumber
            && let Some(tr) = self.services.make_border_numbers_sequential(&self.state)
        {
            self.state = self.state.apply(tr);
        }
        follow_up
    }
}

// ============ Default behaviour ============

/// Delete the selected range, or the character before the caret
fn default_backspace(state: &EditorState, dispatch: Dispatch<'_>) -> bool {
    let sel = state.selection();
    let mut tr = state.transform();
    let result = if sel.is_empty() {
        delete_char_before(&mut tr, sel.from())
    } else {
        delete_range(&mut tr, sel.from(), sel.to())
    };
    match result {
        Ok(true) => {}
        Ok(false) => return false,
        Err(err) => {
            log::error!("Discarding default deletion: {err}");
            return false;
        }
    }
    if let Some(dispatch) = dispatch {
        let caret = Selection::caret(tr.mapping().map(sel.from()));
        let selection = caret.normalized(tr.doc(), Bias::Backward);
        dispatch(Transaction::new(tr).with_selection(selection));
    }
    true
}

fn delete_char_before(tr: &mut Transform, pos: usize) -> Result<bool, StepError> {
    let deletable = tr
        .doc()
        .resolve(pos)
        .is_ok_and(|rp| rp.parent().is_textblock() && rp.parent_offset() > 0);
    if !deletable {
        return Ok(false);
    }
    tr.delete(pos - 1, pos)?;
    Ok(true)
}

fn delete_range(tr: &mut Transform, from: usize, to: usize) -> Result<bool, StepError> {
    let ranges = {
        let doc = tr.doc();
        let (Ok(start), Ok(end)) = (doc.resolve(from), doc.resolve(to)) else {
            return Ok(false);
        };
        deletion_ranges(&start, &end)
    };
    if ranges.is_empty() {
        return Ok(false);
    }
    // back to front keeps the earlier ranges valid
    for (from, to) in ranges.into_iter().rev() {
        tr.delete(from, to)?;
    }
    Ok(true)
}

/// Same-parent ranges covering `start..end`, in document order. On the way
/// out of the first block everything after the start is removed, on the way
/// into the last block everything before the end; whole nodes in between go.
/// Textblocks are not joined, and a border number always keeps its label
/// and content nodes: leaving a label clears the content, entering the
/// content clears the label.
fn deletion_ranges(start: &ResolvedPos<'_>, end: &ResolvedPos<'_>) -> Vec<(usize, usize)> {
    let common = (0..=start.depth().min(end.depth()))
        .rev()
        .find(|&d| start.start(d) == end.start(d))
        .unwrap_or(0);
    if common == start.depth() && common == end.depth() {
        return vec![(start.pos(), end.pos())];
    }

    let mut ranges = Vec::new();
    let mut push = |from: Option<usize>, to: Option<usize>| {
        if let (Some(from), Some(to)) = (from, to)
            && from < to
        {
            ranges.push((from, to));
        }
    };

    // innermost first
    for d in (common + 1..=start.depth()).rev() {
        let from = if d == start.depth() {
            Some(start.pos())
        } else {
            start.after(d + 1)
        };
        if is_border_number(start.node(d)) {
            if d < start.depth() && start.index(d) == Some(0) {
                push(from.map(|pos| pos + 1), start.end(d).map(|pos| pos - 1));
            }
            continue;
        }
        push(from, start.end(d));
    }

    push(
        Some(start.after(common + 1).unwrap_or(start.pos())),
        Some(end.before(common + 1).unwrap_or(end.pos())),
    );

    // outermost first
    for d in common + 1..=end.depth() {
        let to = if d == end.depth() {
            Some(end.pos())
        } else {
            end.before(d + 1)
        };
        if is_border_number(end.node(d)) {
            if d < end.depth() && end.index(d) == Some(1) {
                push(end.start(d).map(|pos| pos + 1), to.map(|pos| pos - 1));
            }
            continue;
        }
        push(end.start(d), to);
    }
    ranges
}

fn is_border_number(node: Option<&Node>) -> bool {
    node.is_some_and(|node| node.kind() == NodeType::BorderNumber)
}

/// Insert the payload the way a plain editor would: a single paragraph goes
/// inline, several blocks go after the current top-level block, an empty
/// top-level paragraph is replaced
fn default_insert(
    state: &EditorState,
    dispatch: Dispatch<'_>,
    payload: &ClipboardPayload,
    pos: usize,
) -> bool {
    let blocks = payload.blocks();
    if blocks.is_empty() {
        return false;
    }
    let doc = state.doc();
    let Ok(rp) = doc.resolve(pos.min(doc.content_size())) else {
        return false;
    };
    let Some((from, to, content)) = insertion(&rp, blocks) else {
        return false;
    };
    let Some(dispatch) = dispatch else {
        return true;
    };

    let inserted: usize = content.iter().map(Node::node_size).sum();
    let mut tr = state.transform();
    if let Err(err) = tr.replace(from, to, content) {
        log::error!("Discarding default insertion: {err}");
        return false;
    }
    let selection = Selection::caret(from + inserted).normalized(tr.doc(), Bias::Backward);
    dispatch(Transaction::new(tr).with_selection(selection));
    true
}

fn insertion(rp: &ResolvedPos<'_>, mut blocks: Vec<Node>) -> Option<(usize, usize, Vec<Node>)> {
    if let Some(top) = rp.node(1)
        && top.kind() == NodeType::Paragraph
        && top.content_size() == 0
    {
        return Some((rp.before(1)?, rp.after(1)?, blocks));
    }
    if rp.parent().kind() == NodeType::Paragraph
        && blocks.len() == 1
        && blocks[0].kind() == NodeType::Paragraph
    {
        let inline = blocks.pop()?.content().to_vec();
        return Some((rp.pos(), rp.pos(), inline));
    }
    let at = rp.after(1).unwrap_or(rp.pos());
    Some((at, at, blocks))
}
