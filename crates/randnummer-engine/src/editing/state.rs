use crate::editing::{Bias, Scheduler, Selection};
use crate::model::Node;
use crate::options::EngineOptions;
use crate::transform::{Mapping, Step, Transform};

/// A transform ready to be committed, with the selection to use afterwards
#[derive(Debug, Clone)]
pub struct Transaction {
    transform: Transform,
    selection: Option<Selection>,
}

impl Transaction {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            selection: None,
        }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn doc(&self) -> &Node {
        self.transform.doc()
    }

    pub fn steps(&self) -> &[Step] {
        self.transform.steps()
    }

    pub fn mapping(&self) -> &Mapping {
        self.transform.mapping()
    }

    /// Explicit selection; `None` maps the previous selection instead
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }
}

/// Immutable snapshot of a document and its selection
#[derive(Debug, Clone)]
pub struct EditorState {
    doc: Node,
    selection: Selection,
    options: EngineOptions,
    scheduler: Scheduler,
}

impl EditorState {
    /// Start with the caret at the first paragraph position
    pub fn new(doc: Node, options: EngineOptions) -> Self {
        let selection = Selection::caret(0).normalized(&doc, Bias::Forward);
        Self {
            doc,
            selection,
            options,
            scheduler: Scheduler::new(),
        }
    }

    /// Same state with another selection, clamped to the document
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection.clamp(self.doc.content_size());
        self
    }

    pub fn doc(&self) -> &Node {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Empty transform over this state's document
    pub fn transform(&self) -> Transform {
        Transform::new(self.doc.clone())
    }

    /// State after committing `tr`. The selection always ends up inside
    /// the new document.
    pub fn apply(&self, tr: Transaction) -> EditorState {
        let selection = tr
            .selection()
            .unwrap_or_else(|| self.selection.map(tr.mapping()));
        let doc = tr.transform.doc().clone();
        let selection = selection.clamp(doc.content_size());
        EditorState {
            doc,
            selection,
            options: self.options.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}
