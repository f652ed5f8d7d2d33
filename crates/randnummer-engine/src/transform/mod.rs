//! Transform builder.
//!
//! A [`Transform`] accumulates structural steps against one starting
//! document. Each step is expressed in positions of the document as it is
//! *when that step is applied* and is applied immediately, so later steps see
//! the result of earlier ones. The transform's [`Mapping`] translates any
//! position of the starting document into the current one.
//!
//! A failing step leaves the transform untouched and returns an error;
//! callers discard the whole transform instead of dispatching a partial edit.

mod mapping;

pub use mapping::{Mapping, Retained, StepMap};

use crate::model::{ModelError, Node};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error("{step} step at {from}..{to} failed: {source}")]
    Model {
        step: &'static str,
        from: usize,
        to: usize,
        #[source]
        source: ModelError,
    },
    #[error("Retained range {from}..{to} does not fit into the replace step")]
    InvalidRetained { from: usize, to: usize },
}

/// A single structural edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Replace `from..to` with `content`, optionally carrying an old range
    /// through unchanged (see [`Retained`])
    Replace {
        from: usize,
        to: usize,
        content: Vec<Node>,
        retained: Option<Retained>,
    },
    Delete {
        from: usize,
        to: usize,
    },
    Insert {
        at: usize,
        content: Vec<Node>,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Replace { .. } => "replace",
            Step::Delete { .. } => "delete",
            Step::Insert { .. } => "insert",
        }
    }

    /// Replaced range in positions of the document the step applies to
    pub fn range(&self) -> (usize, usize) {
        match self {
            Step::Replace { from, to, .. } | Step::Delete { from, to } => (*from, *to),
            Step::Insert { at, .. } => (*at, *at),
        }
    }

    fn content(&self) -> &[Node] {
        match self {
            Step::Replace { content, .. } | Step::Insert { content, .. } => content,
            Step::Delete { .. } => &[],
        }
    }

    fn inserted_size(&self) -> usize {
        self.content().iter().map(Node::node_size).sum()
    }

    pub fn get_map(&self) -> StepMap {
        let (from, to) = self.range();
        let retained = match self {
            Step::Replace { retained, .. } => *retained,
            _ => None,
        };
        StepMap::new(from, to, self.inserted_size(), retained)
    }

    /// Apply the step to `doc`, returning the new document
    pub fn apply(&self, doc: &Node) -> Result<Node, StepError> {
        let (from, to) = self.range();
        if let Step::Replace {
            retained: Some(r), ..
        } = self
        {
            let fits_old = from <= r.from && r.from <= r.to && r.to <= to;
            let fits_new = from <= r.new_start && r.new_start + r.len() <= from + self.inserted_size();
            if !fits_old || !fits_new {
                return Err(StepError::InvalidRetained {
                    from: r.from,
                    to: r.to,
                });
            }
        }

        doc.replace(from, to, self.content())
            .map_err(|source| StepError::Model {
                step: self.name(),
                from,
                to,
                source,
            })
    }
}

/// An ordered list of applied steps plus their cumulative mapping
#[derive(Debug, Clone)]
pub struct Transform {
    doc: Node,
    steps: Vec<Step>,
    mapping: Mapping,
}

impl Transform {
    pub fn new(doc: Node) -> Self {
        Self {
            doc,
            steps: Vec::new(),
            mapping: Mapping::new(),
        }
    }

    /// The document after all steps so far
    pub fn doc(&self) -> &Node {
        &self.doc
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Apply `step` to the current document; returns the size delta
    pub fn step(&mut self, step: Step) -> Result<isize, StepError> {
        let doc = step.apply(&self.doc)?;
        let map = step.get_map();
        self.doc = doc;
        self.mapping.push(map);
        self.steps.push(step);
        Ok(map.delta())
    }

    pub fn replace(&mut self, from: usize, to: usize, content: Vec<Node>) -> Result<isize, StepError> {
        self.step(Step::Replace {
            from,
            to,
            content,
            retained: None,
        })
    }

    /// Replace while keeping positions of `retained` stable in the mapping
    pub fn replace_retaining(
        &mut self,
        from: usize,
        to: usize,
        content: Vec<Node>,
        retained: Retained,
    ) -> Result<isize, StepError> {
        self.step(Step::Replace {
            from,
            to,
            content,
            retained: Some(retained),
        })
    }

    pub fn delete(&mut self, from: usize, to: usize) -> Result<isize, StepError> {
        self.step(Step::Delete { from, to })
    }

    pub fn insert(&mut self, at: usize, content: Vec<Node>) -> Result<isize, StepError> {
        self.step(Step::Insert { at, content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{bn, doc, p};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_steps_apply_against_progressive_document() {
        let mut tr = Transform::new(doc(vec![p("ab"), p("cd")]));

        let delta = tr.replace(0, 4, vec![bn("0", vec![p("ab")])]).unwrap();
        assert_eq!(delta, 7);

        // The second paragraph moved from 4 to 11
        let second = tr.mapping().map(4);
        assert_eq!(second, 11);
        tr.replace(second, second + 4, vec![bn("0", vec![p("cd")])])
            .unwrap();

        assert_eq!(
            tr.doc(),
            &doc(vec![bn("0", vec![p("ab")]), bn("0", vec![p("cd")])])
        );
        assert_eq!(tr.steps().len(), 2);
    }

    #[test]
    fn test_delete_and_insert_deltas() {
        let mut tr = Transform::new(doc(vec![p("abc")]));
        assert_eq!(tr.delete(1, 3).unwrap(), -2);
        assert_eq!(tr.insert(3, vec![p("x")]).unwrap(), 3);
        assert_eq!(tr.doc(), &doc(vec![p("c"), p("x")]));
        assert_eq!(tr.mapping().delta(), 1);
    }

    #[test]
    fn test_failed_step_leaves_transform_unchanged() {
        let mut tr = Transform::new(doc(vec![p("abc")]));
        tr.delete(1, 2).unwrap();

        let err = tr.delete(0, 40).unwrap_err();
        assert!(matches!(err, StepError::Model { step: "delete", .. }));
        assert_eq!(tr.steps().len(), 1);
        assert_eq!(tr.doc(), &doc(vec![p("bc")]));
    }

    #[test]
    fn test_retained_range_must_fit() {
        let mut tr = Transform::new(doc(vec![p("abc")]));
        let err = tr
            .replace_retaining(
                0,
                5,
                vec![p("abc")],
                Retained {
                    from: 0,
                    to: 9,
                    new_start: 0,
                },
            )
            .unwrap_err();
        assert_eq!(err, StepError::InvalidRetained { from: 0, to: 9 });
        assert!(!tr.doc_changed());
    }
}
