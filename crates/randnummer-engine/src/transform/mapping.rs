/// A range of the old document that survives a replace step unchanged,
/// re-inserted at `new_start` of the new document.
///
/// Positions inside it keep their relative offset instead of being clamped,
/// which is what keeps a caret on the same character when a paragraph is
/// wrapped into (or unwrapped from) a border number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retained {
    pub from: usize,
    pub to: usize,
    pub new_start: usize,
}

impl Retained {
    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// Position map of a single step: `from..to` became `inserted` positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepMap {
    from: usize,
    to: usize,
    inserted: usize,
    retained: Option<Retained>,
}

impl StepMap {
    pub fn new(from: usize, to: usize, inserted: usize, retained: Option<Retained>) -> Self {
        Self {
            from,
            to,
            inserted,
            retained,
        }
    }

    /// Size change caused by the step
    pub fn delta(&self) -> isize {
        self.inserted as isize - (self.to - self.from) as isize
    }

    /// Map a position of the document before the step.
    ///
    /// Positions up to and including `from` stay put, positions from `to`
    /// on shift by the delta. A position strictly inside the replaced range
    /// keeps its offset when it lies in the retained range; otherwise it
    /// clamps to the nearest edge of the replacement.
    pub fn map(&self, pos: usize) -> usize {
        if pos <= self.from {
            return pos;
        }
        if pos >= self.to {
            return pos - self.to + self.from + self.inserted;
        }
        match self.retained {
            Some(r) if pos < r.from => r.new_start,
            Some(r) if pos > r.to => r.new_start + r.len(),
            Some(r) => r.new_start + (pos - r.from),
            None => self.from + self.inserted,
        }
    }
}

/// Cumulative position mapping of a transform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    /// Carry a position through every step in order
    pub fn map(&self, pos: usize) -> usize {
        self.maps.iter().fold(pos, |pos, map| map.map(pos))
    }

    /// Sum of all step deltas
    pub fn delta(&self) -> isize {
        self.maps.iter().map(StepMap::delta).sum()
    }
}
