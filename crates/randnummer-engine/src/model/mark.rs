use serde::{Deserialize, Serialize};

/// An attribute attached to a run of inline text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "attrs", rename_all = "camelCase")]
pub enum Mark {
    Strong,
    Emphasis,
    /// Reference to a border number by its visible label. Whether the
    /// target exists is never stored here, see `border_numbers::link_status`.
    BorderNumberLink { nr: String },
}

impl Mark {
    pub fn border_number_link(nr: impl Into<String>) -> Self {
        Mark::BorderNumberLink { nr: nr.into() }
    }

    /// Target label if this is a border number link
    pub fn link_target(&self) -> Option<&str> {
        match self {
            Mark::BorderNumberLink { nr } => Some(nr),
            _ => None,
        }
    }
}
