use regex::Regex;

use crate::clipboard::ClipboardPayload;
use crate::model::{Node, NodeType};
use crate::options::EngineOptions;

/// Answers whether a paste or drop payload carries border numbers
pub trait PayloadInspector {
    fn contains_border_numbers(&self, payload: &ClipboardPayload) -> bool;
}

/// Looks for border number elements in the HTML flavour and for border
/// number nodes in structured content
#[derive(Debug, Clone)]
pub struct MarkupInspector {
    /// `None` when no marker tags are configured, HTML then never matches
    pattern: Option<Regex>,
}

impl MarkupInspector {
    pub fn new<S: AsRef<str>>(tags: &[S]) -> Result<Self, regex::Error> {
        let alternatives = tags
            .iter()
            .map(|tag| tag.as_ref().trim())
            .filter(|tag| !tag.is_empty())
            .map(regex::escape)
            .collect::<Vec<_>>();
        if alternatives.is_empty() {
            log::debug!("No border number marker tags, HTML payloads are not inspected");
            return Ok(Self { pattern: None });
        }
        let pattern = Regex::new(&format!(
            r"(?i)<\s*(?:{})[\s/>]",
            alternatives.join("|")
        ))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn from_options(options: &EngineOptions) -> Result<Self, regex::Error> {
        Self::new(options.marker_tags.as_slice())
    }
}

impl PayloadInspector for MarkupInspector {
    fn contains_border_numbers(&self, payload: &ClipboardPayload) -> bool {
        if let Some(content) = &payload.content
            && content.iter().any(contains_border_number)
        {
            return true;
        }
        match (&self.pattern, payload.html.as_deref()) {
            (Some(pattern), Some(html)) => pattern.is_match(html),
            _ => false,
        }
    }
}

fn contains_border_number(node: &Node) -> bool {
    node.kind() == NodeType::BorderNumber || node.content().iter().any(contains_border_number)
}
