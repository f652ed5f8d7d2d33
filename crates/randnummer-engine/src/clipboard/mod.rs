//! Clipboard and drag payloads.
//!
//! Copied content travels as HTML using the `border-number` element family,
//! so pasting it back can be recognized by a [`PayloadInspector`]. Plain
//! text is read as Markdown.

mod html;
mod inspect;
mod markdown;

pub use html::{parse_html, repair_blocks, to_html};
pub use inspect::{MarkupInspector, PayloadInspector};
pub use markdown::parse_plain_text;

use serde::{Deserialize, Serialize};

use crate::model::Node;

/// The data offered by a paste or drop event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Structured blocks, present when copied from an editor of this engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<Node>>,
}

impl ClipboardPayload {
    /// Payload for copying `blocks` out of a document
    pub fn from_content(blocks: Vec<Node>) -> Self {
        let text = blocks
            .iter()
            .map(Node::text_content)
            .collect::<Vec<_>>()
            .join("\n\n");
        Self {
            html: Some(to_html(&blocks)),
            text: Some(text),
            content: Some(blocks),
        }
    }

    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html: Some(html.into()),
            ..Self::default()
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_none() && self.text.is_none() && self.content.is_none()
    }

    /// Top-level blocks carried by the payload, preferring structured
    /// content over HTML over plain text. Structured content is repaired
    /// first since it may come from anywhere.
    pub fn blocks(&self) -> Vec<Node> {
        if let Some(content) = &self.content {
            return repair_blocks(content.clone());
        }
        if let Some(html) = &self.html {
            let blocks = parse_html(html);
            if !blocks.is_empty() {
                return blocks;
            }
        }
        self.text.as_deref().map(parse_plain_text).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{bn, p};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_content_fills_every_flavour() {
        let payload = ClipboardPayload::from_content(vec![bn("1", vec![p("a & b")]), p("c")]);
        assert_eq!(payload.text.as_deref(), Some("1a & b\n\nc"));
        assert_eq!(
            payload.html.as_deref(),
            Some(
                "<border-number><border-number-number>1</border-number-number>\
                 <border-number-content><p>a &amp; b</p></border-number-content>\
                 </border-number><p>c</p>"
            )
        );
        assert_eq!(payload.blocks().len(), 2);
    }

    #[test]
    fn test_blocks_fall_back_to_html_then_text() {
        let html = ClipboardPayload::from_html("<p>from html</p>");
        assert_eq!(html.blocks(), vec![p("from html")]);

        let text = ClipboardPayload::from_text("first\n\nsecond");
        assert_eq!(text.blocks(), vec![p("first"), p("second")]);

        assert!(ClipboardPayload::default().blocks().is_empty());
        assert!(ClipboardPayload::default().is_empty());
    }

    #[test]
    fn test_json_omits_missing_flavours() {
        let payload = ClipboardPayload::from_text("x");
        assert_eq!(serde_json::to_string(&payload).unwrap(), r#"{"text":"x"}"#);
        let back: ClipboardPayload = serde_json::from_str(r#"{"html":"<p>x</p>"}"#).unwrap();
        assert_eq!(back, ClipboardPayload::from_html("<p>x</p>"));
    }
}
