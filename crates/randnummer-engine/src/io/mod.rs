use crate::clipboard::ClipboardPayload;
use crate::model::{Node, NodeType};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Not a document: top-level node is {0:?}")]
    NotADocument(NodeType),
}

/// Read a JSON document
pub fn read_document(path: &Path) -> Result<Node, IoError> {
    let content = read_existing(path)?;
    let node: Node = serde_json::from_str(&content)?;
    if node.kind() != NodeType::Doc {
        return Err(IoError::NotADocument(node.kind()));
    }
    Ok(node)
}

/// Write a document as pretty-printed JSON
pub fn write_document(path: &Path, doc: &Node) -> Result<(), IoError> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut json = serde_json::to_string_pretty(doc)?;
    json.push('\n');
    fs::write(path, json).map_err(IoError::Io)
}

/// Read a clipboard payload. `.html` files become the HTML flavour, `.txt`
/// and `.md` files the plain text flavour, anything else is read as a JSON
/// payload.
pub fn read_payload(path: &Path) -> Result<ClipboardPayload, IoError> {
    let content = read_existing(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("html" | "htm") => Ok(ClipboardPayload::from_html(content)),
        Some("txt" | "md") => Ok(ClipboardPayload::from_text(content)),
        _ => Ok(serde_json::from_str(&content)?),
    }
}

fn read_existing(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}
