//! # Rich-Text Content Model
//!
//! The document a comment session edits: a flat run of inline nodes. Only
//! two node kinds exist — plain text and user mentions. The serde shape
//! matches what the comments API expects on the wire:
//!
//! ```json
//! {"type": "text", "text": "nice call "}
//! {"type": "mention", "attrs": {"label": "alice", "id": "u1"}}
//! ```
//!
//! Length limits are enforced by the editing session (see
//! `session::buffer`), not here — `Document` is just the data.

use serde::{Deserialize, Serialize};

/// Maximum comment length in characters, counting mention labels.
/// Enforced by the editing session at insert time.
pub const MAX_COMMENT_LENGTH: usize = 10_000;

/// Attributes carried by a mention node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionAttrs {
    pub label: String,
    pub id: String,
}

/// One inline node of a comment document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentNode {
    Text { text: String },
    Mention { attrs: MentionAttrs },
}

impl ContentNode {
    pub fn text(text: impl Into<String>) -> Self {
        ContentNode::Text { text: text.into() }
    }

    /// A mention referencing a user by id, displayed as `label`.
    pub fn mention(label: impl Into<String>, id: impl Into<String>) -> Self {
        ContentNode::Mention {
            attrs: MentionAttrs {
                label: label.into(),
                id: id.into(),
            },
        }
    }

    /// Character count this node contributes toward the length limit.
    /// Mentions count their rendered form (`@label`).
    pub fn char_len(&self) -> usize {
        match self {
            ContentNode::Text { text } => text.chars().count(),
            ContentNode::Mention { attrs } => 1 + attrs.label.chars().count(),
        }
    }

    /// True when the node carries no visible content.
    fn is_blank(&self) -> bool {
        match self {
            ContentNode::Text { text } => text.trim().is_empty(),
            ContentNode::Mention { .. } => false,
        }
    }
}

/// An ordered run of inline nodes. Cheap to clone — this is the snapshot
/// type the controller captures at submit time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub nodes: Vec<ContentNode>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty means "nothing worth submitting": no nodes, or only
    /// whitespace text. A lone mention is not empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(ContentNode::is_blank)
    }

    pub fn char_count(&self) -> usize {
        self.nodes.iter().map(ContentNode::char_len).sum()
    }

    /// Plain-text projection, mentions rendered as `@label`.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                ContentNode::Text { text } => out.push_str(text),
                ContentNode::Mention { attrs } => {
                    out.push('@');
                    out.push_str(&attrs.label);
                }
            }
        }
        out
    }

    pub fn push(&mut self, node: ContentNode) {
        self.nodes.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_wire_shape() {
        let node = ContentNode::mention("alice", "u1");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "mention",
                "attrs": { "label": "alice", "id": "u1" }
            })
        );
    }

    #[test]
    fn test_text_wire_shape() {
        let node = ContentNode::text("hello");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "text", "text": "hello" }));
    }

    #[test]
    fn test_document_serializes_as_array() {
        let mut doc = Document::new();
        doc.push(ContentNode::mention("alice", "u1"));
        doc.push(ContentNode::text(" agreed"));
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.starts_with('['), "document should be a bare array: {json}");
    }

    #[test]
    fn test_empty_document() {
        assert!(Document::new().is_empty());

        let mut whitespace_only = Document::new();
        whitespace_only.push(ContentNode::text("   \n "));
        assert!(whitespace_only.is_empty());

        let mut with_mention = Document::new();
        with_mention.push(ContentNode::mention("alice", "u1"));
        assert!(!with_mention.is_empty(), "a lone mention is submittable");
    }

    #[test]
    fn test_char_count_includes_mention_label() {
        let mut doc = Document::new();
        doc.push(ContentNode::mention("alice", "u1")); // @alice = 6
        doc.push(ContentNode::text(" hi")); // 3
        assert_eq!(doc.char_count(), 9);
    }

    #[test]
    fn test_plain_text_projection() {
        let mut doc = Document::new();
        doc.push(ContentNode::mention("alice", "u1"));
        doc.push(ContentNode::text(" nice call"));
        assert_eq!(doc.plain_text(), "@alice nice call");
    }
}
