//! # Editing Session
//!
//! The collaborator boundary between the composition subsystem and
//! whatever actually edits rich text. The subsystem never creates or
//! destroys a session — it receives a handle, asks it questions, and
//! mutates it through this trait.
//!
//! Each session carries a stable identity (`SessionId`). The input surface
//! keys its one-time initialization on that identity, so replacing the
//! session object re-runs setup while re-evaluating against the same
//! session does not.

mod buffer;

pub use buffer::BufferSession;

use crate::core::content::{ContentNode, Document};

/// Stable identity of one editing session instance.
pub type SessionId = uuid::Uuid;

/// Capabilities the composition subsystem requires from a rich-text
/// editing session.
pub trait EditingSession {
    /// Identity of this session instance. Two handles to the same live
    /// session report the same id; a replacement session reports a new one.
    fn id(&self) -> SessionId;

    /// True when there is nothing worth submitting.
    fn is_empty(&self) -> bool;

    fn is_editable(&self) -> bool;

    /// Enable or disable user edits. Programmatic mutation (set / insert /
    /// clear) is not gated by this — only user input is.
    fn set_editable(&mut self, editable: bool);

    /// Replace the whole document with a single node.
    fn set_content(&mut self, node: ContentNode);

    /// Insert plain text at the end of the document.
    fn insert_content(&mut self, text: &str);

    /// Move input focus into the session.
    fn focus(&mut self);

    fn is_focused(&self) -> bool;

    fn clear_content(&mut self);

    /// Owned snapshot of the current document. Submission captures this
    /// before clearing, so later edits never leak into a submitted comment.
    fn content(&self) -> Document;

    /// True while a structured-suggestion picker (mention completion) is
    /// open. Enter belongs to the picker in that state, never to submit.
    fn is_suggestion_picker_open(&self) -> bool;

    /// Start a chain of content operations, applied together on `run()`.
    fn chain(&mut self) -> SessionChain<'_, Self>
    where
        Self: Sized,
    {
        SessionChain::new(self)
    }
}

enum ChainOp {
    SetContent(ContentNode),
    InsertContent(String),
    Focus,
}

/// Deferred composition of content-mutating calls:
///
/// ```ignore
/// session.chain()
///     .set_content(ContentNode::mention("alice", "u1"))
///     .insert_content(" ")
///     .focus()
///     .run();
/// ```
///
/// Nothing is applied until `run()`; dropping the chain applies nothing.
pub struct SessionChain<'a, S: EditingSession + ?Sized> {
    session: &'a mut S,
    ops: Vec<ChainOp>,
}

impl<'a, S: EditingSession + ?Sized> SessionChain<'a, S> {
    pub fn new(session: &'a mut S) -> Self {
        Self {
            session,
            ops: Vec::new(),
        }
    }

    pub fn set_content(mut self, node: ContentNode) -> Self {
        self.ops.push(ChainOp::SetContent(node));
        self
    }

    pub fn insert_content(mut self, text: &str) -> Self {
        self.ops.push(ChainOp::InsertContent(text.to_string()));
        self
    }

    pub fn focus(mut self) -> Self {
        self.ops.push(ChainOp::Focus);
        self
    }

    pub fn run(self) {
        for op in self.ops {
            match op {
                ChainOp::SetContent(node) => self.session.set_content(node),
                ChainOp::InsertContent(text) => self.session.insert_content(&text),
                ChainOp::Focus => self.session.focus(),
            }
        }
    }
}
