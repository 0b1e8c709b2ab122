//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::mpsc::{self, Receiver};

use crate::core::composer::{CommentSubmission, CompositionController};
use crate::core::identity::{UserRef, Viewer};
use crate::session::{BufferSession, EditingSession};
use crate::tui::components::CommentInputProps;
use crate::tui::event::{Key, KeyInput};

/// A key press with no modifiers.
pub fn key(code: Key) -> KeyInput {
    KeyInput::plain(code)
}

/// Types `text` into the session one key press at a time, going through
/// the same path user input takes (picker state included).
pub fn type_str(session: &mut BufferSession, text: &str) {
    for c in text.chars() {
        session.handle_key(&key(Key::Char(c)));
    }
}

/// A fresh session with a small fixed participant list.
pub fn test_session() -> BufferSession {
    BufferSession::new(vec![
        UserRef::new("u1", "alice"),
        UserRef::new("u2", "albert"),
        UserRef::new("u3", "bob"),
    ])
}

/// A session pre-loaded with plain text (programmatically, so it works
/// regardless of editability).
pub fn test_session_with_text(text: &str) -> BufferSession {
    let mut session = test_session();
    session.insert_content(text);
    session
}

pub fn test_viewer() -> Viewer {
    Viewer {
        id: "u_me".to_string(),
        username: "dana".to_string(),
        avatar_url: None,
        is_banned_from_posting: false,
    }
}

/// A controller wired to a capturing outbox.
pub fn test_controller() -> (CompositionController, Receiver<CommentSubmission>) {
    let (tx, rx) = mpsc::channel();
    (CompositionController::new(tx), rx)
}

/// Props with no reply context.
pub fn plain_props(submit_on_enter: bool) -> CommentInputProps {
    CommentInputProps {
        submit_on_enter,
        ..Default::default()
    }
}

/// Props replying to the given user.
pub fn reply_props(id: &str, username: &str) -> CommentInputProps {
    CommentInputProps {
        reply_to: Some(UserRef::new(id, username)),
        submit_on_enter: true,
        ..Default::default()
    }
}
