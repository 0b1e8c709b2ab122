//! # Buffer-Backed Editing Session
//!
//! The terminal implementation of [`EditingSession`]. The document is a
//! run of committed nodes plus a trailing plain-text buffer the cursor
//! lives in. Mentions are atomic: the cursor never enters one, and
//! backspace at a mention boundary removes the whole node.
//!
//! Typing `@` opens the mention-completion picker. While it is open the
//! query text lives in the picker, not the buffer — committing inserts a
//! mention node plus a space, dismissing restores the literal characters.
//!
//! The session enforces the comment length limit; the controller and
//! surface never have to.

use crate::core::content::{ContentNode, Document, MAX_COMMENT_LENGTH};
use crate::core::identity::UserRef;
use crate::session::{EditingSession, SessionId};
use crate::tui::event::{Key, KeyInput};

/// State of an open mention-completion picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionQuery {
    /// Characters typed after `@`.
    pub query: String,
    /// Index into the current filtered candidate list.
    pub selected: usize,
}

pub struct BufferSession {
    id: SessionId,
    /// Finished nodes, in order. The tail buffer follows them.
    committed: Vec<ContentNode>,
    /// Trailing text under edit.
    tail: String,
    /// Cursor byte offset into `tail`.
    cursor: usize,
    editable: bool,
    focused: bool,
    max_len: usize,
    /// Users offered by the mention picker.
    participants: Vec<UserRef>,
    suggestion: Option<MentionQuery>,
}

impl BufferSession {
    pub fn new(participants: Vec<UserRef>) -> Self {
        Self {
            id: SessionId::new_v4(),
            committed: Vec::new(),
            tail: String::new(),
            cursor: 0,
            editable: true,
            focused: false,
            max_len: MAX_COMMENT_LENGTH,
            participants,
            suggestion: None,
        }
    }

    /// Override the length limit (tests use small limits).
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// The open picker state, if any.
    pub fn suggestion(&self) -> Option<&MentionQuery> {
        self.suggestion.as_ref()
    }

    /// Candidates matching the current query, in participant order.
    pub fn suggestion_matches(&self) -> Vec<&UserRef> {
        let Some(suggestion) = &self.suggestion else {
            return Vec::new();
        };
        let query = suggestion.query.to_lowercase();
        self.participants
            .iter()
            .filter(|user| user.username.to_lowercase().starts_with(&query))
            .collect()
    }

    /// Plain text of the document up to the cursor, for cursor placement.
    pub fn text_before_cursor(&self) -> String {
        let mut out = String::new();
        for node in &self.committed {
            match node {
                ContentNode::Text { text } => out.push_str(text),
                ContentNode::Mention { attrs } => {
                    out.push('@');
                    out.push_str(&attrs.label);
                }
            }
        }
        out.push_str(&self.tail[..self.cursor]);
        out
    }

    fn remaining_chars(&self) -> usize {
        self.max_len.saturating_sub(self.content().char_count())
    }

    fn insert_char(&mut self, c: char) {
        if self.remaining_chars() == 0 {
            return;
        }
        self.tail.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete backwards: a char within the tail, or the whole preceding
    /// node when the cursor sits at the start of the tail. A preceding
    /// text node is reopened for editing instead of deleted.
    fn backspace(&mut self) -> bool {
        if self.cursor > 0 {
            let prev = prev_char_boundary(&self.tail, self.cursor);
            self.tail.drain(prev..self.cursor);
            self.cursor = prev;
            return true;
        }
        match self.committed.pop() {
            Some(ContentNode::Text { text }) => {
                // Merge back into the tail and retry so the char deletion
                // happens inside it.
                let shifted = self.tail.split_off(0);
                self.tail = text;
                self.cursor = self.tail.len();
                self.tail.push_str(&shifted);
                self.backspace()
            }
            Some(ContentNode::Mention { .. }) => true,
            None => false,
        }
    }

    /// Close the picker and insert the selected mention plus a space.
    /// With no candidate to commit, the typed text survives as literal
    /// characters, same as dismissal.
    fn commit_suggestion(&mut self) {
        let picked = self
            .suggestion_matches()
            .get(self.suggestion.as_ref().map_or(0, |s| s.selected))
            .map(|user| (*user).clone());
        match picked {
            Some(user) => {
                self.suggestion = None;
                self.flush_tail();
                self.committed
                    .push(ContentNode::mention(user.username, user.id));
                self.insert_char(' ');
            }
            None => self.dismiss_suggestion(),
        }
    }

    /// Close the picker, restoring the literal `@query` text.
    fn dismiss_suggestion(&mut self) {
        if let Some(suggestion) = self.suggestion.take() {
            self.insert_char('@');
            for c in suggestion.query.chars() {
                self.insert_char(c);
            }
        }
    }

    /// Move the tail into the committed run so a structured node can follow.
    fn flush_tail(&mut self) {
        if !self.tail.is_empty() {
            let text = std::mem::take(&mut self.tail);
            self.committed.push(ContentNode::Text { text });
        }
        self.cursor = 0;
    }

    fn handle_picker_key(&mut self, key: &KeyInput) -> bool {
        let match_count = self.suggestion_matches().len();
        let Some(suggestion) = self.suggestion.as_mut() else {
            return false;
        };
        match key.code {
            Key::Esc => {
                self.dismiss_suggestion();
                true
            }
            Key::Up => {
                suggestion.selected = suggestion.selected.saturating_sub(1);
                true
            }
            Key::Down => {
                if match_count > 0 {
                    suggestion.selected = (suggestion.selected + 1).min(match_count - 1);
                }
                true
            }
            Key::Enter | Key::Tab => {
                self.commit_suggestion();
                true
            }
            Key::Backspace => {
                if suggestion.query.pop().is_none() {
                    // Backspacing over the `@` itself closes the picker.
                    self.suggestion = None;
                } else {
                    suggestion.selected = 0;
                }
                true
            }
            Key::Char(c) if !key.ctrl && !key.meta => {
                suggestion.query.push(c);
                suggestion.selected = 0;
                true
            }
            _ => false,
        }
    }

    /// Apply one key of user input. Returns whether the key was handled.
    /// User input is gated by editability; programmatic mutation is not.
    pub fn handle_key(&mut self, key: &KeyInput) -> bool {
        if !self.editable {
            return false;
        }
        if self.suggestion.is_some() {
            return self.handle_picker_key(key);
        }
        match key.code {
            Key::Char('@') if !key.ctrl && !key.meta => {
                self.suggestion = Some(MentionQuery {
                    query: String::new(),
                    selected: 0,
                });
                true
            }
            Key::Char(c) if !key.ctrl && !key.meta => {
                self.insert_char(c);
                true
            }
            // A non-qualifying Enter is a literal newline.
            Key::Enter => {
                self.insert_char('\n');
                true
            }
            Key::Backspace => self.backspace(),
            Key::Left => {
                if self.cursor > 0 {
                    self.cursor = prev_char_boundary(&self.tail, self.cursor);
                    true
                } else {
                    false
                }
            }
            Key::Right => {
                if self.cursor < self.tail.len() {
                    self.cursor = next_char_boundary(&self.tail, self.cursor);
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }
}

impl EditingSession for BufferSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn is_empty(&self) -> bool {
        self.content().is_empty()
    }

    fn is_editable(&self) -> bool {
        self.editable
    }

    fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    fn set_content(&mut self, node: ContentNode) {
        self.committed = vec![node];
        self.tail.clear();
        self.cursor = 0;
        self.suggestion = None;
    }

    fn insert_content(&mut self, text: &str) {
        self.cursor = self.tail.len();
        for c in text.chars() {
            self.insert_char(c);
        }
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn clear_content(&mut self) {
        self.committed.clear();
        self.tail.clear();
        self.cursor = 0;
        self.suggestion = None;
    }

    fn content(&self) -> Document {
        let mut doc = Document {
            nodes: self.committed.clone(),
        };
        if !self.tail.is_empty() {
            doc.push(ContentNode::text(self.tail.clone()));
        }
        doc
    }

    fn is_suggestion_picker_open(&self) -> bool {
        self.suggestion.is_some()
    }
}

/// Largest char boundary strictly before `pos`.
fn prev_char_boundary(s: &str, pos: usize) -> usize {
    let mut p = pos - 1;
    while !s.is_char_boundary(p) {
        p -= 1;
    }
    p
}

/// Smallest char boundary strictly after `pos`.
fn next_char_boundary(s: &str, pos: usize) -> usize {
    let mut p = pos + 1;
    while p < s.len() && !s.is_char_boundary(p) {
        p += 1;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{key, type_str};

    fn session_with_alice() -> BufferSession {
        BufferSession::new(vec![
            UserRef::new("u1", "alice"),
            UserRef::new("u2", "albert"),
            UserRef::new("u3", "bob"),
        ])
    }

    #[test]
    fn test_typing_builds_content() {
        let mut session = session_with_alice();
        type_str(&mut session, "hi there");
        assert_eq!(session.content().plain_text(), "hi there");
        assert!(!session.is_empty());
    }

    #[test]
    fn test_backspace_over_multibyte_char() {
        let mut session = session_with_alice();
        type_str(&mut session, "héllo");
        session.handle_key(&key(Key::Backspace));
        session.handle_key(&key(Key::Backspace));
        session.handle_key(&key(Key::Backspace));
        session.handle_key(&key(Key::Backspace));
        assert_eq!(session.content().plain_text(), "h");
    }

    #[test]
    fn test_backspace_removes_mention_atomically() {
        let mut session = session_with_alice();
        session.set_content(ContentNode::mention("alice", "u1"));
        session.insert_content(" ");
        session.handle_key(&key(Key::Backspace)); // the space
        session.handle_key(&key(Key::Backspace)); // the whole mention
        assert!(session.is_empty());
        assert!(session.content().nodes.is_empty());
    }

    #[test]
    fn test_not_editable_ignores_user_input() {
        let mut session = session_with_alice();
        session.set_editable(false);
        assert!(!session.handle_key(&key(Key::Char('x'))));
        assert!(session.is_empty());
        // Programmatic mutation still works while locked.
        session.insert_content("from code");
        assert_eq!(session.content().plain_text(), "from code");
    }

    #[test]
    fn test_max_length_enforced_at_insert() {
        let mut session = session_with_alice().with_max_len(5);
        type_str(&mut session, "123456789");
        assert_eq!(session.content().plain_text(), "12345");
        session.insert_content("more");
        assert_eq!(session.content().char_count(), 5);
    }

    #[test]
    fn test_at_opens_picker_and_enter_commits() {
        let mut session = session_with_alice();
        session.handle_key(&key(Key::Char('@')));
        assert!(session.is_suggestion_picker_open());

        type_str(&mut session, "al");
        let matches: Vec<&str> = session
            .suggestion_matches()
            .iter()
            .map(|u| u.username.as_str())
            .collect();
        assert_eq!(matches, vec!["alice", "albert"]);

        session.handle_key(&key(Key::Enter));
        assert!(!session.is_suggestion_picker_open());
        let doc = session.content();
        assert_eq!(doc.nodes[0], ContentNode::mention("alice", "u1"));
        assert_eq!(doc.nodes[1], ContentNode::text(" "));
    }

    #[test]
    fn test_picker_down_selects_second_match() {
        let mut session = session_with_alice();
        session.handle_key(&key(Key::Char('@')));
        type_str(&mut session, "al");
        session.handle_key(&key(Key::Down));
        session.handle_key(&key(Key::Enter));
        assert_eq!(
            session.content().nodes[0],
            ContentNode::mention("albert", "u2")
        );
    }

    #[test]
    fn test_picker_esc_restores_literal_text() {
        let mut session = session_with_alice();
        type_str(&mut session, "cc ");
        session.handle_key(&key(Key::Char('@')));
        type_str(&mut session, "al");
        session.handle_key(&key(Key::Esc));
        assert!(!session.is_suggestion_picker_open());
        assert_eq!(session.content().plain_text(), "cc @al");
    }

    #[test]
    fn test_picker_enter_with_no_matches_keeps_typed_text() {
        let mut session = session_with_alice();
        session.handle_key(&key(Key::Char('@')));
        type_str(&mut session, "zzz");
        session.handle_key(&key(Key::Enter));
        assert!(!session.is_suggestion_picker_open());
        assert_eq!(session.content().plain_text(), "@zzz");
    }

    #[test]
    fn test_picker_backspace_past_query_closes() {
        let mut session = session_with_alice();
        session.handle_key(&key(Key::Char('@')));
        session.handle_key(&key(Key::Char('a')));
        session.handle_key(&key(Key::Backspace)); // query now empty
        assert!(session.is_suggestion_picker_open());
        session.handle_key(&key(Key::Backspace)); // removes the @
        assert!(!session.is_suggestion_picker_open());
        assert!(session.is_empty());
    }

    #[test]
    fn test_enter_inserts_newline_when_picker_closed() {
        let mut session = session_with_alice();
        type_str(&mut session, "line one");
        session.handle_key(&key(Key::Enter));
        type_str(&mut session, "line two");
        assert_eq!(session.content().plain_text(), "line one\nline two");
    }

    #[test]
    fn test_clear_content_resets_everything() {
        let mut session = session_with_alice();
        type_str(&mut session, "draft");
        session.handle_key(&key(Key::Char('@')));
        session.clear_content();
        assert!(session.is_empty());
        assert!(!session.is_suggestion_picker_open());
    }

    #[test]
    fn test_content_snapshot_is_independent() {
        let mut session = session_with_alice();
        type_str(&mut session, "frozen");
        let snapshot = session.content();
        type_str(&mut session, " thawed");
        assert_eq!(snapshot.plain_text(), "frozen");
    }
}
