//! # Input Events
//!
//! Crossterm polling and the crate's own key representation. Unlike a
//! pre-classified event enum, `KeyInput` keeps modifiers attached — the
//! comment input surface needs the raw combination (Enter vs Shift+Enter
//! vs Ctrl+Enter) to classify submit gestures itself.
//!
//! Only this module touches crossterm types.

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

/// Logical key, stripped of crossterm specifics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Esc,
    Tab,
    Up,
    Down,
    Left,
    Right,
}

/// A key press with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub code: Key,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyInput {
    pub fn plain(code: Key) -> Self {
        Self {
            code,
            shift: false,
            ctrl: false,
            alt: false,
            meta: false,
        }
    }
}

/// Events the compose screen reacts to.
pub enum TuiEvent {
    Key(KeyInput),
    /// Bracketed paste — preserves newlines.
    Paste(String),
    Resize,
    /// Ctrl+C, always honored.
    ForceQuit,
}

/// Poll for an event, blocking up to `timeout`.
pub fn poll_event_timeout(timeout: std::time::Duration) -> Option<TuiEvent> {
    if !event::poll(timeout).ok()? {
        return None;
    }
    match event::read().ok()? {
        Event::Key(key_event) => {
            // Kitty protocol reports releases too; only presses matter here.
            if key_event.kind == KeyEventKind::Release {
                return None;
            }
            if key_event.modifiers.contains(KeyModifiers::CONTROL)
                && key_event.code == KeyCode::Char('c')
            {
                return Some(TuiEvent::ForceQuit);
            }
            let code = match key_event.code {
                KeyCode::Char(c) => Key::Char(c),
                KeyCode::Enter => Key::Enter,
                KeyCode::Backspace => Key::Backspace,
                KeyCode::Esc => Key::Esc,
                KeyCode::Tab => Key::Tab,
                KeyCode::Up => Key::Up,
                KeyCode::Down => Key::Down,
                KeyCode::Left => Key::Left,
                KeyCode::Right => Key::Right,
                _ => return None,
            };
            log::debug!(
                "Key event: {:?} with modifiers {:?}",
                key_event.code,
                key_event.modifiers
            );
            Some(TuiEvent::Key(KeyInput {
                code,
                shift: key_event.modifiers.contains(KeyModifiers::SHIFT),
                ctrl: key_event.modifiers.contains(KeyModifiers::CONTROL),
                alt: key_event.modifiers.contains(KeyModifiers::ALT),
                meta: key_event.modifiers.contains(KeyModifiers::SUPER),
            }))
        }
        Event::Paste(data) => Some(TuiEvent::Paste(data)),
        Event::Resize(..) => Some(TuiEvent::Resize),
        _ => None,
    }
}

/// Poll without blocking (used to drain the queue between draws).
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(std::time::Duration::ZERO)
}
