//! # Comment Input Component
//!
//! Binds one editing session to the visible compose surface: the submit
//! trigger, the loading indicator, the device-aware Enter-to-submit
//! interceptor, and the one-time reply pre-fill.
//!
//! ## Responsibilities
//!
//! - Classify key events as submit gestures (or pass them through)
//! - Initialize a newly attached session exactly once (mention pre-fill)
//! - Drive the composition controller and clear the session on dispatch
//! - Render the trigger / spinner / guest affordance per viewer state
//!
//! ## State Management
//!
//! Follows the persistent state + transient wrapper pattern:
//! `CommentInputState` lives in the screen state, `CommentInput` is
//! created each frame with borrowed state. The session handle is never
//! owned here — the host supplies it per call, and `initialized_session`
//! tracks which session identity has already been set up.

use log::debug;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::core::composer::{CommentSubmission, CompositionController};
use crate::core::content::ContentNode;
use crate::core::identity::{UserRef, Viewer};
use crate::session::{BufferSession, EditingSession, SessionChain, SessionId};
use crate::tui::component::Component;
use crate::tui::components::mention_picker::MentionPicker;
use crate::tui::event::{Key, KeyInput};
use std::sync::mpsc::Sender;

/// Viewports narrower than this (logical pixels) are treated as
/// touch-primary. A stand-in for real input-device detection: width is an
/// imperfect proxy, but it is the signal we have.
pub const TOUCH_BREAKPOINT_PX: u16 = 768;

/// Wrapped lines shown before the editor scrolls internally.
const MAX_VISIBLE_LINES: u16 = 6;
/// Top + bottom border.
const VERTICAL_OVERHEAD: u16 = 2;

const SPINNER_FRAMES: &[&str] = &["|", "/", "-", "\\"];

/// Inferred input-device class, derived from viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Desktop,
    /// Keyboard modifiers are unreliable; plain Enter must not submit.
    TouchPrimary,
}

impl DeviceClass {
    pub fn from_viewport_width(px: u16) -> Self {
        if px < TOUCH_BREAKPOINT_PX {
            DeviceClass::TouchPrimary
        } else {
            DeviceClass::Desktop
        }
    }
}

/// Configuration for one compose surface.
#[derive(Debug, Clone, Default)]
pub struct CommentInputProps {
    /// Author of the comment being replied to; triggers the mention pre-fill.
    pub reply_to: Option<UserRef>,
    /// Reply target within a free-response market (placeholder text only).
    pub parent_answer_outcome: Option<String>,
    /// Reply target comment (placeholder text only).
    pub parent_comment_id: Option<String>,
    /// Wager to pin to the submitted comment, threaded through unchanged.
    pub preset_wager_id: Option<String>,
    /// Enables the Enter-to-submit gesture entirely.
    pub submit_on_enter: bool,
}

/// Persistent state for the comment input surface.
pub struct CommentInputState {
    pub props: CommentInputProps,
    pub device: DeviceClass,
    controller: CompositionController,
    /// Identity of the session that has already been initialized. Binding
    /// is keyed on this so re-evaluation with the same session is a no-op
    /// while a replacement session re-runs setup.
    initialized_session: Option<SessionId>,
}

impl CommentInputState {
    pub fn new(props: CommentInputProps, outbox: Sender<CommentSubmission>) -> Self {
        Self {
            props,
            device: DeviceClass::Desktop,
            controller: CompositionController::new(outbox),
            initialized_session: None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.controller.is_submitting()
    }

    /// One-time setup for a newly attached session: when composing a
    /// reply, pre-fill a mention of the reply target plus a space and move
    /// focus into the session. Exactly once per session identity.
    pub fn bind(&mut self, session: Option<&mut dyn EditingSession>) {
        let Some(session) = session else {
            return;
        };
        if self.initialized_session == Some(session.id()) {
            return;
        }
        debug!("binding session {}", session.id());
        self.initialized_session = Some(session.id());

        if let Some(reply_to) = &self.props.reply_to {
            // `chain()` needs a sized receiver; go through the constructor.
            SessionChain::new(session)
                .set_content(ContentNode::mention(
                    reply_to.username.clone(),
                    reply_to.id.clone(),
                ))
                .insert_content(" ")
                .focus()
                .run();
        }
    }

    /// Whether this key press finalizes the draft. Plain Enter submits on
    /// desktop; touch-primary devices require Ctrl or Meta; Shift always
    /// requests a literal newline; an open mention picker owns Enter.
    fn is_submit_gesture(&self, key: &KeyInput, session: &dyn EditingSession) -> bool {
        self.props.submit_on_enter
            && key.code == Key::Enter
            && !key.shift
            && (self.device != DeviceClass::TouchPrimary || key.ctrl || key.meta)
            && !session.is_suggestion_picker_open()
    }

    /// Key interceptor. Returns `true` when the event was consumed; the
    /// host forwards unconsumed keys to the session for normal editing.
    pub fn handle_key(
        &mut self,
        key: &KeyInput,
        session: Option<&mut dyn EditingSession>,
        viewer: Option<&Viewer>,
    ) -> bool {
        if viewer.is_some_and(|v| v.is_banned_from_posting) {
            return false;
        }
        let Some(session) = session else {
            return false;
        };
        if !self.is_submit_gesture(key, session) {
            return false;
        }
        self.submit(Some(session));
        true
    }

    /// The submit-trigger path: dispatch, then clear the draft — but only
    /// when the controller actually accepted (a declined re-entrant submit
    /// must not destroy the draft).
    pub fn submit(&mut self, session: Option<&mut dyn EditingSession>) {
        let Some(session) = session else {
            return;
        };
        if self
            .controller
            .submit(Some(session), self.props.preset_wager_id.as_deref())
        {
            session.clear_content();
        }
    }

    /// The signed-out affordance: dispatches through the same controller
    /// guards, with the preset wager id. Content is left in place —
    /// whatever handles guest comments may still bounce the user to
    /// sign-in.
    pub fn submit_as_guest(&mut self, session: Option<&mut dyn EditingSession>) {
        let Some(session) = session else {
            return;
        };
        self.controller
            .submit(Some(session), self.props.preset_wager_id.as_deref());
    }

    pub fn placeholder(&self) -> &'static str {
        if self.props.parent_comment_id.is_some() || self.props.parent_answer_outcome.is_some() {
            "Write a reply..."
        } else {
            "Write a comment..."
        }
    }

    /// Required height for the surface at `content_width`, in rows.
    pub fn calculate_height(&self, session: Option<&BufferSession>, content_width: u16) -> u16 {
        let editor_width = editor_inner_width(content_width);
        let lines = session
            .map(|s| wrap_line_count(&s.content().plain_text(), editor_width))
            .unwrap_or(1);
        let guest_row = 1; // reserved for the guest affordance / status
        lines.min(MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD + guest_row
    }

    #[cfg(test)]
    pub(crate) fn controller_mut(&mut self) -> &mut CompositionController {
        &mut self.controller
    }
}

/// Transient render wrapper for the compose surface.
pub struct CommentInput<'a> {
    pub state: &'a mut CommentInputState,
    pub session: Option<&'a mut BufferSession>,
    pub viewer: Option<&'a Viewer>,
    pub spinner_frame: usize,
}

impl Component for CommentInput<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        // Banned viewers get no surface at all. Overrides every other rule.
        if self.viewer.is_some_and(|v| v.is_banned_from_posting) {
            return;
        }

        self.state
            .bind(self.session.as_mut().map(|s| &mut **s as &mut dyn EditingSession));

        let [input_row, footer_row] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);
        let [avatar_area, editor_area, trigger_area] = Layout::horizontal([
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(10),
        ])
        .areas(input_row);

        self.render_avatar(frame, avatar_area);
        self.render_editor(frame, editor_area);
        self.render_trigger(frame, trigger_area);

        if self.viewer.is_none() {
            let guest = Paragraph::new(Line::from(Span::styled(
                "[ Add my comment ]",
                Style::default().fg(Color::Cyan),
            )));
            frame.render_widget(guest, footer_row);
        }

        // Completion overlay sits above the editor, anchored to it.
        if let Some(session) = self.session.as_deref()
            && session.is_suggestion_picker_open()
        {
            MentionPicker { session }.render(frame, editor_area);
        }
    }
}

impl CommentInput<'_> {
    fn render_avatar(&self, frame: &mut Frame, area: Rect) {
        let (initial, style) = match self.viewer {
            Some(viewer) => (
                viewer
                    .username
                    .chars()
                    .next()
                    .map(|c| c.to_ascii_uppercase())
                    .unwrap_or('?'),
                Style::default().fg(Color::Cyan),
            ),
            None => ('?', Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(
            Paragraph::new(Span::styled(format!("({initial})"), style)),
            area,
        );
    }

    fn render_editor(&mut self, frame: &mut Frame, area: Rect) {
        let submitting = self.state.is_submitting();
        let base_style = if submitting {
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM)
        } else {
            Style::default().fg(Color::White)
        };
        let block = Block::bordered().border_style(Style::default().fg(Color::DarkGray));

        let Some(session) = self.session.as_deref() else {
            let placeholder = Paragraph::new(self.state.placeholder())
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        };

        if session.is_empty() && session.content().nodes.is_empty() {
            let placeholder = Paragraph::new(self.state.placeholder())
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(placeholder, area);
        } else {
            let spans: Vec<Span> = session
                .content()
                .nodes
                .iter()
                .map(|node| match node {
                    ContentNode::Text { text } => Span::styled(text.clone(), base_style),
                    ContentNode::Mention { attrs } => Span::styled(
                        format!("@{}", attrs.label),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                })
                .collect();
            let editor = Paragraph::new(Line::from(spans))
                .style(base_style)
                .block(block)
                .wrap(Wrap { trim: false });
            frame.render_widget(editor, area);
        }

        if session.is_focused() && session.is_editable() {
            let (col, row) = cursor_screen_pos(session, area);
            frame.set_cursor_position((col, row));
        }
    }

    fn render_trigger(&self, frame: &mut Frame, area: Rect) {
        if self.state.is_submitting() {
            let spinner = SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()];
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!(" {spinner} "),
                    Style::default().fg(Color::Gray),
                )),
                area,
            );
            return;
        }
        // Guest affordance lives in the footer; no trigger in the row.
        if self.viewer.is_none() {
            return;
        }
        let enabled = self.session.as_deref().is_some_and(|s| !s.is_empty());
        let style = if enabled {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        frame.render_widget(Paragraph::new(Span::styled("[ Send ]", style)), area);
    }
}

fn editor_inner_width(content_width: u16) -> u16 {
    // avatar column + trigger column + editor borders
    content_width.saturating_sub(4 + 10 + 2).max(1)
}

fn wrap_line_count(text: &str, width: u16) -> u16 {
    if text.is_empty() {
        return 1;
    }
    textwrap::wrap(text, width.max(1) as usize).len().max(1) as u16
}

/// Terminal cursor position for the session's edit point, relative to the
/// bordered editor area.
fn cursor_screen_pos(session: &BufferSession, area: Rect) -> (u16, u16) {
    let width = area.width.saturating_sub(2).max(1) as usize;
    let before = session.text_before_cursor();
    let lines = textwrap::wrap(&before, width);
    let row = lines.len().saturating_sub(1) as u16;
    let col = lines.last().map(|l| l.width()).unwrap_or(0) as u16;
    (area.x + 1 + col.min(area.width.saturating_sub(2)), area.y + 1 + row)
}
