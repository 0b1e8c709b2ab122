//! # TUI Adapter
//!
//! The ratatui-specific layer: terminal I/O, the compose-screen event
//! loop, and the routing of key events through the comment input surface.
//!
//! Routing order per key press: the surface's interceptor classifies the
//! event first (consuming submit gestures); anything unconsumed goes to
//! the editing session for normal text editing. Esc quits only when the
//! mention picker is closed — an open picker owns Esc.
//!
//! Submissions leave the subsystem on an mpsc channel; this loop is the
//! host-side consumer, spawning one tokio task per submission to post it
//! and reporting the outcome in the status line.

pub mod component;
pub mod components;
pub mod event;

use std::io::stdout;
use std::sync::{Arc, mpsc};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{info, warn};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use ratatui::widgets::Paragraph;

use crate::api::{CommentBackend, HttpBackend, PostCommentRequest};
use crate::core::composer::CommentSubmission;
use crate::core::config::ResolvedConfig;
use crate::session::{BufferSession, EditingSession};
use crate::tui::component::Component;
use crate::tui::components::{CommentInput, CommentInputProps, CommentInputState, DeviceClass};
use crate::tui::event::{Key, TuiEvent, poll_event_immediate, poll_event_timeout};

/// Outcomes reported back from the post tasks.
enum HostEvent {
    Posted(String),
    PostFailed(String),
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol enables Shift+Enter detection; terminals
        // that don't support it ignore the flags.
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags, DisableBracketedPaste);
    }
}

/// Inferred device class for this terminal. Pixel dimensions are only
/// reported by some terminals; when unavailable, assume desktop.
fn detect_device_class() -> DeviceClass {
    match crossterm::terminal::window_size() {
        Ok(size) if size.width > 0 => DeviceClass::from_viewport_width(size.width),
        _ => DeviceClass::Desktop,
    }
}

pub fn run(
    config: ResolvedConfig,
    market_id: String,
    props: CommentInputProps,
) -> std::io::Result<()> {
    let backend: Arc<dyn CommentBackend> = Arc::new(HttpBackend::new(
        config.api_base_url.clone(),
        config.api_key.clone(),
    ));

    // Outbox: controller → this loop. Host events: post tasks → this loop.
    let (outbox_tx, outbox_rx) = mpsc::channel::<CommentSubmission>();
    let (host_tx, host_rx) = mpsc::channel::<HostEvent>();

    let mut session = BufferSession::new(config.participants.clone());
    session.focus();
    let mut input = CommentInputState::new(props, outbox_tx);
    input.device = detect_device_class();
    info!("Compose screen for market {} ({:?})", market_id, input.device);

    let mut status_message = String::from("Esc to quit");
    let mut posted_count: usize = 0;

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let start_time = std::time::Instant::now();
    let mut needs_redraw = true;
    let mut should_quit = false;

    while !should_quit {
        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| {
                draw_compose_screen(
                    f,
                    &market_id,
                    &status_message,
                    posted_count,
                    &mut input,
                    &mut session,
                    &config,
                    spinner_frame,
                )
            })?;
            needs_redraw = false;
        }

        let first_event = poll_event_timeout(std::time::Duration::from_millis(250));
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            match event {
                TuiEvent::ForceQuit => {
                    should_quit = true;
                }
                TuiEvent::Resize => {
                    input.device = detect_device_class();
                }
                TuiEvent::Paste(text) => {
                    session.insert_content(&text);
                }
                TuiEvent::Key(key) => {
                    let consumed = input.handle_key(
                        &key,
                        Some(&mut session as &mut dyn EditingSession),
                        config.viewer.as_ref(),
                    );
                    if consumed {
                        continue;
                    }
                    if key.code == Key::Esc && !session.is_suggestion_picker_open() {
                        should_quit = true;
                        continue;
                    }
                    session.handle_key(&key);
                }
            }
        }

        // Forward finalized submissions to the backend, one task each.
        while let Ok(submission) = outbox_rx.try_recv() {
            needs_redraw = true;
            spawn_post(
                backend.clone(),
                market_id.clone(),
                submission,
                input.props.parent_comment_id.clone(),
                input.props.parent_answer_outcome.clone(),
                host_tx.clone(),
            );
            status_message = String::from("Posting...");
        }

        while let Ok(host_event) = host_rx.try_recv() {
            needs_redraw = true;
            match host_event {
                HostEvent::Posted(id) => {
                    posted_count += 1;
                    status_message = format!("Comment {id} posted");
                }
                HostEvent::PostFailed(message) => {
                    status_message = format!("Post failed: {message}");
                }
            }
        }
    }

    ratatui::restore();
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn draw_compose_screen(
    frame: &mut Frame,
    market_id: &str,
    status_message: &str,
    posted_count: usize,
    input: &mut CommentInputState,
    session: &mut BufferSession,
    config: &ResolvedConfig,
    spinner_frame: usize,
) {
    let input_height = input.calculate_height(Some(session), frame.area().width);
    let [title_area, _spacer, input_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(input_height),
    ])
    .areas(frame.area());

    let title = format!("Punt — market {market_id} | {status_message} | posted: {posted_count}");
    frame.render_widget(
        Paragraph::new(Span::styled(title, Style::default().fg(Color::Gray))),
        title_area,
    );

    CommentInput {
        state: input,
        session: Some(session),
        viewer: config.viewer.as_ref(),
        spinner_frame,
    }
    .render(frame, input_area);
}

fn spawn_post(
    backend: Arc<dyn CommentBackend>,
    market_id: String,
    submission: CommentSubmission,
    parent_comment_id: Option<String>,
    parent_answer_outcome: Option<String>,
    host_tx: mpsc::Sender<HostEvent>,
) {
    info!(
        "Spawning comment post: market={} nodes={} wager={:?}",
        market_id,
        submission.content.nodes.len(),
        submission.wager_id
    );
    tokio::spawn(async move {
        let request = PostCommentRequest {
            market_id: &market_id,
            content: &submission.content,
            wager_id: submission.wager_id.as_deref(),
            parent_comment_id: parent_comment_id.as_deref(),
            parent_answer_outcome: parent_answer_outcome.as_deref(),
        };
        let host_event = match backend.post_comment(request).await {
            Ok(posted) => HostEvent::Posted(posted.id),
            Err(e) => HostEvent::PostFailed(e.to_string()),
        };
        if host_tx.send(host_event).is_err() {
            warn!("Failed to report post outcome: receiver dropped");
        }
    });
}
