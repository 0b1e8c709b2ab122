//! # Composition Controller
//!
//! Single source of truth for "is a submission currently happening", and
//! the only path that dispatches a comment externally.
//!
//! Dispatch is fire-and-forget: the submission goes out on an mpsc channel
//! and no result is awaited. The host-side consumer owns network delivery
//! and failure reporting. Consequences the rest of the subsystem relies on:
//!
//! - at most one submission per draft is ever in flight,
//! - re-entrant or empty submits are silent no-ops,
//! - session editability flips with every submitting transition,
//! - the content snapshot is captured before anything can clear it.

use std::sync::mpsc::Sender;

use chrono::Utc;
use log::{debug, warn};

use crate::core::content::Document;
use crate::session::EditingSession;

/// One finalized comment leaving the subsystem.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentSubmission {
    pub content: Document,
    /// Opaque pinned-wager identifier, threaded through unchanged.
    pub wager_id: Option<String>,
    /// Unix millis at dispatch time.
    pub composed_at: i64,
}

pub struct CompositionController {
    submitting: bool,
    outbox: Sender<CommentSubmission>,
}

impl CompositionController {
    pub fn new(outbox: Sender<CommentSubmission>) -> Self {
        Self {
            submitting: false,
            outbox,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Force the submitting flag so render tests can observe the
    /// in-flight presentation, which is otherwise transient.
    #[cfg(test)]
    pub(crate) fn set_submitting_for_test(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    /// Dispatch the session's current content. Returns `true` when a
    /// submission was actually sent.
    ///
    /// Silent no-op (returns `false`) when there is no session, the
    /// session is empty, or a submission is already in flight. Callers
    /// must not clear the session on a declined submit.
    pub fn submit(
        &mut self,
        session: Option<&mut dyn EditingSession>,
        wager_id: Option<&str>,
    ) -> bool {
        let Some(session) = session else {
            return false;
        };
        if session.is_empty() || self.submitting {
            debug!(
                "submit declined (empty={}, submitting={})",
                session.is_empty(),
                self.submitting
            );
            return false;
        }

        self.submitting = true;
        session.set_editable(false);

        // Snapshot before the caller clears the session: the consumer must
        // never observe edits made after this point.
        let content = session.content();
        let submission = CommentSubmission {
            content,
            wager_id: wager_id.map(str::to_string),
            composed_at: Utc::now().timestamp_millis(),
        };
        if self.outbox.send(submission).is_err() {
            // Receiver gone — the host is tearing down. Nothing to do but
            // put the draft back in an editable state.
            warn!("comment outbox receiver dropped; submission discarded");
        }

        self.submitting = false;
        session.set_editable(true);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::BufferSession;
    use crate::test_support::{test_controller, test_session, test_session_with_text};
    use std::sync::mpsc;

    #[test]
    fn test_submit_declines_without_session() {
        let (mut controller, rx) = test_controller();
        assert!(!controller.submit(None, None));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_submit_declines_on_empty_session() {
        let (mut controller, rx) = test_controller();
        let mut session = test_session();
        assert!(!controller.submit(Some(&mut session), None));
        assert!(rx.try_recv().is_err());
        assert!(session.is_editable(), "declined submit must not lock the session");
    }

    #[test]
    fn test_submit_dispatches_snapshot_and_wager_id() {
        let (mut controller, rx) = test_controller();
        let mut session = test_session_with_text("good odds");
        assert!(controller.submit(Some(&mut session), Some("wager-7")));

        let submission = rx.try_recv().unwrap();
        assert_eq!(submission.content.plain_text(), "good odds");
        assert_eq!(submission.wager_id.as_deref(), Some("wager-7"));
        assert!(submission.composed_at > 0);
        assert!(!controller.is_submitting());
    }

    #[test]
    fn test_snapshot_unaffected_by_later_edits() {
        let (mut controller, rx) = test_controller();
        let mut session = test_session_with_text("before");
        controller.submit(Some(&mut session), None);
        session.insert_content(" after");

        let submission = rx.try_recv().unwrap();
        assert_eq!(submission.content.plain_text(), "before");
    }

    #[test]
    fn test_editability_restored_after_dispatch() {
        let (mut controller, _rx) = test_controller();
        let mut session = test_session_with_text("hello");
        assert!(session.is_editable());
        controller.submit(Some(&mut session), None);
        assert!(session.is_editable());
        assert!(!controller.is_submitting());
    }

    #[test]
    fn test_dropped_receiver_still_resets_state() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut controller = CompositionController::new(tx);
        let mut session = test_session_with_text("into the void");

        // The dispatch fails internally but the draft must come back editable.
        assert!(controller.submit(Some(&mut session), None));
        assert!(!controller.is_submitting());
        assert!(session.is_editable());
    }

    #[test]
    fn test_at_most_one_submission_per_gesture() {
        let (mut controller, rx) = test_controller();
        let mut session: BufferSession = test_session_with_text("once");
        controller.submit(Some(&mut session), None);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }
}
