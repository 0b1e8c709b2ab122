//! Outbound comments API: the collaborator that actually persists what
//! the composition subsystem dispatches.

mod client;

pub use client::{ApiError, CommentBackend, HttpBackend, PostCommentRequest, PostedComment};
