//! Domain logic: the content model, viewer identity, the composition
//! controller, and configuration. Nothing in here knows about ratatui.

pub mod composer;
pub mod config;
pub mod content;
pub mod identity;
