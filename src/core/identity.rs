//! # Viewer Identity
//!
//! Who is looking at the compose surface. Retrieval is out of scope for
//! the composition subsystem — the record is loaded from config (see
//! `core::config`) and passed in by the host. `is_banned_from_posting` is
//! the one moderation gate this subsystem honors: a banned viewer gets no
//! compose surface at all.

use serde::{Deserialize, Serialize};

/// The signed-in user, or the relevant fields of one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewer {
    pub id: String,
    pub username: String,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_banned_from_posting: bool,
}

/// A lightweight reference to another user, e.g. the author of the comment
/// being replied to. Enough to synthesize a mention node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,
    pub username: String,
}

impl UserRef {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banned_flag_defaults_false() {
        let viewer: Viewer = toml::from_str(
            r#"
id = "u9"
username = "bob"
"#,
        )
        .unwrap();
        assert!(!viewer.is_banned_from_posting);
        assert!(viewer.avatar_url.is_none());
    }
}
