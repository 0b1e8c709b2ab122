//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.punt/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::core::identity::{UserRef, Viewer};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PuntConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
    /// The signed-in user, if any. Absent = browsing as a guest.
    pub identity: Option<Viewer>,
    /// Users offered by the mention picker.
    #[serde(default)]
    pub participants: Vec<UserRef>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub submit_on_enter: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_API_BASE_URL: &str = "https://api.punt.dev/v0";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub viewer: Option<Viewer>,
    pub participants: Vec<UserRef>,
    pub submit_on_enter: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.punt/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".punt").join("config.toml"))
}

/// Load config from `~/.punt/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `PuntConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<PuntConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(PuntConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(PuntConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: PuntConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# Punt Configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# submit_on_enter = true             # Enter posts the comment (Shift+Enter for newline)

# [api]
# base_url = "https://api.punt.dev/v0"
# api_key = "pk-..."                 # Or set PUNT_API_KEY env var

# [identity]
# id = "u_1a2b3c"
# username = "yourname"
# avatar_url = "https://..."

# [[participants]]
# id = "u_4d5e6f"
# username = "alice"

# [[participants]]
# id = "u_7g8h9i"
# username = "bob"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env
/// vars → CLI. `cli_no_submit_on_enter` is the `--no-submit-on-enter`
/// flag (true disables the Enter gesture regardless of config).
pub fn resolve(config: &PuntConfig, cli_no_submit_on_enter: bool) -> ResolvedConfig {
    // Base URL: env → config → default
    let api_base_url = std::env::var("PUNT_API_BASE_URL")
        .ok()
        .or_else(|| config.api.base_url.clone())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

    // API key: env → config
    let api_key = std::env::var("PUNT_API_KEY")
        .ok()
        .or_else(|| config.api.api_key.clone());

    // Enter-to-submit: CLI → config → default (on)
    let submit_on_enter = if cli_no_submit_on_enter {
        false
    } else {
        config.general.submit_on_enter.unwrap_or(true)
    };

    ResolvedConfig {
        api_base_url,
        api_key,
        viewer: config.identity.clone(),
        participants: config.participants.clone(),
        submit_on_enter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = PuntConfig::default();
        assert!(config.identity.is_none());
        assert!(config.participants.is_empty());
        assert!(config.general.submit_on_enter.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let config = PuntConfig::default();
        let resolved = resolve(&config, false);
        assert_eq!(resolved.api_base_url, DEFAULT_API_BASE_URL);
        assert!(resolved.submit_on_enter);
        assert!(resolved.viewer.is_none());
    }

    #[test]
    fn test_resolve_cli_flag_disables_enter_gesture() {
        let config = PuntConfig {
            general: GeneralConfig {
                submit_on_enter: Some(true),
            },
            ..Default::default()
        };
        let resolved = resolve(&config, true);
        assert!(!resolved.submit_on_enter);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
submit_on_enter = false

[api]
base_url = "https://staging.punt.dev/v0"
api_key = "pk-test-123"

[identity]
id = "u1"
username = "alice"
is_banned_from_posting = false

[[participants]]
id = "u2"
username = "bob"

[[participants]]
id = "u3"
username = "carol"
"#;
        let config: PuntConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.submit_on_enter, Some(false));
        assert_eq!(
            config.api.base_url.as_deref(),
            Some("https://staging.punt.dev/v0")
        );
        assert_eq!(config.identity.as_ref().unwrap().username, "alice");
        assert_eq!(config.participants.len(), 2);
        assert_eq!(config.participants[1].username, "carol");
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing — everything else stays default
        let toml_str = r#"
[api]
api_key = "pk-only"
"#;
        let config: PuntConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.api_key.as_deref(), Some("pk-only"));
        assert!(config.api.base_url.is_none());
        assert!(config.identity.is_none());
        assert!(config.participants.is_empty());
    }

    #[test]
    fn test_resolve_banned_identity_survives() {
        let toml_str = r#"
[identity]
id = "u9"
username = "spammer"
is_banned_from_posting = true
"#;
        let config: PuntConfig = toml::from_str(toml_str).unwrap();
        let resolved = resolve(&config, false);
        assert!(resolved.viewer.unwrap().is_banned_from_posting);
    }
}
