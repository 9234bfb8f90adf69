//! Configuration loading and management.
//!
//! Credentials live in `config.toml` or `TS_*` environment variables — a
//! fixed set of named fields parsed by figment. There is no interactive
//! setup and no code ever evaluates configuration text.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Toggl API token.
    #[serde(default)]
    pub api_key: String,

    /// Email address sent to the API as the user agent.
    #[serde(default)]
    pub user_agent: String,

    /// Numeric ID of the workspace to report on.
    #[serde(default)]
    pub workspace_id: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("user_agent", &self.user_agent)
            .field("workspace_id", &self.workspace_id)
            .finish()
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TS_*)
        figment = figment.merge(Env::prefixed("TS_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for togglsheet.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("togglsheet"))
}
