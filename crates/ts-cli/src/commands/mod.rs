//! CLI command implementations.

use anyhow::{Context, Result, bail};

use crate::config::Config;

pub mod sheet;
pub mod workspaces;

/// Builds an API client from the loaded configuration.
fn build_client(config: &Config) -> Result<ts_toggl::Client> {
    if config.api_key.trim().is_empty() {
        bail!("missing Toggl API key (set TS_API_KEY or api_key in config.toml)");
    }
    if config.user_agent.trim().is_empty() {
        bail!("missing account email (set TS_USER_AGENT or user_agent in config.toml)");
    }

    ts_toggl::Client::new(&config.api_key, &config.user_agent, &config.workspace_id)
        .context("failed to create API client")
}
