//! List the workspaces visible to the configured account.

use anyhow::{Context, Result};

use crate::config::Config;

pub fn run(config: &Config) -> Result<()> {
    let client = super::build_client(config)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let workspaces = runtime
        .block_on(client.workspaces())
        .context("failed to list workspaces")?;

    if workspaces.is_empty() {
        println!("No workspaces visible to this account.");
        return Ok(());
    }
    for workspace in workspaces {
        println!("{} ({})", workspace.id, workspace.name);
    }
    Ok(())
}
