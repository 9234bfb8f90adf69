//! Build and print one day's timesheet.

use anyhow::{Context, Result, bail};
use chrono::{Duration, Local};

use ts_core::{SheetDate, aggregate_day};

use crate::config::Config;
use crate::render;

pub fn run(config: &Config, date: Option<&str>, yesterday: bool, json: bool) -> Result<()> {
    if config.workspace_id.trim().is_empty() {
        bail!("missing workspace ID (run `ts workspaces` to find it, then set TS_WORKSPACE_ID)");
    }

    let date = resolve_date(date, yesterday)?;
    tracing::debug!(%date, "building timesheet");

    let client = super::build_client(config)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    let entries = runtime
        .block_on(client.day_entries(date))
        .context("failed to fetch time entries")?;

    let sheet = aggregate_day(date, &entries)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sheet.rows)?);
    } else {
        print!("{}", render::table(&sheet));
    }
    Ok(())
}

/// An explicit `--date` wins; otherwise today, or yesterday with `-y`.
fn resolve_date(date: Option<&str>, yesterday: bool) -> Result<SheetDate> {
    match date {
        Some(raw) => Ok(SheetDate::parse(raw)?),
        None => {
            let today = Local::now().date_naive();
            let day = if yesterday {
                today - Duration::days(1)
            } else {
                today
            };
            Ok(SheetDate::from_naive(day))
        }
    }
}
