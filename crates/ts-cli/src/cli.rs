//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Billable timesheet generator.
///
/// Fetches one day of tracked time from Toggl and collapses it into
/// half-hour-rounded billing rows ready to paste into a timesheet.
#[derive(Debug, Parser)]
#[command(name = "ts", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the timesheet for one day (today by default).
    Sheet {
        /// Day to fetch, in DD/MM/YY.
        #[arg(long, conflicts_with = "yesterday")]
        date: Option<String>,

        /// Use yesterday instead of today.
        #[arg(short, long)]
        yesterday: bool,

        /// Emit rows as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// List the workspaces visible to the configured account.
    Workspaces,
}
