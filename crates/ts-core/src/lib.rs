//! Core aggregation engine for togglsheet.
//!
//! This crate turns a flat list of tracked time entries for one day into a
//! small set of billable timesheet rows:
//! - Code parsing: validating and normalizing project/job billing codes
//! - Grouping: one billing row per (project, charge-type) pair, with
//!   descriptions merged into a composite string
//! - Rounding: half-hour billing units, reconciled so the rows sum to the
//!   independently rounded day total
//!
//! The engine is pure and synchronous. It holds no state across calls, so a
//! batch job can aggregate many dates on separate workers without
//! coordination.

mod aggregate;
mod date;
mod entry;
mod error;
mod project_code;
mod rounding;

pub use aggregate::{DaySheet, TimesheetRow, aggregate_day};
pub use date::SheetDate;
pub use entry::TimeEntry;
pub use error::AggregateError;
pub use project_code::{NON_REPORTABLE, ProjectCode};
pub use rounding::HalfHours;
