//! Sheet dates in the timesheet's `DD/MM/YY` convention.

use std::fmt;

use chrono::NaiveDate;

use crate::error::AggregateError;

/// A calendar date carried in the timesheet's `DD/MM/YY` convention.
///
/// The upstream API wants ISO-8601 dates, so the same value can be rendered
/// both ways; aggregation and row output always use `DD/MM/YY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SheetDate(NaiveDate);

impl SheetDate {
    /// Parses a `DD/MM/YY` date string.
    pub fn parse(input: &str) -> Result<Self, AggregateError> {
        NaiveDate::parse_from_str(input.trim(), "%d/%m/%y")
            .map(Self)
            .map_err(|_| AggregateError::DateOutOfRange)
    }

    /// Parses an ISO-8601 (`YYYY-MM-DD`) date string.
    pub fn parse_iso(input: &str) -> Result<Self, AggregateError> {
        NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| AggregateError::DateOutOfRange)
    }

    pub const fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Renders the date in the `YYYY-MM-DD` form the API expects.
    pub fn to_iso(self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for SheetDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%d/%m/%y"))
    }
}
