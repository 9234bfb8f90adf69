//! Typed failures for a day's aggregation.

use thiserror::Error;

/// Failures that abort a day's aggregation.
///
/// Every variant reflects bad input data rather than a transient fault, so
/// none of them are retryable by the engine. The first failure aborts the
/// whole day; partial row sets are never produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// An entry has no project assigned.
    #[error("One of your entries is missing a project. Please fix and try again.")]
    MissingProject,

    /// An entry's tag list is empty, so it has no charge type.
    #[error("Missing charge type tag for {description}. Please fix and try again.")]
    MissingChargeType { description: String },

    /// A project string does not follow the billing code grammar.
    #[error(
        "The project name \"{project}\" has not followed the correct formatting. Please fix and try again."
    )]
    WrongProjectNameFormat { project: String },

    /// The fetch succeeded but returned zero entries for the day.
    #[error("There is no timesheet data entered for this day.")]
    NoDayData,

    /// The supplied date string is not a valid calendar date.
    #[error("This date does not exist. Please check and try again.")]
    DateOutOfRange,
}
