//! Raw time entries as fetched for one day.

/// One tracked interval from the time-tracking API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntry {
    /// Project name as entered upstream. `None` means the entry was saved
    /// without a project, which is a data-entry error.
    pub project: Option<String>,

    /// Client name, possibly empty.
    pub client: String,

    /// Tags in entry order; the first one is the authoritative charge type.
    pub tags: Vec<String>,

    /// Free-text description of the work.
    pub description: String,

    /// Tracked duration in milliseconds.
    pub duration_ms: i64,
}

impl TimeEntry {
    /// Returns the entry's charge type, if any tag is present.
    pub fn charge_type(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }
}
