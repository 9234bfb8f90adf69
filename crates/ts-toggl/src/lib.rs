//! Toggl Reports API client for togglsheet.
//!
//! Fetches one day of detailed time entries and converts them into
//! [`ts_core::TimeEntry`] values for aggregation. Also lists the account's
//! workspaces so users can find their workspace ID.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use ts_core::{SheetDate, TimeEntry};

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DETAILS_URL: &str = "https://api.track.toggl.com/reports/api/v2/details";
const WORKSPACES_URL: &str = "https://api.track.toggl.com/api/v9/workspaces";

/// Toggl client errors.
#[derive(Debug, Error)]
pub enum TogglError {
    /// The provided API key was invalid.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The API answered with its error envelope (bad credentials and the
    /// like), as opposed to a day with no entries.
    #[error("{message}")]
    Api { message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Toggl API client.
///
/// Constructed once per process with the account credentials and passed into
/// whatever drives the aggregation; it holds no other state. Safe to clone;
/// clones share the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    user_agent: String,
    workspace_id: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"[REDACTED]")
            .field("user_agent", &self.user_agent)
            .field("workspace_id", &self.workspace_id)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client for the given account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or whitespace-only, or if
    /// the HTTP client fails to build.
    pub fn new(
        api_key: impl Into<String>,
        user_agent: impl Into<String>,
        workspace_id: impl Into<String>,
    ) -> Result<Self, TogglError> {
        let api_key = api_key.into();

        if api_key.is_empty() {
            return Err(TogglError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }
        if api_key.trim().is_empty() {
            return Err(TogglError::InvalidApiKey {
                reason: "API key cannot be whitespace-only",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(TogglError::ClientBuild)?;

        Ok(Self {
            http,
            api_key,
            user_agent: user_agent.into(),
            workspace_id: workspace_id.into(),
        })
    }

    /// Fetches the detailed report for a single day.
    ///
    /// An empty day comes back as an empty vector; the caller decides whether
    /// that is an error. A credentials failure surfaces as
    /// [`TogglError::Api`] with the API's own message.
    pub async fn day_entries(&self, date: SheetDate) -> Result<Vec<TimeEntry>, TogglError> {
        let day = date.to_iso();
        let response = self
            .http
            .get(DETAILS_URL)
            .basic_auth(&self.api_key, Some("api_token"))
            .query(&[
                ("user_agent", self.user_agent.as_str()),
                ("workspace_id", self.workspace_id.as_str()),
                ("since", day.as_str()),
                ("until", day.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_error_envelope(&body).unwrap_or_else(|| TogglError::Api {
                message: format!("status {status}: {body}"),
            }));
        }
        // Some failures come back with a 200 and the envelope in the body.
        if let Some(err) = parse_error_envelope(&body) {
            return Err(err);
        }

        let report: DetailedReport = serde_json::from_str(&body)
            .map_err(|err| TogglError::InvalidResponse(err.to_string()))?;
        tracing::debug!(count = report.data.len(), %day, "fetched detailed report");
        Ok(report.data.into_iter().map(WireEntry::into_entry).collect())
    }

    /// Lists the workspaces visible to the account.
    pub async fn workspaces(&self) -> Result<Vec<Workspace>, TogglError> {
        let response = self
            .http
            .get(WORKSPACES_URL)
            .basic_auth(&self.api_key, Some("api_token"))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_error_envelope(&body).unwrap_or_else(|| TogglError::Api {
                message: format!("status {status}: {body}"),
            }));
        }

        serde_json::from_str(&body).map_err(|err| TogglError::InvalidResponse(err.to_string()))
    }
}

/// One workspace the account can report on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Workspace {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct DetailedReport {
    data: Vec<WireEntry>,
}

/// A detailed-report entry as the API sends it. Fields the aggregation does
/// not consume are ignored.
#[derive(Debug, Deserialize)]
struct WireEntry {
    project: Option<String>,
    #[serde(default)]
    client: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    description: String,
    dur: i64,
}

impl WireEntry {
    fn into_entry(self) -> TimeEntry {
        TimeEntry {
            project: self.project,
            client: self.client.unwrap_or_default(),
            tags: self.tags,
            description: self.description,
            duration_ms: self.dur,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn parse_error_envelope(body: &str) -> Option<TogglError> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| TogglError::Api {
            message: envelope.error.message,
        })
}
