//! HTTP-style boundary for driving the pipeline from a request payload.
//!
//! This is the contract a service wrapper (or function-as-a-service shim)
//! programs against: a JSON request carrying credentials and an ISO-8601
//! date, answered with a status code and a body that is either the row set
//! under a `"Data"` key or a human-readable error message.

use serde::{Deserialize, Serialize};
use serde_json::json;

use ts_core::{SheetDate, TimeEntry, TimesheetRow, aggregate_day};
use ts_toggl::{Client, TogglError};

/// Incoming request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetRequest {
    pub api_key: String,
    /// ISO-8601 (`YYYY-MM-DD`) date to aggregate.
    pub date: String,
    /// Account email, sent to the API as the user agent.
    pub email: String,
    pub workspace_id: String,
}

/// HTTP-style response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetResponse {
    pub status_code: u16,
    pub body: String,
}

/// Fetches and aggregates the requested day.
///
/// Every failure maps to a 400 whose body is the error's human message; the
/// typed aggregation failures and the API's own error envelope pass through
/// verbatim, anything else is wrapped as unexpected.
pub async fn handle(request: &SheetRequest) -> SheetResponse {
    let date = match SheetDate::parse_iso(&request.date) {
        Ok(date) => date,
        Err(err) => return failure(&err.to_string()),
    };
    let client = match Client::new(&request.api_key, &request.email, &request.workspace_id) {
        Ok(client) => client,
        Err(err) => return failure(&err.to_string()),
    };

    let fetched = client.day_entries(date).await;
    respond(date, fetched)
}

/// Turns a fetch outcome into the final response. Split from [`handle`] so
/// response shaping is testable without a network.
fn respond(date: SheetDate, fetched: Result<Vec<TimeEntry>, TogglError>) -> SheetResponse {
    let entries = match fetched {
        Ok(entries) => entries,
        Err(err @ (TogglError::Api { .. } | TogglError::InvalidApiKey { .. })) => {
            return failure(&err.to_string());
        }
        Err(err) => return failure(&format!("An unexpected error occurred: {err}")),
    };

    match aggregate_day(date, &entries) {
        Ok(sheet) => success(&sheet.rows),
        Err(err) => failure(&err.to_string()),
    }
}

fn success(rows: &[TimesheetRow]) -> SheetResponse {
    match serde_json::to_string(&json!({ "Data": rows })) {
        Ok(body) => SheetResponse {
            status_code: 200,
            body,
        },
        Err(err) => failure(&format!("An unexpected error occurred: {err}")),
    }
}

fn failure(message: &str) -> SheetResponse {
    SheetResponse {
        status_code: 400,
        body: message.to_string(),
    }
}
