//! Project/job billing code parsing and validation.
//!
//! A project string looks like `"P123/J045 - Widget upgrade"`: a
//! project-number/job-number pair, then an optional ` - ` and free text. The
//! pair is normalized into `PRO###-###` / `WIP###-###` billing codes and
//! validated against the accepted code shapes.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AggregateError;

/// Sentinel project name meaning "non-reportable": exempt from code parsing
/// and validation, billed with empty project/job numbers.
pub const NON_REPORTABLE: &str = "NR";

// Accepted shapes are anchored at the start only; trailing text is tolerated,
// matching how the upstream system compares codes.
static PROJECT_SHAPES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"^[A-Z]-\d[A-Z]{3}-\d{3}").expect("valid pattern"),
        Regex::new(r"^[A-Z]{3}\d{3}").expect("valid pattern"),
    ]
});

static JOB_SHAPES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"^[A-Z]{3}-\d{3}").expect("valid pattern"),
        Regex::new(r"^[A-Z]{3}\d{3}").expect("valid pattern"),
    ]
});

/// Validated billing codes parsed from one project string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCode {
    pub project_no: String,
    pub job_no: String,
}

impl ProjectCode {
    /// Parses, normalizes, and validates the code portion of a project
    /// string.
    ///
    /// The portion before the first `" - "` must contain a `/`-separated
    /// project-number/job-number pair. Candidates already in an accepted
    /// shape are kept verbatim; anything else is rebuilt as
    /// `PRO###-###`/`WIP###-###` from the pair's digits.
    pub fn parse(project: &str) -> Result<Self, AggregateError> {
        let wrong_format = || AggregateError::WrongProjectNameFormat {
            project: project.to_string(),
        };

        let code = project.split(" - ").next().unwrap_or_default();
        let mut halves = code.split('/');
        let proj_raw = halves.next().map(str::trim).filter(|s| !s.is_empty());
        let job_raw = halves.next().map(str::trim).filter(|s| !s.is_empty());
        let (Some(proj_raw), Some(job_raw)) = (proj_raw, job_raw) else {
            return Err(wrong_format());
        };

        // When a candidate's own digits cannot fill the ###-### form, the
        // combined project+job digits stand in for both codes.
        let pool = format!("{}{}", digits_of(proj_raw), digits_of(job_raw));

        let project_no =
            normalize(proj_raw, &pool, "PRO", &PROJECT_SHAPES).ok_or_else(wrong_format)?;
        let job_no = normalize(job_raw, &pool, "WIP", &JOB_SHAPES).ok_or_else(wrong_format)?;

        if !matches_any(&project_no, &PROJECT_SHAPES) || !matches_any(&job_no, &JOB_SHAPES) {
            return Err(wrong_format());
        }

        Ok(Self { project_no, job_no })
    }
}

fn digits_of(code: &str) -> String {
    code.chars().filter(char::is_ascii_digit).collect()
}

fn matches_any(code: &str, shapes: &[Regex; 2]) -> bool {
    shapes.iter().any(|shape| shape.is_match(code))
}

fn normalize(raw: &str, pool: &str, prefix: &str, shapes: &[Regex; 2]) -> Option<String> {
    if matches_any(raw, shapes) {
        return Some(raw.to_string());
    }
    let own = digits_of(raw);
    let digits = if own.len() >= 6 { own.as_str() } else { pool };
    if digits.len() < 6 {
        return None;
    }
    Some(format!("{prefix}{}-{}", &digits[..3], &digits[3..]))
}
