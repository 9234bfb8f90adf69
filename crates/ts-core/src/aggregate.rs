//! Grouping, rounding, and reconciliation for one day of entries.
//!
//! # Algorithm Summary
//!
//! 1. Validate every entry carries a charge-type tag
//! 2. Collapse entries into one billing group per (project, charge-type)
//!    pair, merging duplicate descriptions and resolving the client name
//! 3. Round each group to the nearest half hour, then reconcile the rows
//!    against the independently rounded day total in half-hour steps
//! 4. Drop zero-hour groups and emit rows sorted by project number

use serde::Serialize;

use crate::date::SheetDate;
use crate::entry::TimeEntry;
use crate::error::AggregateError;
use crate::project_code::{NON_REPORTABLE, ProjectCode};
use crate::rounding::HalfHours;

/// One billing row of the finished timesheet.
///
/// Serializes with the spreadsheet's column headers as field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimesheetRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Branch")]
    pub branch: String,
    #[serde(rename = "Charge Type")]
    pub charge_type: String,
    #[serde(rename = "Project No")]
    pub project_no: String,
    #[serde(rename = "Job No")]
    pub job_no: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Hours")]
    pub hours: String,
}

/// A finished day: ordered billing rows plus the day total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySheet {
    /// Billing rows sorted by project number descending.
    pub rows: Vec<TimesheetRow>,

    /// Half-hour-rounded total of the day's raw tracked time. The rows'
    /// hours sum to this whenever reconciliation can absorb the rounding
    /// discrepancy.
    pub total: HalfHours,
}

/// Per-(project, charge-type) aggregate.
struct BillingGroup {
    project: String,
    charge_type: String,
    project_no: String,
    job_no: String,
    client: String,
    /// Distinct descriptions in first-seen order, with duration summed over
    /// repeats.
    descriptions: Vec<(String, i64)>,
    raw_ms: i64,
    rounded: HalfHours,
}

impl BillingGroup {
    fn is_non_reportable(&self) -> bool {
        self.project == NON_REPORTABLE
    }
}

/// Aggregates one day of entries into billable timesheet rows.
///
/// The entry slice is consumed as fetched, in order; running twice on the
/// same slice produces identical output. Any validation failure aborts the
/// whole day.
pub fn aggregate_day(date: SheetDate, entries: &[TimeEntry]) -> Result<DaySheet, AggregateError> {
    if entries.is_empty() {
        return Err(AggregateError::NoDayData);
    }

    // Tag presence is checked across all entries before any project
    // validation, so a day with both defects reports the missing tag.
    for entry in entries {
        if entry.tags.is_empty() {
            return Err(AggregateError::MissingChargeType {
                description: entry.description.clone(),
            });
        }
    }

    let mut groups = collect_groups(entries)?;

    let total_ms: i64 = groups.iter().map(|g| g.raw_ms).sum();
    let total = HalfHours::from_ms_nearest(total_ms);

    reconcile(&mut groups, total);

    // Zero-hour groups counted toward the total above but do not bill.
    let surviving: Vec<BillingGroup> = groups
        .into_iter()
        .filter(|g| !g.rounded.is_zero())
        .collect();

    let mut rows: Vec<TimesheetRow> = surviving
        .iter()
        .map(|group| TimesheetRow {
            date: date.to_string(),
            branch: String::new(),
            charge_type: group.charge_type.clone(),
            project_no: group.project_no.clone(),
            job_no: group.job_no.clone(),
            description: compose_description(group),
            hours: group.rounded.to_string(),
        })
        .collect();
    rows.sort_by(|a, b| b.project_no.cmp(&a.project_no));

    tracing::debug!(
        entries = entries.len(),
        rows = rows.len(),
        total = %total,
        "aggregated day"
    );

    Ok(DaySheet { rows, total })
}

/// Collapses entries into billing groups in first-seen order.
fn collect_groups(entries: &[TimeEntry]) -> Result<Vec<BillingGroup>, AggregateError> {
    // (project, charge-type, descriptions, raw_ms); project stays unresolved
    // here so a missing project is reported in group order, like the tag scan.
    let mut raw: Vec<(Option<String>, String, Vec<(String, i64)>, i64)> = Vec::new();

    for entry in entries {
        let Some(charge_type) = entry.charge_type() else {
            continue;
        };
        let idx = raw
            .iter()
            .position(|(project, tag, _, _)| *project == entry.project && tag == charge_type)
            .unwrap_or_else(|| {
                raw.push((entry.project.clone(), charge_type.to_string(), Vec::new(), 0));
                raw.len() - 1
            });
        let group = &mut raw[idx];

        group.3 += entry.duration_ms;
        if let Some((_, ms)) = group
            .2
            .iter_mut()
            .find(|(text, _)| *text == entry.description)
        {
            *ms += entry.duration_ms;
        } else {
            group.2.push((entry.description.clone(), entry.duration_ms));
        }
    }

    let mut groups = Vec::with_capacity(raw.len());
    for (project, charge_type, descriptions, raw_ms) in raw {
        let Some(project) = project else {
            return Err(AggregateError::MissingProject);
        };

        let (project_no, job_no) = if project == NON_REPORTABLE {
            (String::new(), String::new())
        } else {
            let code = ProjectCode::parse(&project)?;
            (code.project_no, code.job_no)
        };

        let rounded = HalfHours::from_ms_nearest(raw_ms);
        groups.push(BillingGroup {
            client: resolve_client(entries, &project),
            project,
            charge_type,
            project_no,
            job_no,
            descriptions,
            raw_ms,
            rounded,
        });
    }

    Ok(groups)
}

/// First non-empty client seen for the project wins; later values never
/// overwrite it, so minor API ordering jitter cannot flip the name.
fn resolve_client(entries: &[TimeEntry], project: &str) -> String {
    entries
        .iter()
        .filter(|entry| entry.project.as_deref() == Some(project))
        .map(|entry| entry.client.as_str())
        .find(|client| !client.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Builds the group's composite description.
///
/// The first description is bare; later ones carry their own rounded time in
/// parentheses. Descriptions rounding to zero keep their time in the group
/// total but are left out of the text. Non-NR groups are prefixed with the
/// client name.
fn compose_description(group: &BillingGroup) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (idx, (text, ms)) in group.descriptions.iter().enumerate() {
        let rounded = HalfHours::from_ms_nearest(*ms);
        if rounded.is_zero() {
            continue;
        }
        if idx == 0 {
            parts.push(text.clone());
        } else {
            parts.push(format!("{text} ({rounded}hr)"));
        }
    }

    let joined = parts.join(", ");
    if group.is_non_reportable() {
        joined
    } else {
        format!("({}) {joined}", group.client)
    }
}

/// Nudges group hours in half-hour steps until the rows sum to the
/// independently rounded day total.
///
/// Largest groups absorb adjustments first, where the same absolute nudge
/// distorts the least. A group only takes part while it holds at least half
/// an hour, and a subtraction must leave at least half an hour behind, so
/// reconciliation can neither create rows nor erase them.
fn reconcile(groups: &mut [BillingGroup], nearest_total: HalfHours) {
    let rounded_total: HalfHours = groups.iter().map(|g| g.rounded).sum();
    let mut steps = nearest_total.units() - rounded_total.units();
    if steps == 0 {
        return;
    }
    let direction = steps.signum();

    loop {
        let mut order: Vec<usize> = (0..groups.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(groups[i].rounded));

        let mut adjusted = false;
        for &i in &order {
            if steps == 0 {
                break;
            }
            let units = groups[i].rounded.units();
            let eligible = if direction > 0 { units >= 1 } else { units >= 2 };
            if !eligible {
                continue;
            }
            groups[i].rounded = HalfHours::from_units(units + direction);
            steps -= direction;
            adjusted = true;
        }

        if steps == 0 || !adjusted {
            break;
        }
    }

    if steps != 0 {
        // Only reachable when every group sits at the 0.5h floor and the
        // total still needs to shrink.
        tracing::warn!(
            residual_half_hours = steps,
            "rounding discrepancy not fully absorbed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(
        project: Option<&str>,
        client: &str,
        tags: &[&str],
        description: &str,
        duration_ms: i64,
    ) -> TimeEntry {
        TimeEntry {
            project: project.map(String::from),
            client: client.to_string(),
            tags: tags.iter().map(ToString::to_string).collect(),
            description: description.to_string(),
            duration_ms,
        }
    }

    fn day() -> SheetDate {
        SheetDate::parse("15/01/25").expect("valid test date")
    }

    fn hours_sum(sheet: &DaySheet) -> HalfHours {
        sheet
            .rows
            .iter()
            .map(|row| {
                let (whole, frac) = row.hours.split_once('.').expect("decimal hours");
                let whole: i64 = whole.parse().expect("numeric hours");
                HalfHours::from_units(whole * 2 + i64::from(frac == "5"))
            })
            .sum()
    }

    #[test]
    fn empty_day_is_rejected() {
        assert_eq!(aggregate_day(day(), &[]), Err(AggregateError::NoDayData));
    }

    #[test]
    fn missing_project_aborts_the_day() {
        let entries = vec![entry(None, "Acme", &["TYPE1"], "Mystery work", 3_600_000)];
        assert_eq!(
            aggregate_day(day(), &entries),
            Err(AggregateError::MissingProject)
        );
    }

    #[test]
    fn missing_tag_aborts_the_day_and_names_the_entry() {
        let entries = vec![entry(
            Some("P123/J045 - Widget"),
            "Acme",
            &[],
            "Untagged work",
            3_600_000,
        )];
        assert_eq!(
            aggregate_day(day(), &entries),
            Err(AggregateError::MissingChargeType {
                description: "Untagged work".to_string()
            })
        );
    }

    #[test]
    fn missing_tag_wins_over_missing_project() {
        // The tag scan covers all entries before any project check runs.
        let entries = vec![
            entry(None, "Acme", &["TYPE1"], "No project", 3_600_000),
            entry(Some("NR"), "", &[], "No tag", 1_800_000),
        ];
        assert_eq!(
            aggregate_day(day(), &entries),
            Err(AggregateError::MissingChargeType {
                description: "No tag".to_string()
            })
        );
    }

    #[test]
    fn tag_is_required_even_for_non_reportable() {
        let entries = vec![entry(Some("NR"), "", &[], "Admin", 3_600_000)];
        assert!(matches!(
            aggregate_day(day(), &entries),
            Err(AggregateError::MissingChargeType { .. })
        ));
    }

    #[test]
    fn bad_project_format_aborts_the_day() {
        let entries = vec![
            entry(Some("P123/J045 - Fine"), "Acme", &["TYPE1"], "Ok", 3_600_000),
            entry(Some("BadFormat"), "Acme", &["TYPE1"], "Broken", 3_600_000),
        ];
        assert_eq!(
            aggregate_day(day(), &entries),
            Err(AggregateError::WrongProjectNameFormat {
                project: "BadFormat".to_string()
            })
        );
    }

    #[test]
    fn single_entry_becomes_one_row() {
        let entries = vec![entry(
            Some("P123/J045 - Widget"),
            "Acme",
            &["TYPE1"],
            "Widget work",
            12_600_000,
        )];
        let sheet = aggregate_day(day(), &entries).unwrap();

        assert_eq!(sheet.rows.len(), 1);
        let row = &sheet.rows[0];
        assert_eq!(row.date, "15/01/25");
        assert_eq!(row.branch, "");
        assert_eq!(row.charge_type, "TYPE1");
        assert_eq!(row.project_no, "PRO123-045");
        assert_eq!(row.job_no, "WIP123-045");
        assert_eq!(row.description, "(Acme) Widget work");
        assert_eq!(row.hours, "3.5");
        assert_eq!(sheet.total, HalfHours::from_units(7));
    }

    #[test]
    fn same_group_durations_round_together() {
        // 0.5h + 0.25h bills as a single 1.0h row: the group's 0.75h ties to
        // the even unit count, and the day total rounds identically.
        let entries = vec![
            entry(
                Some("P123/J045 - Widget"),
                "Acme",
                &["TYPE1"],
                "Main task",
                1_800_000,
            ),
            entry(
                Some("P123/J045 - Widget"),
                "Acme",
                &["TYPE1"],
                "Side task",
                900_000,
            ),
        ];
        let sheet = aggregate_day(day(), &entries).unwrap();

        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].hours, "1.0");
        assert_eq!(sheet.total, HalfHours::from_units(2));
        // The 15-minute side task rounds to zero on its own, so it does not
        // appear in the text.
        assert_eq!(sheet.rows[0].description, "(Acme) Main task");
    }

    #[test]
    fn non_reportable_skips_codes_and_client_prefix() {
        let entries = vec![entry(Some("NR"), "Acme", &["ADMIN"], "Timesheets", 3_600_000)];
        let sheet = aggregate_day(day(), &entries).unwrap();

        assert_eq!(sheet.rows.len(), 1);
        let row = &sheet.rows[0];
        assert_eq!(row.project_no, "");
        assert_eq!(row.job_no, "");
        assert_eq!(row.charge_type, "ADMIN");
        assert_eq!(row.description, "Timesheets");
        assert_eq!(row.hours, "1.0");
    }

    #[test]
    fn consistent_rounding_needs_no_reconciliation() {
        // 1.1h, 1.4h, 0.3h round to 1.0 + 1.5 + 0.5 = 3.0, and the true total
        // (2.8h) independently rounds to 3.0 as well.
        let entries = vec![
            entry(Some("P111/J001 - A"), "Acme", &["TYPE1"], "A", 3_960_000),
            entry(Some("P222/J002 - B"), "Acme", &["TYPE1"], "B", 5_040_000),
            entry(Some("P333/J003 - C"), "Acme", &["TYPE1"], "C", 1_080_000),
        ];
        let sheet = aggregate_day(day(), &entries).unwrap();

        assert_eq!(sheet.total, HalfHours::from_units(6));
        assert_eq!(hours_sum(&sheet), sheet.total);
        let hours: Vec<&str> = sheet.rows.iter().map(|r| r.hours.as_str()).collect();
        assert_eq!(hours, vec!["0.5", "1.5", "1.0"]);
    }

    #[test]
    fn undershoot_adds_to_the_largest_group_first() {
        // Two groups of 0.7h each round down to 0.5 + 0.5 = 1.0, but the true
        // total 1.4h rounds to 1.5. The extra half hour lands on the
        // first-seen of the tied groups.
        let entries = vec![
            entry(Some("P111/J001 - A"), "Acme", &["TYPE1"], "A", 2_520_000),
            entry(Some("P222/J002 - B"), "Acme", &["TYPE1"], "B", 2_520_000),
        ];
        let sheet = aggregate_day(day(), &entries).unwrap();

        assert_eq!(sheet.total, HalfHours::from_units(3));
        assert_eq!(hours_sum(&sheet), sheet.total);
        // Rows sort by project number descending, so P222 comes first.
        assert_eq!(sheet.rows[0].project_no, "PRO222-002");
        assert_eq!(sheet.rows[0].hours, "0.5");
        assert_eq!(sheet.rows[1].project_no, "PRO111-001");
        assert_eq!(sheet.rows[1].hours, "1.0");
    }

    #[test]
    fn overshoot_subtracts_from_the_largest_group() {
        // Three groups of 0.8h round up to 1.0 each (3.0 total), but the true
        // total 2.4h rounds to 2.5.
        let entries = vec![
            entry(Some("P111/J001 - A"), "Acme", &["TYPE1"], "A", 2_880_000),
            entry(Some("P222/J002 - B"), "Acme", &["TYPE1"], "B", 2_880_000),
            entry(Some("P333/J003 - C"), "Acme", &["TYPE1"], "C", 2_880_000),
        ];
        let sheet = aggregate_day(day(), &entries).unwrap();

        assert_eq!(sheet.total, HalfHours::from_units(5));
        assert_eq!(hours_sum(&sheet), sheet.total);
        let mut hours: Vec<&str> = sheet.rows.iter().map(|r| r.hours.as_str()).collect();
        hours.sort_unstable();
        assert_eq!(hours, vec!["0.5", "1.0", "1.0"]);
    }

    #[test]
    fn subtraction_never_empties_a_row() {
        // Three groups of 0.3h round to 0.5 each (1.5 total) while the true
        // total 0.9h rounds to 1.0. No group may drop below half an hour, so
        // the discrepancy stays unabsorbed rather than erasing a row.
        let entries = vec![
            entry(Some("P111/J001 - A"), "Acme", &["TYPE1"], "A", 1_080_000),
            entry(Some("P222/J002 - B"), "Acme", &["TYPE1"], "B", 1_080_000),
            entry(Some("P333/J003 - C"), "Acme", &["TYPE1"], "C", 1_080_000),
        ];
        let sheet = aggregate_day(day(), &entries).unwrap();

        assert_eq!(sheet.total, HalfHours::from_units(2));
        assert_eq!(sheet.rows.len(), 3);
        assert!(sheet.rows.iter().all(|row| row.hours == "0.5"));
    }

    #[test]
    fn zero_hour_groups_are_dropped_but_counted() {
        // Six minutes rounds to zero and produces no row, but its time still
        // feeds the day total.
        let entries = vec![
            entry(Some("P111/J001 - A"), "Acme", &["TYPE1"], "Real work", 3_600_000),
            entry(Some("P222/J002 - B"), "Acme", &["TYPE1"], "Blip", 360_000),
        ];
        let sheet = aggregate_day(day(), &entries).unwrap();

        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].project_no, "PRO111-001");
        assert!(sheet.rows.iter().all(|row| row.hours != "0.0"));
        assert_eq!(sheet.total, HalfHours::from_units(2));
    }

    #[test]
    fn projects_split_by_tag_become_separate_rows() {
        let entries = vec![
            entry(
                Some("P123/J045 - Widget"),
                "Acme",
                &["TYPE1"],
                "Design",
                3_600_000,
            ),
            entry(
                Some("P123/J045 - Widget"),
                "Acme",
                &["TYPE2"],
                "Review",
                1_800_000,
            ),
        ];
        let sheet = aggregate_day(day(), &entries).unwrap();

        assert_eq!(sheet.rows.len(), 2);
        let tags: Vec<&str> = sheet.rows.iter().map(|r| r.charge_type.as_str()).collect();
        assert!(tags.contains(&"TYPE1") && tags.contains(&"TYPE2"));
    }

    #[test]
    fn later_descriptions_carry_their_own_time() {
        let entries = vec![
            entry(
                Some("P123/J045 - Widget"),
                "Acme",
                &["TYPE1"],
                "Drafting",
                3_600_000,
            ),
            entry(
                Some("P123/J045 - Widget"),
                "Acme",
                &["TYPE1"],
                "Site visit",
                5_400_000,
            ),
        ];
        let sheet = aggregate_day(day(), &entries).unwrap();

        assert_eq!(
            sheet.rows[0].description,
            "(Acme) Drafting, Site visit (1.5hr)"
        );
    }

    #[test]
    fn repeated_descriptions_merge_their_time() {
        let entries = vec![
            entry(
                Some("P123/J045 - Widget"),
                "Acme",
                &["TYPE1"],
                "Drafting",
                1_800_000,
            ),
            entry(
                Some("P123/J045 - Widget"),
                "Acme",
                &["TYPE1"],
                "Calls",
                1_800_000,
            ),
            entry(
                Some("P123/J045 - Widget"),
                "Acme",
                &["TYPE1"],
                "Drafting",
                1_800_000,
            ),
        ];
        let sheet = aggregate_day(day(), &entries).unwrap();

        // "Drafting" appears once; its second hit only adds time.
        assert_eq!(
            sheet.rows[0].description,
            "(Acme) Drafting, Calls (0.5hr)"
        );
        assert_eq!(sheet.rows[0].hours, "1.5");
    }

    #[test]
    fn first_non_empty_client_wins() {
        let entries = vec![
            entry(Some("P123/J045 - Widget"), "", &["TYPE1"], "Early", 1_800_000),
            entry(
                Some("P123/J045 - Widget"),
                "Acme",
                &["TYPE1"],
                "Middle",
                1_800_000,
            ),
            entry(
                Some("P123/J045 - Widget"),
                "Other",
                &["TYPE1"],
                "Late",
                1_800_000,
            ),
        ];
        let sheet = aggregate_day(day(), &entries).unwrap();

        assert!(sheet.rows[0].description.starts_with("(Acme) "));
    }

    #[test]
    fn rows_sort_by_project_number_descending() {
        let entries = vec![
            entry(Some("P111/J001 - A"), "Acme", &["TYPE1"], "A", 3_600_000),
            entry(Some("NR"), "", &["ADMIN"], "Admin", 3_600_000),
            entry(Some("P999/J009 - B"), "Acme", &["TYPE1"], "B", 3_600_000),
        ];
        let sheet = aggregate_day(day(), &entries).unwrap();

        let projects: Vec<&str> = sheet.rows.iter().map(|r| r.project_no.as_str()).collect();
        assert_eq!(projects, vec!["PRO999-009", "PRO111-001", ""]);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let entries = vec![
            entry(Some("P111/J001 - A"), "Acme", &["TYPE1"], "A", 2_520_000),
            entry(Some("P222/J002 - B"), "Beta", &["TYPE2"], "B", 2_520_000),
            entry(Some("NR"), "", &["ADMIN"], "Admin", 900_000),
        ];
        let first = aggregate_day(day(), &entries).unwrap();
        let second = aggregate_day(day(), &entries).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rows_serialize_with_spreadsheet_headers() {
        let entries = vec![entry(
            Some("P123/J045 - Widget"),
            "Acme",
            &["TYPE1"],
            "Widget work",
            12_600_000,
        )];
        let sheet = aggregate_day(day(), &entries).unwrap();
        let json = serde_json::to_value(&sheet.rows).unwrap();

        assert_eq!(json[0]["Date"], "15/01/25");
        assert_eq!(json[0]["Charge Type"], "TYPE1");
        assert_eq!(json[0]["Project No"], "PRO123-045");
        assert_eq!(json[0]["Job No"], "WIP123-045");
        assert_eq!(json[0]["Hours"], "3.5");
    }
}
