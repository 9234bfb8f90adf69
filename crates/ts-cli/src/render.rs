//! Human-readable table output.

use std::fmt::Write;

use ts_core::DaySheet;

/// Formats the day's rows as a fixed-width table with a trailing total line.
pub fn table(sheet: &DaySheet) -> String {
    let mut output = String::new();

    writeln!(output).unwrap();
    writeln!(
        output,
        "{:<12} {:<12} {:<15} {:<14} {:<14} {:<70} {:<10}",
        "Date", "Branch", "Charge Type", "Project No", "Job No", "Description", "Hours"
    )
    .unwrap();

    for row in &sheet.rows {
        writeln!(
            output,
            "{:<12} {:<12} {:<15} {:<14} {:<14} {:<70} {:<10}",
            row.date,
            row.branch,
            row.charge_type,
            row.project_no,
            row.job_no,
            row.description,
            row.hours
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "{} hrs total.", sheet.total).unwrap();

    output
}
