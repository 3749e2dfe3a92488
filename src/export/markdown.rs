use super::{fixed2, iso_timestamp};
use crate::format::format_duration;
use crate::summary::ProjectSummary;
use crate::task::Task;
use crate::units::{TimeUnit, TimeValue};
use chrono::{DateTime, Utc};
use std::fmt::Write;

pub fn export_to_markdown(
    tasks: &[Task],
    summary: &ProjectSummary,
    project_name: Option<&str>,
) -> String {
    export_to_markdown_at(tasks, summary, project_name, Utc::now())
}

/// Human readable report: heading, task table, totals, the total expected
/// duration in every unit and a generation timestamp.
pub fn export_to_markdown_at(
    tasks: &[Task],
    summary: &ProjectSummary,
    project_name: Option<&str>,
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    match project_name.filter(|name| !name.trim().is_empty()) {
        Some(name) => {
            let _ = writeln!(out, "# PERT Estimation Report: {}", escape_cell(name));
        }
        None => out.push_str("# PERT Estimation Report\n"),
    }
    out.push('\n');

    out.push_str("## Tasks\n\n");
    out.push_str(
        "| Task Name | Optimistic | Nominal | Pessimistic | Expected Duration (hours) | Standard Deviation (hours) |\n",
    );
    out.push_str("|---|---|---|---|---|---|\n");
    for (idx, task) in tasks.iter().enumerate() {
        let estimate = task.estimate();
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            escape_cell(&task.display_name(idx + 1)),
            point(&estimate.optimistic),
            point(&estimate.nominal),
            point(&estimate.pessimistic),
            fixed2(task.expected_duration()),
            fixed2(task.standard_deviation()),
        );
    }
    out.push('\n');

    out.push_str("## Project Summary\n\n");
    let _ = writeln!(
        out,
        "- **Total Expected Duration:** {} hours",
        fixed2(summary.total_expected_duration)
    );
    let _ = writeln!(
        out,
        "- **Total Standard Deviation:** {} hours",
        fixed2(summary.total_standard_deviation)
    );
    let _ = writeln!(
        out,
        "- **Total Variance:** {:.4} hours²",
        summary.total_variance
    );
    let _ = writeln!(out, "- **Number of Tasks:** {}", tasks.len());
    out.push('\n');

    out.push_str("## Converted Results\n\n");
    for unit in TimeUnit::ALL {
        let _ = writeln!(
            out,
            "- **{}:** {}",
            unit.label(),
            format_duration(summary.total_expected_duration, unit)
        );
    }
    out.push('\n');

    out.push_str("---\n\n");
    let _ = writeln!(out, "*Generated on {}*", iso_timestamp(generated_at));
    out
}

fn point(value: &TimeValue) -> String {
    format!("{} {}", fixed2(value.magnitude), value.unit)
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
