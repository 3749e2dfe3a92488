use super::{ExportError, ExportResult, fixed2};
use crate::summary::ProjectSummary;
use crate::task::{Task, flatten_control_chars};
use std::io::Write;

pub const CSV_HEADER: [&str; 9] = [
    "Task Name",
    "Optimistic Value",
    "Optimistic Unit",
    "Nominal Value",
    "Nominal Unit",
    "Pessimistic Value",
    "Pessimistic Unit",
    "Expected Duration (hours)",
    "Standard Deviation (hours)",
];

/// One quoted header row plus one quoted row per task, optionally preceded
/// by a `"Project: <name>"` line and a blank line.
pub fn export_to_csv(
    tasks: &[Task],
    _summary: &ProjectSummary,
    project_name: Option<&str>,
) -> ExportResult<String> {
    let mut buffer = Vec::new();
    if let Some(name) = project_name.filter(|name| !name.trim().is_empty()) {
        let name = flatten_control_chars(name.trim());
        writeln!(buffer, "\"Project: {}\"", name.replace('"', "\"\""))?;
        writeln!(buffer)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(buffer);
    writer.write_record(CSV_HEADER)?;
    for (idx, task) in tasks.iter().enumerate() {
        writer.write_record(task_row(task, idx + 1))?;
    }

    let buffer = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;
    String::from_utf8(buffer).map_err(|_| ExportError::Encoding)
}

fn task_row(task: &Task, position: usize) -> [String; 9] {
    let estimate = task.estimate();
    [
        task.display_name(position),
        fixed2(estimate.optimistic.magnitude),
        estimate.optimistic.unit.as_str().to_string(),
        fixed2(estimate.nominal.magnitude),
        estimate.nominal.unit.as_str().to_string(),
        fixed2(estimate.pessimistic.magnitude),
        estimate.pessimistic.unit.as_str().to_string(),
        fixed2(task.expected_duration()),
        fixed2(task.standard_deviation()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::TaskEstimate;
    use crate::summary::summarize;
    use crate::units::{TimeUnit, TimeValue};

    fn sample() -> Vec<Task> {
        vec![
            Task::create(
                Some("Design".into()),
                TaskEstimate::new(
                    TimeValue::hours(2.0),
                    TimeValue::hours(4.0),
                    TimeValue::hours(12.0),
                ),
                None,
            )
            .unwrap(),
            Task::create(
                None,
                TaskEstimate::new(
                    TimeValue::new(1.0, TimeUnit::Days),
                    TimeValue::new(2.0, TimeUnit::Days),
                    TimeValue::new(1.0, TimeUnit::Weeks),
                ),
                None,
            )
            .unwrap(),
        ]
    }

    #[test]
    fn writes_header_and_quoted_rows() {
        let tasks = sample();
        let csv = export_to_csv(&tasks, &summarize(&tasks), None).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "\"Task Name\",\"Optimistic Value\",\"Optimistic Unit\",\"Nominal Value\",\"Nominal Unit\",\"Pessimistic Value\",\"Pessimistic Unit\",\"Expected Duration (hours)\",\"Standard Deviation (hours)\""
        );
        assert_eq!(
            lines[1],
            "\"Design\",\"2.00\",\"hours\",\"4.00\",\"hours\",\"12.00\",\"hours\",\"5.00\",\"1.67\""
        );
        assert_eq!(
            lines[2],
            "\"Task 2\",\"1.00\",\"days\",\"2.00\",\"days\",\"1.00\",\"weeks\",\"18.67\",\"5.33\""
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn prefixes_project_line_when_named() {
        let tasks = sample();
        let csv = export_to_csv(&tasks, &summarize(&tasks), Some("Launch \"Q3\"")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "\"Project: Launch \"\"Q3\"\"\"");
        assert_eq!(lines[1], "");
        assert!(lines[2].starts_with("\"Task Name\""));
    }
}
