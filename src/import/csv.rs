use super::{ImportError, ImportResult, strip_bom};
use crate::estimate::{EstimateValidationError, TaskEstimate};
use crate::pert::PertError;
use crate::task::Task;
use crate::units::{TimeUnit, TimeValue};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

const EXPECTED_COLUMNS: usize = 9;
const HEADER_MARKER: &str = "Task Name";
const PROJECT_PREFIX: &str = "Project: ";

/// A field is either a double-quoted run (with `""` escapes) or a run of
/// characters that are neither commas nor whitespace.
static FIELD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(?:[^"]|"")*"|[^,\s]+"#).expect("field pattern compiles"));

#[derive(Debug, Error)]
enum RowError {
    #[error("insufficient columns (expected 9, found {found})")]
    InsufficientColumns { found: usize },
    #[error("invalid numeric value '{value}' for {point} estimate")]
    InvalidNumber { point: &'static str, value: String },
    #[error("invalid time unit '{value}' for {point} estimate")]
    InvalidUnit { point: &'static str, value: String },
    #[error("invalid estimates: {0} (must satisfy 0 < optimistic <= nominal <= pessimistic)")]
    InvalidEstimates(EstimateValidationError),
}

/// Imports tasks from the CSV layout written by
/// [`export_to_csv`](crate::export::export_to_csv).
///
/// An optional `"Project: <name>"` line (plus the blank line after it) is
/// read as the project name. Parsing resumes after the first line containing
/// `Task Name`; when no such header exists every following line is treated as
/// data. Errors name the 1-based line number in the original input.
pub fn import_from_csv(input: &str) -> ImportResult {
    let lines: Vec<&str> = strip_bom(input).lines().collect();
    if lines.iter().filter(|line| !line.trim().is_empty()).count() < 2 {
        return ImportResult::failed(ImportError::NoData);
    }

    let mut offset = 0;
    let mut project_name = None;
    if let Some(name) = parse_project_line(lines[0]) {
        project_name = Some(name).filter(|name| !name.is_empty());
        offset = 1;
        if lines.get(1).is_some_and(|line| line.trim().is_empty()) {
            offset = 2;
        }
    }

    let data_start = match lines[offset..]
        .iter()
        .position(|line| line.contains(HEADER_MARKER))
    {
        Some(pos) => offset + pos + 1,
        None => {
            tracing::warn!("no '{HEADER_MARKER}' header found, reading every line as data");
            offset
        }
    };

    let mut tasks = Vec::new();
    let mut errors = Vec::new();
    for (idx, line) in lines.iter().enumerate().skip(data_start) {
        if line.trim().is_empty() {
            continue;
        }
        let row_number = idx + 1;
        match parse_row(line) {
            Ok(task) => tasks.push(task),
            Err(err) => {
                tracing::debug!(row = row_number, error = %err, "skipping csv row");
                errors.push(format!("Row {row_number}: {err}"));
            }
        }
    }

    ImportResult::from_parts(project_name, tasks, errors)
}

fn parse_project_line(line: &str) -> Option<String> {
    let field = unquote(line.trim());
    field
        .strip_prefix(PROJECT_PREFIX)
        .map(|name| name.trim().to_string())
}

fn tokenize(line: &str) -> Vec<String> {
    FIELD_PATTERN
        .find_iter(line)
        .map(|field| unquote(field.as_str()))
        .collect()
}

fn unquote(field: &str) -> String {
    let inner = field
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .map(|rest| rest.replace("\"\"", "\""))
        .unwrap_or_else(|| field.to_string());
    inner.trim().to_string()
}

fn parse_row(line: &str) -> Result<Task, RowError> {
    let fields = tokenize(line);
    if fields.len() < EXPECTED_COLUMNS {
        return Err(RowError::InsufficientColumns {
            found: fields.len(),
        });
    }

    let optimistic = parse_magnitude("optimistic", &fields[1])?;
    let nominal = parse_magnitude("nominal", &fields[3])?;
    let pessimistic = parse_magnitude("pessimistic", &fields[5])?;

    let optimistic_unit = parse_unit("optimistic", &fields[2])?;
    let nominal_unit = parse_unit("nominal", &fields[4])?;
    let pessimistic_unit = parse_unit("pessimistic", &fields[6])?;

    let estimate = TaskEstimate::new(
        TimeValue::new(optimistic, optimistic_unit),
        TimeValue::new(nominal, nominal_unit),
        TimeValue::new(pessimistic, pessimistic_unit),
    );
    let name = Some(fields[0].clone());
    match Task::create(name, estimate, None) {
        Ok(task) => Ok(task),
        Err(PertError::InvalidEstimate(err)) => Err(RowError::InvalidEstimates(err)),
    }
}

fn parse_magnitude(point: &'static str, raw: &str) -> Result<f64, RowError> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| RowError::InvalidNumber {
            point,
            value: raw.to_string(),
        })
}

fn parse_unit(point: &'static str, raw: &str) -> Result<TimeUnit, RowError> {
    raw.parse::<TimeUnit>().map_err(|_| RowError::InvalidUnit {
        point,
        value: raw.to_string(),
    })
}
