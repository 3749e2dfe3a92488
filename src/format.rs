use crate::export::ExportFormat;
use crate::units::{TimeUnit, from_hours};
use chrono::NaiveDate;

const DEFAULT_FILE_STEM: &str = "pert_tasks";

/// Renders `hours` in `unit` with two decimals, e.g. `"1.50 days"`.
pub fn format_duration(hours: f64, unit: TimeUnit) -> String {
    format!("{:.2} {}", from_hours(hours, unit), unit.as_str())
}

/// Lowercases `name` and replaces every character outside `[a-z0-9]` with `_`.
pub fn sanitize_file_stem(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<sanitized-name-or-pert_tasks>_<YYYY-MM-DD>.<ext>`
pub fn export_filename(project_name: Option<&str>, date: NaiveDate, format: ExportFormat) -> String {
    let stem = project_name
        .filter(|name| !name.trim().is_empty())
        .map(sanitize_file_stem)
        .unwrap_or_else(|| DEFAULT_FILE_STEM.to_string());
    format!(
        "{}_{}.{}",
        stem,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}
