//! Renderers turning a task collection into CSV, JSON and Markdown text.
//!
//! Every renderer is a pure function of the tasks, their summary and an
//! optional project name. Variants ending in `_at` take the timestamp
//! explicitly so output can be reproduced.

use crate::summary::summarize;
use crate::task::Task;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod csv;
pub mod json;
pub mod markdown;

pub use self::csv::{CSV_HEADER, export_to_csv};
pub use self::json::{EXPORT_FORMAT_VERSION, ExportData, export_to_json, export_to_json_at};
pub use self::markdown::{export_to_markdown, export_to_markdown_at};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("exported text was not valid utf-8")]
    Encoding,
}

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Json,
    Markdown,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "markdown",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            other => Err(format!("unknown export format '{other}'")),
        }
    }
}

/// Renders `tasks` in `format`, computing the summary along the way.
pub fn export_tasks(
    format: ExportFormat,
    tasks: &[Task],
    project_name: Option<&str>,
) -> ExportResult<String> {
    let summary = summarize(tasks);
    match format {
        ExportFormat::Csv => export_to_csv(tasks, &summary, project_name),
        ExportFormat::Json => export_to_json(tasks, &summary, project_name),
        ExportFormat::Markdown => Ok(export_to_markdown(tasks, &summary, project_name)),
    }
}

pub(crate) fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn fixed2(value: f64) -> String {
    format!("{value:.2}")
}
