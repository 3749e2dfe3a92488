//! Error accumulating importers for CSV and JSON task collections.
//!
//! Importers never fail as a whole: a bad row or item is dropped and
//! described in [`ImportResult::errors`], while the good ones are kept.
//! Only a handful of whole-input problems (no data, unparseable JSON, an
//! unrecognised top-level shape) short-circuit to a single error.

use crate::task::Task;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod csv;
pub mod json;

pub use self::csv::import_from_csv;
pub use self::json::import_from_json;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub tasks: Vec<Task>,
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ImportResult {
    pub(crate) fn from_parts(
        project_name: Option<String>,
        tasks: Vec<Task>,
        errors: Vec<String>,
    ) -> Self {
        tracing::info!(
            accepted = tasks.len(),
            rejected = errors.len(),
            "import finished"
        );
        Self {
            project_name,
            is_valid: errors.is_empty(),
            tasks,
            errors,
        }
    }

    /// Whole-input failure: no tasks and exactly one error.
    pub(crate) fn failed(error: impl fmt::Display) -> Self {
        let message = error.to_string();
        tracing::debug!(%message, "import rejected");
        Self {
            project_name: None,
            tasks: Vec::new(),
            is_valid: false,
            errors: vec![message],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// True when some rows were accepted despite errors elsewhere.
    pub fn is_partial(&self) -> bool {
        !self.is_valid && !self.tasks.is_empty()
    }
}

/// Whole-input conditions that end an import before any row is examined.
#[derive(Debug, Error)]
pub(crate) enum ImportError {
    #[error("CSV file must contain a header row and at least one data row")]
    NoData,
    #[error("Failed to parse JSON: {0}")]
    MalformedInput(#[from] serde_json::Error),
    #[error("Invalid format: expected an export object with 'version' and 'tasks' or an array of tasks")]
    InvalidFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Json,
}

impl ImportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        ext.parse().ok()
    }
}

impl FromStr for ImportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ImportFormat::Csv),
            "json" => Ok(ImportFormat::Json),
            other => Err(format!("unknown import format '{other}'")),
        }
    }
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportFormat::Csv => f.write_str("csv"),
            ImportFormat::Json => f.write_str("json"),
        }
    }
}

/// Drops a leading UTF-8 byte order mark.
pub(crate) fn strip_bom(input: &str) -> &str {
    input.strip_prefix('\u{feff}').unwrap_or(input)
}

pub fn import_tasks(format: ImportFormat, input: &str) -> ImportResult {
    match format {
        ImportFormat::Csv => import_from_csv(input),
        ImportFormat::Json => import_from_json(input),
    }
}
