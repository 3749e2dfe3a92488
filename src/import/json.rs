use super::{ImportError, ImportResult, strip_bom};
use crate::estimate::{EstimateValidationError, TaskEstimate};
use crate::export::EXPORT_FORMAT_VERSION;
use crate::pert::PertError;
use crate::task::Task;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Accepted top-level shapes.
enum Document<'a> {
    /// `{ "version": .., "tasks": [..], "projectName"?: .. }` as written by the exporter.
    Envelope {
        project_name: Option<String>,
        tasks: &'a [Value],
    },
    /// `[ { "estimate": .., "name"?: .. }, .. ]`
    Bare(&'a [Value]),
}

#[derive(Deserialize)]
struct TaskPayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    estimate: TaskEstimate,
}

#[derive(Debug, Error)]
enum ItemError {
    #[error("invalid task structure ({0})")]
    InvalidStructure(serde_json::Error),
    #[error("invalid estimates ({0})")]
    InvalidEstimates(EstimateValidationError),
}

/// Imports tasks from an export envelope or a bare array of task objects.
///
/// Envelope items keep their `id` when present; bare-array items always get a
/// fresh one.
pub fn import_from_json(input: &str) -> ImportResult {
    let document: Value = match serde_json::from_str(strip_bom(input)) {
        Ok(value) => value,
        Err(err) => return ImportResult::failed(ImportError::MalformedInput(err)),
    };

    let (project_name, items, keep_ids) = match classify(&document) {
        Some(Document::Envelope {
            project_name,
            tasks,
        }) => (project_name, tasks, true),
        Some(Document::Bare(items)) => (None, items, false),
        None => return ImportResult::failed(ImportError::InvalidFormat),
    };

    let mut tasks = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        let position = idx + 1;
        match parse_item(item, keep_ids) {
            Ok(task) => tasks.push(task),
            Err(err) => {
                tracing::debug!(item = position, error = %err, "skipping json task");
                errors.push(format!("Task {position}: {err}"));
            }
        }
    }

    ImportResult::from_parts(project_name, tasks, errors)
}

fn classify(document: &Value) -> Option<Document<'_>> {
    match document {
        Value::Array(items) => Some(Document::Bare(items)),
        Value::Object(map) => {
            let version = map.get("version")?;
            let tasks = map.get("tasks")?.as_array()?;
            if version.as_str() != Some(EXPORT_FORMAT_VERSION) {
                tracing::warn!(%version, "importing export envelope with unexpected version");
            }
            let project_name = map
                .get("projectName")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(ToOwned::to_owned);
            Some(Document::Envelope {
                project_name,
                tasks,
            })
        }
        _ => None,
    }
}

fn parse_item(item: &Value, keep_id: bool) -> Result<Task, ItemError> {
    let payload = TaskPayload::deserialize(item).map_err(ItemError::InvalidStructure)?;
    let id = if keep_id { payload.id } else { None };
    match Task::create(payload.name, payload.estimate, id) {
        Ok(task) => Ok(task),
        Err(PertError::InvalidEstimate(err)) => Err(ItemError::InvalidEstimates(err)),
    }
}
