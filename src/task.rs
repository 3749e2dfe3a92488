use crate::estimate::TaskEstimate;
use crate::pert::{PertError, PertResult, calculate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named estimate together with its PERT statistics.
///
/// Tasks are only produced by [`Task::create`], which validates the estimate
/// before deriving anything. The derived fields are fixed at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TaskRecord")]
pub struct Task {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    estimate: TaskEstimate,
    expected_duration: f64,
    standard_deviation: f64,
    variance: f64,
}

/// Stored shape of a task. Derived fields in the input are ignored and
/// recomputed through the factory.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: String,
    #[serde(default)]
    name: Option<String>,
    estimate: TaskEstimate,
}

impl TryFrom<TaskRecord> for Task {
    type Error = PertError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        Task::create(record.name, record.estimate, Some(record.id))
    }
}

impl Task {
    /// Validates and calculates `estimate`, then assembles the task.
    ///
    /// Control characters in the name (line breaks, tabs) become spaces, and
    /// blank names are stored as absent. A missing or blank `id` is replaced
    /// by a random UUID v4.
    pub fn create(
        name: Option<String>,
        estimate: TaskEstimate,
        id: Option<String>,
    ) -> Result<Self, PertError> {
        let PertResult {
            expected_duration,
            standard_deviation,
            variance,
        } = calculate(&estimate)?;

        let id = id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(generate_task_id);
        let name = name
            .map(|name| flatten_control_chars(&name).trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(Self {
            id,
            name,
            estimate,
            expected_duration,
            standard_deviation,
            variance,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name to show for the task at 1-based `position` in its collection.
    pub fn display_name(&self, position: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Task {position}"),
        }
    }

    pub fn estimate(&self) -> &TaskEstimate {
        &self.estimate
    }

    pub fn expected_duration(&self) -> f64 {
        self.expected_duration
    }

    pub fn standard_deviation(&self) -> f64 {
        self.standard_deviation
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Same task under a freshly generated id.
    pub(crate) fn with_new_id(mut self) -> Self {
        self.id = generate_task_id();
        self
    }
}

pub fn create_task(
    name: Option<String>,
    estimate: TaskEstimate,
    id: Option<String>,
) -> Result<Task, PertError> {
    Task::create(name, estimate, id)
}

pub(crate) fn flatten_control_chars(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

fn generate_task_id() -> String {
    Uuid::new_v4().to_string()
}
