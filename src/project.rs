use crate::summary::{ProjectSummary, summarize};
use crate::task::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";

/// A named, saved task collection as kept by a [`ProjectStore`](crate::persistence::ProjectStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>, tasks: Vec<Task>) -> Self {
        let now = Utc::now();
        let name = name.into();
        let name = if name.trim().is_empty() {
            DEFAULT_PROJECT_NAME.to_string()
        } else {
            name.trim().to_string()
        };
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            tasks,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn summary(&self) -> ProjectSummary {
        summarize(&self.tasks)
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == task_id)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskCollectionError {
    #[error("duplicate task id {0}")]
    DuplicateTaskId(String),
}

/// Rejects collections in which two tasks share an id.
pub fn validate_tasks(tasks: &[Task]) -> Result<(), TaskCollectionError> {
    let mut seen_ids = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen_ids.insert(task.id()) {
            return Err(TaskCollectionError::DuplicateTaskId(task.id().to_string()));
        }
    }
    Ok(())
}
