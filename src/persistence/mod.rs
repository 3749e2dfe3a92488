use crate::project::{Project, TaskCollectionError, validate_tasks};
use crate::task::Task;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Database(String),
    #[error("export error: {0}")]
    Export(#[from] crate::export::ExportError),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("project {0} not found")]
    NotFound(String),
}

impl From<TaskCollectionError> for PersistenceError {
    fn from(value: TaskCollectionError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Database(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Keyed record store for saved projects.
///
/// Estimation and aggregation never touch a store; it is handed to whatever
/// orchestrates project operations (see [`PlanningSession`](crate::session::PlanningSession)).
pub trait ProjectStore {
    /// All projects, most recently updated first.
    fn list_projects(&self) -> PersistenceResult<Vec<Project>>;

    fn load_project(&self, id: &str) -> PersistenceResult<Option<Project>>;

    /// Stores `tasks` under a new project id.
    fn save_project(&self, name: &str, tasks: &[Task]) -> PersistenceResult<Project>;

    /// Replaces name and tasks of an existing project and bumps `updated_at`.
    fn update_project(&self, project: &Project) -> PersistenceResult<Project>;

    fn delete_project(&self, id: &str) -> PersistenceResult<bool>;

    /// Copies a stored project under a new id. Defaults to `"<name> (Copy)"`.
    fn duplicate_project(&self, id: &str, new_name: Option<&str>) -> PersistenceResult<Project> {
        let original = self
            .load_project(id)?
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))?;
        let name = new_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("{} (Copy)", original.name));
        self.save_project(&name, &original.tasks)
    }
}

impl<S: ProjectStore + ?Sized> ProjectStore for Box<S> {
    fn list_projects(&self) -> PersistenceResult<Vec<Project>> {
        (**self).list_projects()
    }

    fn load_project(&self, id: &str) -> PersistenceResult<Option<Project>> {
        (**self).load_project(id)
    }

    fn save_project(&self, name: &str, tasks: &[Task]) -> PersistenceResult<Project> {
        (**self).save_project(name, tasks)
    }

    fn update_project(&self, project: &Project) -> PersistenceResult<Project> {
        (**self).update_project(project)
    }

    fn delete_project(&self, id: &str) -> PersistenceResult<bool> {
        (**self).delete_project(id)
    }

    fn duplicate_project(&self, id: &str, new_name: Option<&str>) -> PersistenceResult<Project> {
        (**self).duplicate_project(id, new_name)
    }
}

pub(crate) fn sort_by_recent(projects: &mut [Project]) {
    projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

pub(crate) fn validate_project(project: &Project) -> PersistenceResult<()> {
    validate_tasks(&project.tasks)?;
    Ok(())
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{JsonFileProjectStore, import_file, write_export};
pub use memory::MemoryProjectStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteProjectStore;
