use crate::estimate::TaskEstimate;
use crate::export::{ExportError, ExportFormat, export_tasks};
use crate::import::ImportResult;
use crate::pert::PertError;
use crate::persistence::{PersistenceError, ProjectStore};
use crate::project::{DEFAULT_PROJECT_NAME, Project};
use crate::summary::{ProjectSummary, summarize};
use crate::task::Task;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Estimate(#[from] PertError),
    #[error("task {0} already exists")]
    DuplicateTaskId(String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// How imported tasks are combined with the tasks already in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Keep existing tasks and add the imported ones after them.
    #[default]
    Append,
    /// Discard existing tasks.
    Replace,
}

/// The project currently being edited, plus the store it is saved to.
pub struct PlanningSession {
    store: Box<dyn ProjectStore + Send + Sync>,
    project_id: Option<String>,
    project_name: Option<String>,
    tasks: Vec<Task>,
}

impl PlanningSession {
    pub fn new(store: Box<dyn ProjectStore + Send + Sync>) -> Self {
        Self {
            store,
            project_id: None,
            project_name: None,
            tasks: Vec::new(),
        }
    }

    pub fn store(&self) -> &(dyn ProjectStore + Send + Sync) {
        self.store.as_ref()
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn project_name(&self) -> Option<&str> {
        self.project_name.as_deref()
    }

    pub fn set_project_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        let name = name.trim();
        self.project_name = if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        };
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == task_id)
    }

    pub fn add_task(&mut self, name: Option<String>, estimate: TaskEstimate) -> SessionResult<Task> {
        let task = Task::create(name, estimate, None)?;
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub fn insert_task(&mut self, task: Task) -> SessionResult<()> {
        if self.find_task(task.id()).is_some() {
            return Err(SessionError::DuplicateTaskId(task.id().to_string()));
        }
        self.tasks.push(task);
        Ok(())
    }

    pub fn remove_task(&mut self, task_id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id() != task_id);
        self.tasks.len() != before
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Starts an unsaved, empty project.
    pub fn new_project(&mut self, name: Option<String>) {
        self.project_id = None;
        self.tasks.clear();
        self.project_name = None;
        if let Some(name) = name {
            self.set_project_name(name);
        }
    }

    pub fn summary(&self) -> ProjectSummary {
        summarize(&self.tasks)
    }

    pub fn export(&self, format: ExportFormat) -> SessionResult<String> {
        Ok(export_tasks(format, &self.tasks, self.project_name())?)
    }

    /// Merges the accepted tasks of `result` into the session and returns how
    /// many were added.
    ///
    /// In append mode, imported tasks whose id is already taken get a new id.
    /// The project name is adopted when the session has none.
    pub fn apply_import(&mut self, result: &ImportResult, mode: ImportMode) -> usize {
        if mode == ImportMode::Replace {
            self.tasks.clear();
        }
        if self.project_name.is_none() {
            if let Some(name) = &result.project_name {
                self.set_project_name(name.clone());
            }
        }

        let mut taken: HashSet<String> = self.tasks.iter().map(|t| t.id().to_string()).collect();
        for task in &result.tasks {
            let task = if taken.contains(task.id()) {
                tracing::warn!(task_id = %task.id(), "imported task id already in use, assigning a new one");
                task.clone().with_new_id()
            } else {
                task.clone()
            };
            taken.insert(task.id().to_string());
            self.tasks.push(task);
        }
        result.tasks.len()
    }

    /// Creates the project in the store on first save, updates it afterwards.
    pub fn save(&mut self) -> SessionResult<Project> {
        let name = self
            .project_name
            .clone()
            .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());

        let existing = match &self.project_id {
            Some(id) => self.store.load_project(id)?,
            None => None,
        };
        let project = match existing {
            Some(mut project) => {
                project.name = name;
                project.tasks = self.tasks.clone();
                self.store.update_project(&project)?
            }
            None => self.store.save_project(&name, &self.tasks)?,
        };

        self.project_id = Some(project.id.clone());
        self.project_name = Some(project.name.clone());
        Ok(project)
    }

    /// Replaces the session contents with a stored project.
    pub fn open(&mut self, project_id: &str) -> SessionResult<Project> {
        let project = self
            .store
            .load_project(project_id)?
            .ok_or_else(|| PersistenceError::NotFound(project_id.to_string()))?;
        self.project_id = Some(project.id.clone());
        self.project_name = Some(project.name.clone());
        self.tasks = project.tasks.clone();
        Ok(project)
    }

    pub fn list_projects(&self) -> SessionResult<Vec<Project>> {
        Ok(self.store.list_projects()?)
    }

    /// Deletes a stored project. The open project becomes unsaved if it was
    /// the one deleted.
    pub fn delete_project(&mut self, project_id: &str) -> SessionResult<bool> {
        let removed = self.store.delete_project(project_id)?;
        if removed && self.project_id.as_deref() == Some(project_id) {
            self.project_id = None;
        }
        Ok(removed)
    }

    pub fn duplicate_project(
        &self,
        project_id: &str,
        new_name: Option<&str>,
    ) -> SessionResult<Project> {
        Ok(self.store.duplicate_project(project_id, new_name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::import_from_json;
    use crate::persistence::MemoryProjectStore;
    use crate::units::TimeValue;

    fn estimate(o: f64, n: f64, p: f64) -> TaskEstimate {
        TaskEstimate::new(TimeValue::hours(o), TimeValue::hours(n), TimeValue::hours(p))
    }

    fn session() -> PlanningSession {
        PlanningSession::new(Box::new(MemoryProjectStore::new()))
    }

    #[test]
    fn add_and_remove_tasks() {
        let mut session = session();
        let task = session.add_task(Some("Design".into()), estimate(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(session.tasks().len(), 1);
        assert!(session.add_task(None, estimate(3.0, 2.0, 1.0)).is_err());
        assert_eq!(session.tasks().len(), 1);
        assert!(session.remove_task(task.id()));
        assert!(!session.remove_task(task.id()));
        assert!(session.tasks().is_empty());
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let mut session = session();
        let task = Task::create(None, estimate(1.0, 2.0, 3.0), Some("t1".into())).unwrap();
        session.insert_task(task.clone()).unwrap();
        assert!(matches!(
            session.insert_task(task),
            Err(SessionError::DuplicateTaskId(id)) if id == "t1"
        ));
    }

    #[test]
    fn append_import_reassigns_colliding_ids() {
        let mut session = session();
        let task = Task::create(None, estimate(1.0, 2.0, 3.0), Some("t1".into())).unwrap();
        session.insert_task(task).unwrap();

        let result = import_from_json(
            r#"{"version":"1.0","projectName":"Imported","tasks":[
                {"id":"t1","estimate":{"optimistic":{"value":1,"unit":"hours"},"nominal":{"value":2,"unit":"hours"},"pessimistic":{"value":3,"unit":"hours"}}}
            ]}"#,
        );
        assert_eq!(session.apply_import(&result, ImportMode::Append), 1);
        assert_eq!(session.tasks().len(), 2);
        assert_ne!(session.tasks()[0].id(), session.tasks()[1].id());
        assert_eq!(session.project_name(), Some("Imported"));

        assert_eq!(session.apply_import(&result, ImportMode::Replace), 1);
        assert_eq!(session.tasks().len(), 1);
        assert_eq!(session.tasks()[0].id(), "t1");
    }

    #[test]
    fn save_creates_then_updates() {
        let mut session = session();
        session.set_project_name("Launch");
        session.add_task(None, estimate(1.0, 2.0, 3.0)).unwrap();
        let first = session.save().unwrap();

        session.add_task(None, estimate(2.0, 3.0, 4.0)).unwrap();
        let second = session.save().unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.tasks.len(), 2);
        assert_eq!(session.list_projects().unwrap().len(), 1);

        session.new_project(None);
        assert!(session.tasks().is_empty());
        session.open(&first.id).unwrap();
        assert_eq!(session.tasks().len(), 2);
        assert_eq!(session.project_name(), Some("Launch"));
    }
}
