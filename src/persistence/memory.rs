use super::{PersistenceError, PersistenceResult, ProjectStore, sort_by_recent, validate_project};
use crate::project::Project;
use crate::task::Task;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local store; contents are lost when it is dropped.
#[derive(Default)]
pub struct MemoryProjectStore {
    projects: Mutex<HashMap<String, Project>>,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectStore for MemoryProjectStore {
    fn list_projects(&self) -> PersistenceResult<Vec<Project>> {
        let projects = self.projects.lock().expect("project store mutex poisoned");
        let mut list: Vec<Project> = projects.values().cloned().collect();
        sort_by_recent(&mut list);
        Ok(list)
    }

    fn load_project(&self, id: &str) -> PersistenceResult<Option<Project>> {
        let projects = self.projects.lock().expect("project store mutex poisoned");
        Ok(projects.get(id).cloned())
    }

    fn save_project(&self, name: &str, tasks: &[Task]) -> PersistenceResult<Project> {
        let project = Project::new(name, tasks.to_vec());
        validate_project(&project)?;
        let mut projects = self.projects.lock().expect("project store mutex poisoned");
        projects.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn update_project(&self, project: &Project) -> PersistenceResult<Project> {
        validate_project(project)?;
        let mut projects = self.projects.lock().expect("project store mutex poisoned");
        let stored = projects
            .get_mut(&project.id)
            .ok_or_else(|| PersistenceError::NotFound(project.id.clone()))?;
        stored.name = project.name.clone();
        stored.tasks = project.tasks.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    fn delete_project(&self, id: &str) -> PersistenceResult<bool> {
        let mut projects = self.projects.lock().expect("project store mutex poisoned");
        Ok(projects.remove(id).is_some())
    }
}
