use super::{PersistenceError, PersistenceResult, ProjectStore, sort_by_recent, validate_project};
use crate::export::{ExportFormat, export_tasks};
use crate::import::{ImportFormat, ImportResult, import_tasks};
use crate::project::Project;
use crate::task::Task;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Default, Serialize, Deserialize)]
struct ProjectSnapshot {
    #[serde(default)]
    projects: BTreeMap<String, Project>,
}

/// Keeps every project in one pretty-printed JSON document keyed by id.
pub struct JsonFileProjectStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileProjectStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_snapshot(&self) -> PersistenceResult<ProjectSnapshot> {
        if !self.path.exists() {
            return Ok(ProjectSnapshot::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(ProjectSnapshot::default());
        }
        let snapshot: ProjectSnapshot = serde_json::from_str(&contents)?;
        for (id, project) in &snapshot.projects {
            if id != &project.id {
                return Err(PersistenceError::InvalidData(format!(
                    "project stored under key {id} carries id {}",
                    project.id
                )));
            }
            validate_project(project)?;
        }
        Ok(snapshot)
    }

    fn write_snapshot(&self, snapshot: &ProjectSnapshot) -> PersistenceResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(writer, snapshot)?;
        Ok(())
    }

    fn with_snapshot<T>(
        &self,
        mutator: impl FnOnce(&mut ProjectSnapshot) -> PersistenceResult<T>,
    ) -> PersistenceResult<T> {
        let _guard = self.lock.lock().expect("project file mutex poisoned");
        let mut snapshot = self.read_snapshot()?;
        let result = mutator(&mut snapshot)?;
        self.write_snapshot(&snapshot)?;
        Ok(result)
    }
}

impl ProjectStore for JsonFileProjectStore {
    fn list_projects(&self) -> PersistenceResult<Vec<Project>> {
        let _guard = self.lock.lock().expect("project file mutex poisoned");
        let mut projects: Vec<Project> = self.read_snapshot()?.projects.into_values().collect();
        sort_by_recent(&mut projects);
        Ok(projects)
    }

    fn load_project(&self, id: &str) -> PersistenceResult<Option<Project>> {
        let _guard = self.lock.lock().expect("project file mutex poisoned");
        Ok(self.read_snapshot()?.projects.remove(id))
    }

    fn save_project(&self, name: &str, tasks: &[Task]) -> PersistenceResult<Project> {
        let project = Project::new(name, tasks.to_vec());
        validate_project(&project)?;
        self.with_snapshot(|snapshot| {
            snapshot
                .projects
                .insert(project.id.clone(), project.clone());
            Ok(())
        })?;
        tracing::info!(project_id = %project.id, path = %self.path.display(), "saved project");
        Ok(project)
    }

    fn update_project(&self, project: &Project) -> PersistenceResult<Project> {
        validate_project(project)?;
        let updated = self.with_snapshot(|snapshot| {
            let stored = snapshot
                .projects
                .get_mut(&project.id)
                .ok_or_else(|| PersistenceError::NotFound(project.id.clone()))?;
            stored.name = project.name.clone();
            stored.tasks = project.tasks.clone();
            stored.updated_at = Utc::now();
            Ok(stored.clone())
        })?;
        tracing::info!(project_id = %updated.id, "updated project");
        Ok(updated)
    }

    fn delete_project(&self, id: &str) -> PersistenceResult<bool> {
        let removed = self.with_snapshot(|snapshot| Ok(snapshot.projects.remove(id).is_some()))?;
        if removed {
            tracing::info!(project_id = %id, "deleted project");
        }
        Ok(removed)
    }
}

/// Renders `tasks` in `format` and writes the text to `path`.
pub fn write_export<P: AsRef<Path>>(
    path: P,
    format: ExportFormat,
    tasks: &[Task],
    project_name: Option<&str>,
) -> PersistenceResult<()> {
    let text = export_tasks(format, tasks, project_name)?;
    fs::write(path, text)?;
    Ok(())
}

/// Reads `path` and imports it, choosing CSV or JSON from the extension.
pub fn import_file<P: AsRef<Path>>(path: P) -> PersistenceResult<ImportResult> {
    let path = path.as_ref();
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImportFormat::from_extension)
        .ok_or_else(|| {
            PersistenceError::InvalidData(format!(
                "cannot infer import format from '{}' (expected .csv or .json)",
                path.display()
            ))
        })?;
    let contents = fs::read_to_string(path)?;
    Ok(import_tasks(format, &contents))
}
