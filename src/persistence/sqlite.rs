use super::{PersistenceError, PersistenceResult, ProjectStore, validate_project};
use crate::project::Project;
use crate::task::Task;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::sync::Mutex;

pub struct SqliteProjectStore {
    connection: Mutex<Connection>,
}

impl SqliteProjectStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                tasks_json TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn project_from_row(row: &Row<'_>) -> rusqlite::Result<StoredRow> {
        Ok(StoredRow {
            id: row.get(0)?,
            name: row.get(1)?,
            tasks_json: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }
}

struct StoredRow {
    id: String,
    name: String,
    tasks_json: String,
    created_at: String,
    updated_at: String,
}

impl StoredRow {
    fn into_project(self) -> PersistenceResult<Project> {
        let tasks: Vec<Task> = serde_json::from_str(&self.tasks_json)?;
        let project = Project {
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            id: self.id,
            name: self.name,
            tasks,
        };
        validate_project(&project)?;
        Ok(project)
    }
}

// Fixed-width so lexicographic order in SQL matches chronological order.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(raw: &str) -> PersistenceResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| PersistenceError::InvalidData(format!("invalid timestamp '{raw}': {err}")))
}

impl ProjectStore for SqliteProjectStore {
    fn list_projects(&self) -> PersistenceResult<Vec<Project>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, tasks_json, created_at, updated_at FROM projects ORDER BY updated_at DESC",
        )?;
        let rows = stmt.query_map([], Self::project_from_row)?;
        let mut projects = Vec::new();
        for row in rows {
            projects.push(row?.into_project()?);
        }
        Ok(projects)
    }

    fn load_project(&self, id: &str) -> PersistenceResult<Option<Project>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, tasks_json, created_at, updated_at FROM projects WHERE id = ?1",
        )?;
        let row = stmt
            .query_row(params![id], Self::project_from_row)
            .optional()?;
        row.map(StoredRow::into_project).transpose()
    }

    fn save_project(&self, name: &str, tasks: &[Task]) -> PersistenceResult<Project> {
        let project = Project::new(name, tasks.to_vec());
        validate_project(&project)?;
        let tasks_json = serde_json::to_string(&project.tasks)?;
        let conn = self.connection.lock().expect("sqlite mutex poisoned");
        conn.execute(
            "INSERT INTO projects (id, name, tasks_json, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                project.id,
                project.name,
                tasks_json,
                format_timestamp(project.created_at),
                format_timestamp(project.updated_at)
            ],
        )?;
        tracing::info!(project_id = %project.id, "saved project to sqlite");
        Ok(project)
    }

    fn update_project(&self, project: &Project) -> PersistenceResult<Project> {
        validate_project(project)?;
        let tasks_json = serde_json::to_string(&project.tasks)?;
        let updated_at = Utc::now();
        {
            let conn = self.connection.lock().expect("sqlite mutex poisoned");
            let changed = conn.execute(
                "UPDATE projects SET name = ?2, tasks_json = ?3, updated_at = ?4 WHERE id = ?1",
                params![project.id, project.name, tasks_json, format_timestamp(updated_at)],
            )?;
            if changed == 0 {
                return Err(PersistenceError::NotFound(project.id.clone()));
            }
        }
        tracing::info!(project_id = %project.id, "updated project in sqlite");
        self.load_project(&project.id)?
            .ok_or_else(|| PersistenceError::NotFound(project.id.clone()))
    }

    fn delete_project(&self, id: &str) -> PersistenceResult<bool> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");
        let removed = conn.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }
}
