use pert_tool::{
    JsonFileProjectStore, MemoryProjectStore, PersistenceError, ProjectStore, Task, TaskEstimate,
    TimeValue,
};
use tempfile::{NamedTempFile, tempdir};

fn task(id: &str, o: f64, n: f64, p: f64) -> Task {
    Task::create(
        Some(format!("Task {id}")),
        TaskEstimate::new(TimeValue::hours(o), TimeValue::hours(n), TimeValue::hours(p)),
        Some(id.to_string()),
    )
    .unwrap()
}

fn exercise_store(store: &dyn ProjectStore) {
    let saved = store
        .save_project("Launch", &[task("a", 1.0, 2.0, 3.0), task("b", 2.0, 4.0, 12.0)])
        .expect("save project");
    assert_eq!(saved.name, "Launch");
    assert_eq!(saved.created_at, saved.updated_at);

    let loaded = store
        .load_project(&saved.id)
        .expect("load project")
        .expect("project exists");
    assert_eq!(loaded.tasks, saved.tasks);
    assert!((loaded.summary().total_expected_duration - 7.0).abs() < 1e-9);

    let mut edited = loaded.clone();
    edited.name = "Launch v2".into();
    edited.tasks.pop();
    let updated = store.update_project(&edited).expect("update project");
    assert_eq!(updated.id, saved.id);
    assert_eq!(updated.name, "Launch v2");
    assert_eq!(updated.tasks.len(), 1);
    assert!(updated.updated_at >= saved.updated_at);
    assert_eq!(updated.created_at, saved.created_at);

    let copy = store.duplicate_project(&saved.id, None).expect("duplicate");
    assert_ne!(copy.id, saved.id);
    assert_eq!(copy.name, "Launch v2 (Copy)");
    assert_eq!(copy.tasks, updated.tasks);
    let named = store
        .duplicate_project(&saved.id, Some("Fork"))
        .expect("duplicate with name");
    assert_eq!(named.name, "Fork");

    let listed = store.list_projects().expect("list");
    assert_eq!(listed.len(), 3);
    for pair in listed.windows(2) {
        assert!(pair[0].updated_at >= pair[1].updated_at);
    }

    assert!(store.delete_project(&copy.id).expect("delete"));
    assert!(!store.delete_project(&copy.id).expect("delete again"));
    assert!(store.load_project(&copy.id).expect("load deleted").is_none());

    let mut ghost = saved.clone();
    ghost.id = "missing".into();
    assert!(matches!(
        store.update_project(&ghost),
        Err(PersistenceError::NotFound(id)) if id == "missing"
    ));
    assert!(matches!(
        store.duplicate_project("missing", None),
        Err(PersistenceError::NotFound(_))
    ));
    assert!(matches!(
        store.save_project("Dupes", &[task("x", 1.0, 2.0, 3.0), task("x", 1.0, 2.0, 3.0)]),
        Err(PersistenceError::InvalidData(_))
    ));
}

#[test]
fn memory_store_lifecycle() {
    exercise_store(&MemoryProjectStore::new());
}

#[test]
fn json_file_store_lifecycle_and_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("projects.json");
    let store = JsonFileProjectStore::new(&path);
    exercise_store(&store);

    let reopened = JsonFileProjectStore::new(&path);
    assert_eq!(reopened.list_projects().unwrap().len(), 2);
}

#[test]
fn json_file_store_rejects_corrupt_documents() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "{ \"projects\": [1, 2").unwrap();
    let store = JsonFileProjectStore::new(file.path());
    assert!(matches!(
        store.list_projects(),
        Err(PersistenceError::Serialization(_))
    ));
}

#[test]
fn json_file_store_treats_empty_file_as_empty() {
    let file = NamedTempFile::new().unwrap();
    let store = JsonFileProjectStore::new(file.path());
    assert!(store.list_projects().unwrap().is_empty());
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use pert_tool::SqliteProjectStore;

    #[test]
    fn sqlite_store_lifecycle() {
        let store = SqliteProjectStore::in_memory().unwrap();
        exercise_store(&store);
    }

    #[test]
    fn sqlite_store_persists_across_connections() {
        let file = NamedTempFile::new().unwrap();
        let id = {
            let store = SqliteProjectStore::new(file.path()).unwrap();
            store
                .save_project("On disk", &[task("a", 1.0, 2.0, 3.0)])
                .unwrap()
                .id
        };

        let store = SqliteProjectStore::new(file.path()).unwrap();
        let project = store.load_project(&id).unwrap().expect("project exists");
        assert_eq!(project.name, "On disk");
        assert_eq!(project.tasks[0].id(), "a");
    }
}
