use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    ExportFormat, ImportFormat, ImportMode, ImportResult, PersistenceError, PertError, PertResult,
    PlanningSession, Project, ProjectSummary, SessionError, Task, TaskEstimate, TimeUnit,
    calculate, export_filename, format_duration, import_tasks,
};

#[derive(Clone)]
pub struct AppState {
    session: Arc<RwLock<PlanningSession>>,
    display_unit: TimeUnit,
}

impl AppState {
    pub fn new(session: PlanningSession) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
            display_unit: TimeUnit::Hours,
        }
    }

    pub fn with_shared(session: Arc<RwLock<PlanningSession>>) -> Self {
        Self {
            session,
            display_unit: TimeUnit::Hours,
        }
    }

    pub fn with_display_unit(mut self, unit: TimeUnit) -> Self {
        self.display_unit = unit;
        self
    }

    fn session(&self) -> Arc<RwLock<PlanningSession>> {
        self.session.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<PertError> for ApiError {
    fn from(value: PertError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::NotFound(_) => ApiError::NotFound(value.to_string()),
            PersistenceError::InvalidData(_) => ApiError::Invalid(value.to_string()),
            other => {
                tracing::error!(error = %other, "project store failure");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(value: SessionError) -> Self {
        match value {
            SessionError::Estimate(err) => err.into(),
            SessionError::DuplicateTaskId(_) => ApiError::Conflict(value.to_string()),
            SessionError::Persistence(err) => err.into(),
            SessionError::Export(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

/// Body of `POST /tasks`. Derived statistics are always computed server side.
#[derive(Debug, Deserialize)]
struct TaskPayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    estimate: TaskEstimate,
}

#[derive(Debug, Deserialize)]
struct NamePayload {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct DuplicatePayload {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectUpdatePayload {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tasks: Option<Vec<TaskPayload>>,
}

#[derive(Debug, Deserialize)]
struct ImportQuery {
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UnitQuery {
    #[serde(default)]
    unit: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectView {
    id: Option<String>,
    name: Option<String>,
    tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryView {
    #[serde(flatten)]
    summary: ProjectSummary,
    unit: TimeUnit,
    expected_duration: String,
    standard_deviation: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportOutcome {
    mode: &'static str,
    added: usize,
    result: ImportResult,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/estimate", post(estimate))
        .route("/project", get(get_project))
        .route("/project/name", put(rename_project))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:id", get(get_task).delete(delete_task))
        .route("/summary", get(get_summary))
        .route("/export/:format", get(export_project))
        .route("/import/:format", post(import_project))
        .route("/projects", get(list_projects).post(save_project))
        .route(
            "/projects/:id",
            get(get_stored_project)
                .put(update_stored_project)
                .delete(delete_stored_project),
        )
        .route("/projects/:id/open", post(open_stored_project))
        .route("/projects/:id/duplicate", post(duplicate_stored_project))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn estimate(Json(estimate): Json<TaskEstimate>) -> Result<Json<PertResult>, ApiError> {
    Ok(Json(calculate(&estimate)?))
}

fn project_view(session: &PlanningSession) -> ProjectView {
    ProjectView {
        id: session.project_id().map(ToOwned::to_owned),
        name: session.project_name().map(ToOwned::to_owned),
        tasks: session.tasks().to_vec(),
    }
}

async fn get_project(State(state): State<AppState>) -> Json<ProjectView> {
    let session = state.session();
    let guard = session.read();
    Json(project_view(&guard))
}

async fn rename_project(
    State(state): State<AppState>,
    Json(payload): Json<NamePayload>,
) -> Json<ProjectView> {
    let session = state.session();
    let mut guard = session.write();
    guard.set_project_name(payload.name);
    Json(project_view(&guard))
}

async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    let session = state.session();
    let tasks = session.read().tasks().to_vec();
    Json(tasks)
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let session = state.session();
    let task = session.read().find_task(&task_id).cloned();
    task.map(Json)
        .ok_or_else(|| ApiError::not_found(format!("task {task_id} not found")))
}

async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<TaskPayload>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = Task::create(payload.name, payload.estimate, payload.id)?;
    let session = state.session();
    session.write().insert_task(task.clone())?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session = state.session();
    let removed = session.write().remove_task(&task_id);
    if !removed {
        return Err(ApiError::not_found(format!("task {task_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<UnitQuery>,
) -> Result<Json<SummaryView>, ApiError> {
    let unit = match query.unit {
        Some(raw) => TimeUnit::from_str(&raw).map_err(|err| ApiError::invalid(err.to_string()))?,
        None => state.display_unit,
    };
    let summary = state.session().read().summary();
    Ok(Json(SummaryView {
        expected_duration: format_duration(summary.total_expected_duration, unit),
        standard_deviation: format_duration(summary.total_standard_deviation, unit),
        unit,
        summary,
    }))
}

async fn export_project(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Result<Response, ApiError> {
    let format = ExportFormat::from_str(&format).map_err(ApiError::invalid)?;
    let session = state.session();
    let (body, filename) = {
        let guard = session.read();
        let body = guard.export(format)?;
        let filename = export_filename(guard.project_name(), Utc::now().date_naive(), format);
        (body, filename)
    };
    let headers = [
        (header::CONTENT_TYPE, format.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((StatusCode::OK, headers, body).into_response())
}

async fn import_project(
    State(state): State<AppState>,
    Path(format): Path<String>,
    Query(query): Query<ImportQuery>,
    body: String,
) -> Result<Json<ImportOutcome>, ApiError> {
    let format = ImportFormat::from_str(&format).map_err(ApiError::invalid)?;
    let mode = query.mode.as_deref().map(str::trim).unwrap_or("append");
    let apply = match mode {
        "append" => Some(ImportMode::Append),
        "replace" => Some(ImportMode::Replace),
        "preview" => None,
        other => return Err(ApiError::invalid(format!("unknown import mode '{other}'"))),
    };

    let result = import_tasks(format, &body);
    let added = match apply {
        Some(mode) => state.session().write().apply_import(&result, mode),
        None => 0,
    };
    let mode = match apply {
        Some(ImportMode::Append) => "append",
        Some(ImportMode::Replace) => "replace",
        None => "preview",
    };
    Ok(Json(ImportOutcome {
        mode,
        added,
        result,
    }))
}

async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = state.session().read().list_projects()?;
    Ok(Json(projects))
}

async fn save_project(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let session = state.session();
    let mut guard = session.write();
    let created = guard.project_id().is_none();
    let project = guard.save()?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(project)))
}

async fn get_stored_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    let session = state.session();
    let project = session.read().store().load_project(&project_id)?;
    project
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("project {project_id} not found")))
}

async fn update_stored_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(payload): Json<ProjectUpdatePayload>,
) -> Result<Json<Project>, ApiError> {
    let session = state.session();
    let guard = session.read();
    let mut project = guard
        .store()
        .load_project(&project_id)?
        .ok_or_else(|| ApiError::not_found(format!("project {project_id} not found")))?;
    if let Some(name) = payload.name.map(|name| name.trim().to_string()) {
        if name.is_empty() {
            return Err(ApiError::invalid("project name must not be blank"));
        }
        project.name = name;
    }
    if let Some(tasks) = payload.tasks {
        project.tasks = tasks
            .into_iter()
            .map(|task| Task::create(task.name, task.estimate, task.id))
            .collect::<Result<Vec<_>, _>>()?;
    }
    let updated = guard.store().update_project(&project)?;
    Ok(Json(updated))
}

async fn delete_stored_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = state.session().write().delete_project(&project_id)?;
    if !removed {
        return Err(ApiError::not_found(format!("project {project_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn open_stored_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectView>, ApiError> {
    let session = state.session();
    let mut guard = session.write();
    guard.open(&project_id)?;
    Ok(Json(project_view(&guard)))
}

async fn duplicate_stored_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    payload: Option<Json<DuplicatePayload>>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    let project = state
        .session()
        .read()
        .duplicate_project(&project_id, payload.name.as_deref())?;
    Ok((StatusCode::CREATED, Json(project)))
}
