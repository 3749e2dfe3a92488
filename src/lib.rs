pub mod units;
pub mod estimate;
pub mod pert;
pub mod task;
pub mod summary;
pub mod format;
pub mod export;
pub mod import;
pub mod project;
pub mod persistence;
pub mod session;
pub mod config;
#[cfg(feature = "http_api")]
pub mod http_api;

pub use units::{TimeUnit, TimeValue, UnknownTimeUnit, from_hours, to_hours};
pub use estimate::{EstimateValidationError, TaskEstimate, is_valid_estimate, validate_estimate};
pub use pert::{PertError, PertResult, calculate};
pub use task::{Task, create_task};
pub use summary::{ProjectSummary, summarize};
pub use format::{export_filename, format_duration, sanitize_file_stem};
pub use export::{ExportError, ExportFormat, export_tasks, export_to_csv, export_to_json, export_to_markdown};
pub use import::{ImportFormat, ImportResult, import_from_csv, import_from_json, import_tasks};
pub use project::{DEFAULT_PROJECT_NAME, Project, validate_tasks};
pub use persistence::{
    JsonFileProjectStore, MemoryProjectStore, PersistenceError, PersistenceResult, ProjectStore,
};
#[cfg(feature = "sqlite")]
pub use persistence::SqliteProjectStore;
pub use session::{ImportMode, PlanningSession, SessionError};
pub use config::{Config, ConfigError, StoreBackend};
