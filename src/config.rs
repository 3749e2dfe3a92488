//! Runtime configuration.
//!
//! Read from environment variables:
//! - `PERT_TOOL_STORE` - Optional. `memory`, `json` or `sqlite`. Defaults to `memory`.
//! - `PERT_TOOL_DATA_PATH` - Optional. Store location. Defaults to `pert_projects.json`
//!   for `json` and `pert_projects.db` for `sqlite`.
//! - `PERT_TOOL_HTTP_ADDR` - Optional. HTTP bind address. Defaults to `127.0.0.1:3000`.
//! - `PERT_TOOL_DISPLAY_UNIT` - Optional. Unit durations are shown in. Defaults to `hours`.

use crate::persistence::{
    JsonFileProjectStore, MemoryProjectStore, PersistenceResult, ProjectStore,
};
use crate::units::TimeUnit;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const STORE_VAR: &str = "PERT_TOOL_STORE";
pub const DATA_PATH_VAR: &str = "PERT_TOOL_DATA_PATH";
pub const HTTP_ADDR_VAR: &str = "PERT_TOOL_HTTP_ADDR";
pub const DISPLAY_UNIT_VAR: &str = "PERT_TOOL_DISPLAY_UNIT";

const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("{0} requires the `sqlite` feature")]
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    JsonFile(PathBuf),
    Sqlite(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreBackend,
    pub http_addr: SocketAddr,
    pub display_unit: TimeUnit,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let data_path = get(DATA_PATH_VAR).map(PathBuf::from);
        let store = match get(STORE_VAR).as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("memory") => StoreBackend::Memory,
            Some("json") => StoreBackend::JsonFile(
                data_path.unwrap_or_else(|| PathBuf::from("pert_projects.json")),
            ),
            Some("sqlite") => {
                if !cfg!(feature = "sqlite") {
                    return Err(ConfigError::Unsupported(format!("{STORE_VAR}=sqlite")));
                }
                StoreBackend::Sqlite(data_path.unwrap_or_else(|| PathBuf::from("pert_projects.db")))
            }
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    STORE_VAR.to_string(),
                    other.to_string(),
                ));
            }
        };

        let raw_addr = get(HTTP_ADDR_VAR).unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let http_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue(HTTP_ADDR_VAR.to_string(), raw_addr.clone()))?;

        let display_unit = match get(DISPLAY_UNIT_VAR) {
            Some(raw) => raw
                .parse::<TimeUnit>()
                .map_err(|_| ConfigError::InvalidValue(DISPLAY_UNIT_VAR.to_string(), raw))?,
            None => TimeUnit::Hours,
        };

        Ok(Self {
            store,
            http_addr,
            display_unit,
        })
    }

    /// Opens the configured project store.
    pub fn open_store(&self) -> PersistenceResult<Box<dyn ProjectStore + Send + Sync>> {
        match &self.store {
            StoreBackend::Memory => Ok(Box::new(MemoryProjectStore::new())),
            StoreBackend::JsonFile(path) => Ok(Box::new(JsonFileProjectStore::new(path))),
            #[cfg(feature = "sqlite")]
            StoreBackend::Sqlite(path) => Ok(Box::new(
                crate::persistence::SqliteProjectStore::new(path)?,
            )),
            #[cfg(not(feature = "sqlite"))]
            StoreBackend::Sqlite(_) => Err(crate::persistence::PersistenceError::InvalidData(
                "sqlite store requires the `sqlite` feature".into(),
            )),
        }
    }
}
