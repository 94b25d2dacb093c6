//! Layered configuration.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. `timesheet.toml` in the working directory (or an explicit file)
//! 3. `TIMESHEET_*` environment variables, `__` separating nested keys
//!    (`TIMESHEET_STORAGE__BACKEND=sqlite` sets `storage.backend`)

use crate::grouping::OVERTIME_THRESHOLD_HOURS;
use crate::persistence::{JsonFileStore, KeyValueStore, PersistenceResult};
use crate::profile::Profile;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "timesheet.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Figment(Box::new(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Directory for the JSON backend, database file for SQLite.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            path: PathBuf::from(".timesheet"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimesheetConfig {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub storage: StorageConfig,
    pub export_dir: PathBuf,
    pub overtime_threshold_hours: f64,
    pub log_level: String,
}

impl Default for TimesheetConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            storage: StorageConfig::default(),
            export_dir: PathBuf::from("."),
            overtime_threshold_hours: OVERTIME_THRESHOLD_HOURS,
            log_level: "warn".to_string(),
        }
    }
}

impl TimesheetConfig {
    /// Defaults, then `./timesheet.toml` if present, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Like [`TimesheetConfig::load`], reading `path` instead of the default
    /// file. An explicit path that does not exist is an error.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::InvalidValue {
                    field: "config",
                    reason: format!("{} does not exist", path.display()),
                });
            }
        }
        let config: Self = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if file.exists() {
            figment = figment.merge(Toml::file(file));
        }

        figment.merge(Env::prefixed("TIMESHEET_").split("__"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.overtime_threshold_hours.is_finite() || self.overtime_threshold_hours < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "overtime_threshold_hours",
                reason: format!(
                    "must be a non-negative number (got {})",
                    self.overtime_threshold_hours
                ),
            });
        }
        if self.storage.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage.path",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Opens the configured backend.
    pub fn open_store(&self) -> PersistenceResult<Box<dyn KeyValueStore>> {
        match self.storage.backend {
            StorageBackend::Json => Ok(Box::new(JsonFileStore::new(&self.storage.path)?)),
            #[cfg(feature = "sqlite")]
            StorageBackend::Sqlite => {
                if let Some(parent) = self.storage.path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                Ok(Box::new(crate::persistence::sqlite::SqliteStore::new(
                    &self.storage.path,
                )?))
            }
            #[cfg(not(feature = "sqlite"))]
            StorageBackend::Sqlite => Err(crate::persistence::PersistenceError::InvalidData(
                "sqlite backend requested but the `sqlite` feature is disabled".to_string(),
            )),
        }
    }
}
