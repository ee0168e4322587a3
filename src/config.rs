//! Runtime configuration shared by the three services.
//!
//! Every section has defaults, so an empty or partial TOML file is valid:
//!
//! ```toml
//! [sidecar]
//! base_url = "http://localhost:3500"
//! pubsub_name = "kafka-pubsub"
//!
//! [reminders]
//! max_retries = 3
//! retry_backoff_secs = [60, 300, 900]
//! ```

use crate::reminder::domain::ReminderPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "TASKFLOW_CONFIG";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The file was not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskflowConfig {
    /// Sidecar (pub/sub and jobs) endpoints.
    pub sidecar: SidecarConfig,
    /// Reminder offset bounds and retry policy.
    pub reminders: ReminderPolicy,
    /// Recurring-task worker settings.
    pub recurring: RecurringWorkerConfig,
    /// Listen addresses.
    pub server: ServerConfig,
    /// Logging defaults.
    pub logging: LoggingConfig,
}

impl TaskflowConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads the file named by [`CONFIG_PATH_ENV`], or defaults when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the named file cannot be loaded.
    pub fn from_env() -> Result<Self, ConfigError> {
        std::env::var_os(CONFIG_PATH_ENV)
            .map_or_else(|| Ok(Self::default()), |path| Self::load(Path::new(&path)))
    }
}

/// Sidecar endpoints used for pub/sub and job scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidecarConfig {
    /// Sidecar HTTP base URL.
    pub base_url: String,
    /// Pub/sub component name.
    pub pubsub_name: String,
    /// Jobs API version path segment.
    pub jobs_api_version: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// User events are attributed to in single-user deployments.
    pub default_user_id: String,
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3500".to_owned(),
            pubsub_name: "kafka-pubsub".to_owned(),
            jobs_api_version: "v1.0-alpha1".to_owned(),
            request_timeout_secs: 10,
            default_user_id: "1".to_owned(),
        }
    }
}

impl SidecarConfig {
    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL of the jobs API, e.g. `http://localhost:3500/v1.0-alpha1`.
    #[must_use]
    pub fn jobs_base_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.jobs_api_version.trim_matches('/')
        )
    }
}

/// Recurring-task worker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurringWorkerConfig {
    /// Backend base URL used to create next occurrences.
    pub backend_base_url: String,
}

impl Default for RecurringWorkerConfig {
    fn default() -> Self {
        Self {
            backend_base_url: "http://localhost:8000".to_owned(),
        }
    }
}

/// Listen addresses for the deployable services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Backend (tasks, reminders, job callbacks).
    pub backend_addr: String,
    /// Recurring-task worker.
    pub recurring_addr: String,
    /// Notification service.
    pub notification_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            backend_addr: "0.0.0.0:8000".to_owned(),
            recurring_addr: "0.0.0.0:8001".to_owned(),
            notification_addr: "0.0.0.0:8002".to_owned(),
        }
    }
}

/// Logging defaults applied when `RUST_LOG` is unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directive.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
        }
    }
}
