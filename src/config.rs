use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::TimesheetError;
use crate::services::autosave::AutosaveConfig;

/// Crate configuration, loaded from a TOML file.
///
/// Every section is optional; missing values fall back to the defaults below.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub sync: SyncConfig,
    pub autosave: AutosaveSettings,
    pub holidays: HolidaysConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for the per-user document tree.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Server base URL the HTTP client talks to.
    pub base_url: String,
    /// Opaque placement token forwarded as AUTH_ID, when the deployment
    /// provides one.
    pub auth_id: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            auth_id: None,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutosaveSettings {
    pub debounce_ms: u64,
    pub retry_delay_ms: u64,
    pub max_attempts: u32,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 1500,
            retry_delay_ms: 1000,
            max_attempts: 3,
        }
    }
}

impl AutosaveSettings {
    pub fn to_autosave_config(&self) -> AutosaveConfig {
        AutosaveConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            max_attempts: self.max_attempts,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HolidaysConfig {
    /// JSON file mapping year to a list of ISO holiday dates.
    pub file: PathBuf,
}

impl Default for HolidaysConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("./config/holidays.json"),
        }
    }
}

impl AppConfig {
    /// Loads the configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TimesheetError> {
        let content = std::fs::read_to_string(path.as_ref())?;

        toml::from_str(&content)
            .map_err(|e| TimesheetError::Other(format!("config parse failed: {}", e)))
    }
}
