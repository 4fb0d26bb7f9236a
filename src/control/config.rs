//! Monitor configuration loaded from `avionics-monitor.toml`.

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::analyzer::{AnalyzerConfig, RowPolicy};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "avionics-monitor.toml";
/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "AVIONICS_MONITOR_CONFIG";
/// Lower bound for the refresh interval.
pub const MIN_REFRESH_INTERVAL_MS: u64 = 100;

#[derive(Debug)]
pub enum ConfigLoadError {
    FileReadError(String),
    ParseError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigLoadError::FileReadError(msg) => write!(f, "Failed to read config file: {}", msg),
            ConfigLoadError::ParseError(msg) => write!(f, "Failed to parse config file: {}", msg),
            ConfigLoadError::ValidationError(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigLoadError {}

/// One scheduled task as known to the monitor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TaskConfig {
    pub id: u32,
    pub name: String,
    /// Prefix of the task's parameter files, e.g. `attitude` for `attitude_period_ms`.
    pub parameter_prefix: String,
}

impl TaskConfig {
    fn new(id: u32, name: &str, parameter_prefix: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            parameter_prefix: parameter_prefix.to_string(),
        }
    }
}

/// Top-level monitor configuration. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MonitorConfig {
    /// Status file exposed by the scheduler module.
    pub status_path: PathBuf,
    /// Directory holding the writable task parameters.
    pub parameter_dir: PathBuf,
    pub refresh_interval_ms: u64,
    /// Number of lowest task ids treated as high priority.
    pub high_priority_tasks: usize,
    pub row_layout: RowPolicy,
    pub tasks: Vec<TaskConfig>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            status_path: PathBuf::from("/proc/avionics_status"),
            parameter_dir: PathBuf::from("/sys/module/avionics_sim/parameters"),
            refresh_interval_ms: 1000,
            high_priority_tasks: crate::analyzer::engine::DEFAULT_HIGH_PRIORITY_TASKS,
            row_layout: RowPolicy::Identity,
            tasks: vec![
                TaskConfig::new(0, "Flight Attitude Monitor", "attitude"),
                TaskConfig::new(1, "Engine Control", "engine"),
                TaskConfig::new(2, "Navigation System", "nav"),
                TaskConfig::new(3, "Communication System", "comm"),
                TaskConfig::new(4, "Cabin Systems", "cabin"),
            ],
        }
    }
}

impl MonitorConfig {
    /// Load and validate a configuration file.
    pub fn load(config_path: &Path) -> Result<Self, ConfigLoadError> {
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| ConfigLoadError::FileReadError(format!("{}: {}", config_path.display(), e)))?;

        let config = Self::from_toml(&content)?;
        log::info!("Loaded configuration from {}", config_path.display());
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigLoadError> {
        let config: MonitorConfig = toml::from_str(content).map_err(|e| ConfigLoadError::ParseError(e.to_string()))?;
        config.validate().map_err(ConfigLoadError::ValidationError)?;
        Ok(config)
    }

    /// Load the file at `config_path` if it exists, built-in defaults otherwise.
    pub fn load_or_default(config_path: &Path) -> Result<Self, ConfigLoadError> {
        if config_path.exists() {
            Self::load(config_path)
        } else {
            log::info!("No configuration at {}, using defaults", config_path.display());
            Ok(Self::default())
        }
    }

    /// Config file location: `AVIONICS_MONITOR_CONFIG` if set, else the working directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.refresh_interval_ms < MIN_REFRESH_INTERVAL_MS {
            return Err(format!(
                "refresh-interval-ms must be at least {} (got {})",
                MIN_REFRESH_INTERVAL_MS, self.refresh_interval_ms
            ));
        }

        let mut seen = HashSet::new();
        for task in &self.tasks {
            if !seen.insert(task.id) {
                return Err(format!("Duplicate task id {}", task.id));
            }
            if task.parameter_prefix.trim().is_empty() {
                return Err(format!("Task {} has an empty parameter-prefix", task.id));
            }
        }

        Ok(())
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            high_priority_count: self.high_priority_tasks,
            expected_tasks: self.tasks.iter().map(|t| t.id).collect(),
            row_policy: self.row_layout,
        }
    }

    pub fn task_names(&self) -> BTreeMap<u32, String> {
        self.tasks.iter().map(|t| (t.id, t.name.clone())).collect()
    }

    pub fn task(&self, task_id: u32) -> Option<&TaskConfig> {
        self.tasks.iter().find(|t| t.id == task_id)
    }
}
