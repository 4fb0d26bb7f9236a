//! Writing task tuning parameters to the scheduler module.
//!
//! Each task exposes three writable files under the module's parameter
//! directory: `<prefix>_period_ms`, `<prefix>_deadline_ms` and
//! `<prefix>_workload_ms`. The files must already exist; a missing file means
//! the module is not loaded.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::config::TaskConfig;

/// Workload cap used by the stress test.
pub const STRESS_WORKLOAD_CAP_MS: u32 = 1000;
/// Factor applied to the current workload by the stress test.
pub const STRESS_WORKLOAD_FACTOR: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum TaskParameter {
    Period,
    Deadline,
    Workload,
}

impl TaskParameter {
    pub const ALL: [TaskParameter; 3] = [TaskParameter::Period, TaskParameter::Deadline, TaskParameter::Workload];

    /// Name used in the parameter file name.
    pub fn file_stem(self) -> &'static str {
        match self {
            TaskParameter::Period => "period",
            TaskParameter::Deadline => "deadline",
            TaskParameter::Workload => "workload",
        }
    }

    /// One-letter label used by the task grid.
    pub fn short_label(self) -> &'static str {
        match self {
            TaskParameter::Period => "P",
            TaskParameter::Deadline => "D",
            TaskParameter::Workload => "W",
        }
    }
}

impl std::fmt::Display for TaskParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_stem())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    /// Value is not a positive decimal integer.
    InvalidValue(String),
    UnknownTask(u32),
    ModuleNotLoaded(PathBuf),
    PermissionDenied(PathBuf),
    Io(PathBuf, String),
}

impl std::fmt::Display for ParameterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterError::InvalidValue(value) => {
                write!(f, "Invalid value '{}': expected a positive integer", value)
            }
            ParameterError::UnknownTask(task_id) => write!(f, "Unknown task {}", task_id),
            ParameterError::ModuleNotLoaded(path) => {
                write!(f, "{} not found. Is the kernel module loaded?", path.display())
            }
            ParameterError::PermissionDenied(path) => {
                write!(f, "Permission denied writing {}. Run with root privileges.", path.display())
            }
            ParameterError::Io(path, msg) => write!(f, "Failed to write {}: {}", path.display(), msg),
        }
    }
}

impl std::error::Error for ParameterError {}

/// Parse an operator-entered parameter value.
pub fn validate_parameter_value(value: &str) -> Result<u32, ParameterError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParameterError::InvalidValue(value.to_string()));
    }
    match trimmed.parse::<u32>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ParameterError::InvalidValue(value.to_string())),
    }
}

/// Workload applied by the stress test: the current workload tripled, capped.
pub fn stress_workload(current_ms: u32) -> u32 {
    current_ms.saturating_mul(STRESS_WORKLOAD_FACTOR).min(STRESS_WORKLOAD_CAP_MS)
}

/// Result of applying several updates to one task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterOutcome {
    pub applied: Vec<(TaskParameter, u32)>,
    pub failures: Vec<(TaskParameter, ParameterError)>,
}

impl ParameterOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Short human-readable summary for the status bar.
    pub fn describe(&self, task_name: &str) -> String {
        let applied = self
            .applied
            .iter()
            .map(|(p, v)| format!("{}={}", p.short_label(), v))
            .collect::<Vec<_>>()
            .join(", ");

        match self.failures.first() {
            None => format!("Updated {}: {}", task_name, applied),
            Some((parameter, err)) => format!("Failed to set {} {}: {}", task_name, parameter, err),
        }
    }
}

/// Writes parameter files for the configured tasks.
#[derive(Debug, Clone)]
pub struct ParameterWriter {
    parameter_dir: PathBuf,
    prefixes: BTreeMap<u32, String>,
}

impl ParameterWriter {
    pub fn new(parameter_dir: impl Into<PathBuf>, tasks: &[TaskConfig]) -> Self {
        Self {
            parameter_dir: parameter_dir.into(),
            prefixes: tasks.iter().map(|t| (t.id, t.parameter_prefix.clone())).collect(),
        }
    }

    pub fn parameter_dir(&self) -> &Path {
        &self.parameter_dir
    }

    pub fn parameter_path(&self, prefix: &str, parameter: TaskParameter) -> PathBuf {
        self.parameter_dir.join(format!("{}_{}_ms", prefix, parameter.file_stem()))
    }

    /// Write one parameter. The file is opened without `create`.
    pub fn write(&self, prefix: &str, parameter: TaskParameter, value: u32) -> Result<(), ParameterError> {
        if value == 0 {
            return Err(ParameterError::InvalidValue(value.to_string()));
        }

        let path = self.parameter_path(prefix, parameter);
        let result = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)
            .and_then(|mut file| file.write_all(value.to_string().as_bytes()));

        match result {
            Ok(()) => {
                log::info!("Set {} = {} ms", path.display(), value);
                Ok(())
            }
            Err(e) => {
                let err = match e.kind() {
                    ErrorKind::NotFound => ParameterError::ModuleNotLoaded(path),
                    ErrorKind::PermissionDenied => ParameterError::PermissionDenied(path),
                    _ => ParameterError::Io(path, e.to_string()),
                };
                log::warn!("{}", err);
                Err(err)
            }
        }
    }

    /// Validate and apply several raw updates to one task.
    ///
    /// Every update is attempted; failures do not stop later ones.
    pub fn apply(&self, task_id: u32, updates: &[(TaskParameter, String)]) -> Result<ParameterOutcome, ParameterError> {
        let prefix = self.prefixes.get(&task_id).ok_or(ParameterError::UnknownTask(task_id))?;

        let mut outcome = ParameterOutcome::default();
        for (parameter, raw) in updates {
            match validate_parameter_value(raw).and_then(|value| self.write(prefix, *parameter, value).map(|()| value)) {
                Ok(value) => outcome.applied.push((*parameter, value)),
                Err(err) => outcome.failures.push((*parameter, err)),
            }
        }
        Ok(outcome)
    }
}
