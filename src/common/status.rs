//! Status snapshot parsing.
//!
//! The status interface starts with `Key: Value` lines describing the
//! scheduler and each task, followed by the execution log section:
//!
//! ```text
//! AvionicsSystem: Multi-Task Simulator
//! SchedulerStatus: RUNNING
//! ActiveTasks: 5
//! ---
//! Task0_Name: Flight Attitude Monitor
//! Task0_Priority: 0
//! Task0_Period: 100
//! ...
//! ---
//! EXECUTION_LOG:
//! EXEC:0,1200,30,MET
//! ```
//!
//! Older single-task modules report `TaskName`, `PeriodMS`, ... without a
//! task index; those keys are mapped onto task 0.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::analyzer::LOG_SECTION_MARKER;

/// Run state reported for a task.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum TaskState {
    Executing,
    Ready,
    Idle,
    Disabled,
    #[default]
    Unknown,
}

impl TaskState {
    fn from_token(token: &str) -> Self {
        match token {
            "EXECUTING" => TaskState::Executing,
            "READY" => TaskState::Ready,
            "IDLE" => TaskState::Idle,
            "DISABLED" => TaskState::Disabled,
            _ => TaskState::Unknown,
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskState::Executing => write!(f, "EXECUTING"),
            TaskState::Ready => write!(f, "READY"),
            TaskState::Idle => write!(f, "IDLE"),
            TaskState::Disabled => write!(f, "DISABLED"),
            TaskState::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Outcome of the last execution of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DeadlineResult {
    Met,
    Missed,
    /// Task has not run yet.
    #[default]
    NotAvailable,
}

impl DeadlineResult {
    fn from_token(token: &str) -> Self {
        match token {
            "MET" => DeadlineResult::Met,
            "MISSED" => DeadlineResult::Missed,
            _ => DeadlineResult::NotAvailable,
        }
    }
}

impl std::fmt::Display for DeadlineResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeadlineResult::Met => write!(f, "MET"),
            DeadlineResult::Missed => write!(f, "MISSED"),
            DeadlineResult::NotAvailable => write!(f, "N/A"),
        }
    }
}

/// Reported state of one task. Fields the producer did not report stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskSnapshot {
    pub name: Option<String>,
    pub priority: Option<u32>,
    pub period_ms: Option<u32>,
    pub deadline_ms: Option<u32>,
    pub workload_ms: Option<u32>,
    pub status: TaskState,
    pub last_exec_time_ms: Option<u64>,
    pub last_deadline_result: DeadlineResult,
    pub met_count: Option<u64>,
    pub missed_count: Option<u64>,
    pub total_executions: Option<u64>,
    pub enabled: Option<bool>,
    /// Keys this parser does not know about.
    pub extra: BTreeMap<String, String>,
}

impl TaskSnapshot {
    fn apply(&mut self, field: &str, value: &str) {
        match field {
            "Name" => self.name = Some(value.to_string()),
            "Priority" => self.priority = value.parse().ok(),
            "Period" => self.period_ms = value.parse().ok(),
            "Deadline" => self.deadline_ms = value.parse().ok(),
            "Workload" => self.workload_ms = value.parse().ok(),
            "Status" => self.status = TaskState::from_token(value),
            "LastExecTime" => self.last_exec_time_ms = value.parse().ok(),
            "LastDeadlineResult" => self.last_deadline_result = DeadlineResult::from_token(value),
            "MetCount" => self.met_count = value.parse().ok(),
            "MissedCount" => self.missed_count = value.parse().ok(),
            "TotalExecs" => self.total_executions = value.parse().ok(),
            "Enabled" => self.enabled = Some(value == "YES"),
            _ => {
                self.extra.insert(field.to_string(), value.to_string());
            }
        }
    }

    /// Whether the last execution took longer than the deadline.
    pub fn exceeded_deadline(&self) -> bool {
        match (self.last_exec_time_ms, self.deadline_ms) {
            (Some(exec), Some(deadline)) => exec > u64::from(deadline),
            _ => false,
        }
    }
}

/// Parsed status section of the scheduler interface.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusSnapshot {
    /// Scheduler-level keys (`SchedulerStatus`, `ActiveTasks`, ...).
    pub system: BTreeMap<String, String>,
    pub tasks: BTreeMap<u32, TaskSnapshot>,
}

impl StatusSnapshot {
    pub fn scheduler_status(&self) -> Option<&str> {
        self.system.get("SchedulerStatus").map(String::as_str)
    }

    pub fn is_scheduler_running(&self) -> bool {
        self.scheduler_status() == Some("RUNNING")
    }

    pub fn active_tasks(&self) -> Option<u32> {
        self.system.get("ActiveTasks")?.parse().ok()
    }

    pub fn system_finished(&self) -> bool {
        self.system.get("SystemFinished").is_some_and(|v| v == "YES")
    }

    pub fn execution_log_count(&self) -> Option<u64> {
        self.system.get("ExecutionLogCount")?.parse().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.tasks.is_empty()
    }
}

/// Parse the status section of a full status text. Stops at the log marker.
pub fn parse_status_snapshot(raw_text: &str) -> StatusSnapshot {
    let mut snapshot = StatusSnapshot::default();

    for line in raw_text.lines() {
        let line = line.trim();
        if line == LOG_SECTION_MARKER {
            break;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if let Some((task_id, field)) = split_task_key(key) {
            snapshot.tasks.entry(task_id).or_default().apply(field, value);
        } else if let Some(field) = legacy_task_field(key) {
            snapshot.tasks.entry(0).or_default().apply(field, value);
        } else {
            snapshot.system.insert(key.to_string(), value.to_string());
        }
    }

    snapshot
}

/// Split `Task3_Period` into `(3, "Period")`.
fn split_task_key(key: &str) -> Option<(u32, &str)> {
    let rest = key.strip_prefix("Task")?;
    let (index, field) = rest.split_once('_')?;
    Some((index.parse().ok()?, field))
}

/// Map keys of the single-task status format to task fields.
fn legacy_task_field(key: &str) -> Option<&'static str> {
    match key {
        "TaskName" => Some("Name"),
        "PeriodMS" => Some("Period"),
        "DeadlineMS" => Some("Deadline"),
        "CurrentWorkloadMS" => Some("Workload"),
        "TaskStatus" => Some("Status"),
        "LastExecTimeMS" => Some("LastExecTime"),
        "LastDeadlineResult" => Some("LastDeadlineResult"),
        "MetCount" => Some("MetCount"),
        "MissedCount" => Some("MissedCount"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTI_TASK: &str = "AvionicsSystem: Multi-Task Simulator\n\
        SchedulerStatus: RUNNING\n\
        SystemFinished: NO\n\
        ExecutionLogCount: 42\n\
        ActiveTasks: 2\n\
        ---\n\
        Task0_Name: Flight Attitude Monitor\n\
        Task0_Priority: 0\n\
        Task0_Period: 100\n\
        Task0_Deadline: 50\n\
        Task0_Workload: 30\n\
        Task0_Status: EXECUTING\n\
        Task0_LastExecTime: 62\n\
        Task0_LastDeadlineResult: MISSED\n\
        Task0_MetCount: 10\n\
        Task0_MissedCount: 2\n\
        Task0_TotalExecs: 12\n\
        Task0_Enabled: YES\n\
        ---\n\
        Task1_Name: Engine Control\n\
        Task1_Status: READY\n\
        Task1_Enabled: NO\n\
        ---\n\
        EXECUTION_LOG:\n\
        EXEC:0,100,62,MISSED\n\
        Task9_Name: After Marker\n";

    #[test]
    fn test_parse_multi_task_snapshot() {
        let snapshot = parse_status_snapshot(MULTI_TASK);

        assert!(snapshot.is_scheduler_running());
        assert_eq!(snapshot.active_tasks(), Some(2));
        assert_eq!(snapshot.execution_log_count(), Some(42));
        assert!(!snapshot.system_finished());
        assert_eq!(snapshot.tasks.len(), 2);

        let task0 = &snapshot.tasks[&0];
        assert_eq!(task0.name.as_deref(), Some("Flight Attitude Monitor"));
        assert_eq!(task0.priority, Some(0));
        assert_eq!(task0.period_ms, Some(100));
        assert_eq!(task0.deadline_ms, Some(50));
        assert_eq!(task0.workload_ms, Some(30));
        assert_eq!(task0.status, TaskState::Executing);
        assert_eq!(task0.last_deadline_result, DeadlineResult::Missed);
        assert_eq!(task0.total_executions, Some(12));
        assert_eq!(task0.enabled, Some(true));
        assert!(task0.exceeded_deadline());

        let task1 = &snapshot.tasks[&1];
        assert_eq!(task1.status, TaskState::Ready);
        assert_eq!(task1.enabled, Some(false));
        assert_eq!(task1.last_deadline_result, DeadlineResult::NotAvailable);
        assert!(!task1.exceeded_deadline());
    }

    #[test]
    fn test_parse_legacy_snapshot() {
        let text = "TaskName: Flight Attitude Monitor\n\
                    PeriodMS: 1000\n\
                    DeadlineMS: 200\n\
                    CurrentWorkloadMS: 100\n\
                    TaskStatus: IDLE\n\
                    LastExecTimeMS: 100\n\
                    LastDeadlineResult: MET\n\
                    MetCount: 5\n\
                    MissedCount: 0\n\
                    ModuleStatus: Loaded\n";
        let snapshot = parse_status_snapshot(text);

        let task0 = &snapshot.tasks[&0];
        assert_eq!(task0.name.as_deref(), Some("Flight Attitude Monitor"));
        assert_eq!(task0.period_ms, Some(1000));
        assert_eq!(task0.workload_ms, Some(100));
        assert_eq!(task0.status, TaskState::Idle);
        assert_eq!(task0.last_deadline_result, DeadlineResult::Met);
        assert_eq!(task0.missed_count, Some(0));
        assert_eq!(snapshot.system.get("ModuleStatus").map(String::as_str), Some("Loaded"));
        assert_eq!(snapshot.scheduler_status(), None);
    }

    #[test]
    fn test_unknown_and_malformed_values() {
        let text = "Task2_Period: fast\nTask2_Color: red\nno colon here\nTaskX_Name: bad index\n";
        let snapshot = parse_status_snapshot(text);

        let task2 = &snapshot.tasks[&2];
        assert_eq!(task2.period_ms, None);
        assert_eq!(task2.extra.get("Color").map(String::as_str), Some("red"));
        assert_eq!(snapshot.system.get("TaskX_Name").map(String::as_str), Some("bad index"));
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(parse_status_snapshot("").is_empty());
        assert!(parse_status_snapshot("EXECUTION_LOG:\nEXEC:0,1,1,MET\n").is_empty());
    }
}
