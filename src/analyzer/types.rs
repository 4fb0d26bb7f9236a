//! Type definitions specific to the analyzer module.

use serde::Serialize;
use std::collections::BTreeMap;

/// One reported execution of a periodic task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutionRecord {
    /// Task slot reported by the scheduler.
    pub task_id: u32,
    /// Start of the execution, milliseconds since the log-local epoch.
    pub start_time_ms: i64,
    /// Measured execution time.
    pub duration_ms: u64,
    /// Whether the execution finished within its deadline.
    pub deadline_met: bool,
}

impl ExecutionRecord {
    /// End of the execution. This, not the start, bounds the timeline.
    pub fn end_time_ms(&self) -> i64 {
        self.start_time_ms.saturating_add_unsigned(self.duration_ms)
    }
}

/// Per-task classification derived from the miss rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskHealth {
    Optimal,
    Acceptable,
    Critical,
    /// Expected task with no recorded executions.
    Starved,
}

impl std::fmt::Display for TaskHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskHealth::Optimal => write!(f, "OPTIMAL"),
            TaskHealth::Acceptable => write!(f, "ACCEPTABLE"),
            TaskHealth::Critical => write!(f, "CRITICAL"),
            TaskHealth::Starved => write!(f, "STARVED"),
        }
    }
}

/// System-level classification derived from the overall miss rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemHealth {
    #[default]
    Healthy,
    Warning,
    Critical,
}

impl std::fmt::Display for SystemHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SystemHealth::Healthy => write!(f, "HEALTHY"),
            SystemHealth::Warning => write!(f, "WARNING"),
            SystemHealth::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Verdict comparing executions of the high and low priority bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FairnessVerdict {
    #[default]
    Balanced,
    HighPriorityDominance,
    PriorityInversion,
}

impl std::fmt::Display for FairnessVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FairnessVerdict::Balanced => write!(f, "BALANCED"),
            FairnessVerdict::HighPriorityDominance => write!(f, "HIGH_PRIORITY_DOMINANCE"),
            FairnessVerdict::PriorityInversion => write!(f, "PRIORITY_INVERSION"),
        }
    }
}

/// Aggregates over all records of a single task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStatistics {
    pub task_id: u32,
    pub count: u64,
    pub total_duration_ms: u64,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    pub miss_count: u64,
    pub average_duration_ms: f64,
    /// Percentage of executions that missed their deadline.
    pub miss_rate: f64,
    /// Percentage of the timeline spent executing this task.
    pub cpu_utilization: f64,
    pub health: TaskHealth,
}

impl TaskStatistics {
    pub fn met_count(&self) -> u64 {
        self.count - self.miss_count
    }

    /// Percentage of executions that met their deadline.
    pub fn compliance_rate(&self) -> f64 {
        100.0 - self.miss_rate
    }
}

/// Task ids of each priority band and the executions recorded for them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriorityBands {
    pub high_priority_tasks: Vec<u32>,
    pub low_priority_tasks: Vec<u32>,
    pub high_priority_executions: u64,
    pub low_priority_executions: u64,
}

/// Whole-log view: time span, totals and verdicts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimelineSummary {
    pub start_time_ms: i64,
    pub end_time_ms: i64,
    pub duration_ms: u64,
    pub total_executions: u64,
    pub total_misses: u64,
    pub overall_miss_rate: f64,
    pub health: SystemHealth,
    pub fairness_verdict: FairnessVerdict,
    pub priority_bands: PriorityBands,
    /// Expected tasks with no recorded executions.
    pub starved_tasks: Vec<u32>,
}

/// Placement of one record on the timeline, in milliseconds relative to the
/// summary start. Pixel mapping is left to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineLayout {
    pub task_id: u32,
    pub row_index: usize,
    pub relative_start: u64,
    pub relative_end: u64,
    pub duration_ms: u64,
    pub deadline_met: bool,
    /// Zero-length execution; still has to be drawn.
    pub is_degenerate: bool,
}

impl TimelineLayout {
    /// Position of the start within a span of `span_ms`, in `[0, 1]`.
    pub fn start_fraction(&self, span_ms: u64) -> f64 {
        fraction(self.relative_start, span_ms)
    }

    /// Position of the end within a span of `span_ms`, in `[0, 1]`.
    pub fn end_fraction(&self, span_ms: u64) -> f64 {
        fraction(self.relative_end, span_ms)
    }
}

fn fraction(offset: u64, span_ms: u64) -> f64 {
    if span_ms == 0 {
        0.0
    } else {
        (offset as f64 / span_ms as f64).clamp(0.0, 1.0)
    }
}

/// Grid lines for the time axis of a timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeAxis {
    pub interval_ms: u64,
    /// Absolute tick times (same epoch as the records).
    pub ticks: Vec<i64>,
}

/// Everything derived from one record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    pub per_task: BTreeMap<u32, TaskStatistics>,
    pub summary: TimelineSummary,
    pub layout: Vec<TimelineLayout>,
}

impl Analysis {
    /// Health of a task, including tasks that never ran.
    pub fn task_health(&self, task_id: u32) -> TaskHealth {
        self.per_task.get(&task_id).map(|s| s.health).unwrap_or(TaskHealth::Starved)
    }
}
