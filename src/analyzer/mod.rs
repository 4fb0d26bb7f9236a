//! Execution log analytics.
//!
//! Turns the execution log reported by the scheduler into:
//! - per-task deadline and utilization statistics
//! - a system health and priority fairness summary
//! - a pixel-independent timeline layout for the Gantt view
//!
//! Everything here is a pure function of its input. Reading the status file
//! and drawing the results live in `monitor` and `ui`.

pub mod engine;
pub mod layout;
pub mod log_parser;
pub mod report;
pub mod statistics;
pub mod types;

pub use engine::{AnalyticsEngine, AnalyzerConfig};
pub use layout::{RowPolicy, time_axis};
pub use log_parser::{LOG_SECTION_MARKER, parse_execution_log};
pub use report::{band_label, render_report, task_name};
pub use types::{Analysis, FairnessVerdict, SystemHealth, TaskHealth, TimelineLayout};
