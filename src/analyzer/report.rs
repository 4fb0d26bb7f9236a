//! Plain-text execution analysis report.
//!
//! Shown under the timeline in the UI and printed in headless mode.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::types::{Analysis, FairnessVerdict, TaskHealth};

const RULE_WIDTH: usize = 60;

/// Render the report. `task_names` supplies display names; unknown ids are
/// shown as `Task <id>`.
pub fn render_report(analysis: &Analysis, task_names: &BTreeMap<u32, String>) -> String {
    Report { analysis, task_names }.to_string()
}

struct Report<'a> {
    analysis: &'a Analysis,
    task_names: &'a BTreeMap<u32, String>,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_report(f, self.analysis, self.task_names)
    }
}

fn write_report(f: &mut fmt::Formatter<'_>, analysis: &Analysis, task_names: &BTreeMap<u32, String>) -> fmt::Result {
    let summary = &analysis.summary;

    writeln!(f, "EXECUTION ANALYSIS REPORT")?;
    writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(f, "Total Executions: {}", summary.total_executions)?;
    writeln!(
        f,
        "Timeline Duration: {} ms ({:.1} seconds)",
        summary.duration_ms,
        summary.duration_ms as f64 / 1000.0
    )?;
    writeln!(
        f,
        "Total Deadline Violations: {} ({:.1}%)",
        summary.total_misses, summary.overall_miss_rate
    )?;
    writeln!(f, "System Health: {}", summary.health)?;

    writeln!(f, "\nTASK BREAKDOWN:")?;
    writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;

    let task_ids: BTreeSet<u32> = analysis
        .per_task
        .keys()
        .chain(summary.starved_tasks.iter())
        .copied()
        .collect();

    for task_id in task_ids {
        writeln!(f, "\nP{}: {}", task_id, task_name(task_names, task_id))?;
        match analysis.per_task.get(&task_id) {
            Some(stats) => {
                writeln!(f, "  Executions: {}", stats.count)?;
                writeln!(f, "  Avg Duration: {:.1} ms", stats.average_duration_ms)?;
                writeln!(
                    f,
                    "  Duration Range: {} - {} ms",
                    stats.min_duration_ms, stats.max_duration_ms
                )?;
                writeln!(
                    f,
                    "  Deadline Compliance: {}/{} ({:.1}%)",
                    stats.met_count(),
                    stats.count,
                    stats.compliance_rate()
                )?;
                writeln!(f, "  Deadline Misses: {} ({:.1}%)", stats.miss_count, stats.miss_rate)?;
                writeln!(f, "  CPU Utilization: {:.1}%", stats.cpu_utilization)?;
                writeln!(f, "  Status: {}", stats.health)?;
            }
            None => {
                writeln!(f, "  No executions recorded")?;
                writeln!(f, "  Status: {} - task not running", TaskHealth::Starved)?;
            }
        }
    }

    let bands = &summary.priority_bands;
    let high = band_label(&bands.high_priority_tasks);
    let low = band_label(&bands.low_priority_tasks);

    writeln!(f, "\nPRIORITY ANALYSIS:")?;
    writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;
    match summary.fairness_verdict {
        FairnessVerdict::PriorityInversion => {
            writeln!(f, "PRIORITY INVERSION DETECTED")?;
            writeln!(f, "High-priority tasks ({}) monopolizing CPU", high)?;
            writeln!(f, "Low-priority tasks ({}) starved", low)?;
        }
        FairnessVerdict::HighPriorityDominance => {
            writeln!(f, "HIGH PRIORITY DOMINANCE")?;
            writeln!(f, "High-priority: {} executions", bands.high_priority_executions)?;
            writeln!(f, "Low-priority: {} executions", bands.low_priority_executions)?;
        }
        FairnessVerdict::Balanced => {
            writeln!(f, "BALANCED EXECUTION")?;
            writeln!(f, "Priority scheduling working correctly")?;
        }
    }

    Ok(())
}

/// Display name of a task.
pub fn task_name(task_names: &BTreeMap<u32, String>, task_id: u32) -> String {
    task_names.get(&task_id).cloned().unwrap_or_else(|| format!("Task {}", task_id))
}

/// Comma separated `P<id>` list, or `none`.
pub fn band_label(task_ids: &[u32]) -> String {
    if task_ids.is_empty() {
        return "none".to_string();
    }
    task_ids.iter().map(|id| format!("P{}", id)).collect::<Vec<_>>().join(", ")
}
