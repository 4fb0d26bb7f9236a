//! Deadline compliance, utilization and fairness statistics.

use std::collections::{BTreeMap, BTreeSet};

use super::types::{
    ExecutionRecord, FairnessVerdict, PriorityBands, SystemHealth, TaskHealth, TaskStatistics, TimelineSummary,
};

/// Miss rate (percent) from which a task is classified critical.
const TASK_CRITICAL_MISS_RATE: f64 = 10.0;

/// Overall miss rate (percent) above which the system is classified critical.
const SYSTEM_CRITICAL_MISS_RATE: f64 = 20.0;

/// High band executions above this multiple of low band executions count as dominance.
const DOMINANCE_FACTOR: u64 = 3;

/// Time span of a record set: `(start, end)`, or `None` when empty.
pub fn timeline_span(records: &[ExecutionRecord]) -> Option<(i64, i64)> {
    let start = records.iter().map(|r| r.start_time_ms).min()?;
    let end = records.iter().map(ExecutionRecord::end_time_ms).max()?;
    Some((start, end))
}

/// Group records by task and compute per-task aggregates.
///
/// `timeline_duration_ms` is the span used for CPU utilization; utilization is
/// zero when it is zero.
pub fn task_statistics(records: &[ExecutionRecord], timeline_duration_ms: u64) -> BTreeMap<u32, TaskStatistics> {
    let mut per_task: BTreeMap<u32, TaskStatistics> = BTreeMap::new();

    for record in records {
        let stats = per_task.entry(record.task_id).or_insert_with(|| TaskStatistics {
            task_id: record.task_id,
            count: 0,
            total_duration_ms: 0,
            min_duration_ms: u64::MAX,
            max_duration_ms: 0,
            miss_count: 0,
            average_duration_ms: 0.0,
            miss_rate: 0.0,
            cpu_utilization: 0.0,
            health: TaskHealth::Optimal,
        });

        stats.count += 1;
        stats.total_duration_ms = stats.total_duration_ms.saturating_add(record.duration_ms);
        stats.min_duration_ms = stats.min_duration_ms.min(record.duration_ms);
        stats.max_duration_ms = stats.max_duration_ms.max(record.duration_ms);
        if !record.deadline_met {
            stats.miss_count += 1;
        }
    }

    // Entries only exist for tasks with at least one record, so count > 0.
    for stats in per_task.values_mut() {
        stats.average_duration_ms = stats.total_duration_ms as f64 / stats.count as f64;
        stats.miss_rate = stats.miss_count as f64 / stats.count as f64 * 100.0;
        stats.cpu_utilization = if timeline_duration_ms > 0 {
            stats.total_duration_ms as f64 / timeline_duration_ms as f64 * 100.0
        } else {
            0.0
        };
        stats.health = classify_task(stats.miss_count, stats.miss_rate);
    }

    per_task
}

/// Classify a task with at least one execution.
pub fn classify_task(miss_count: u64, miss_rate: f64) -> TaskHealth {
    if miss_count == 0 {
        TaskHealth::Optimal
    } else if miss_rate < TASK_CRITICAL_MISS_RATE {
        TaskHealth::Acceptable
    } else {
        TaskHealth::Critical
    }
}

/// Classify the system from its overall miss rate (percent).
pub fn classify_system(overall_miss_rate: f64) -> SystemHealth {
    if overall_miss_rate > SYSTEM_CRITICAL_MISS_RATE {
        SystemHealth::Critical
    } else if overall_miss_rate > 0.0 {
        SystemHealth::Warning
    } else {
        SystemHealth::Healthy
    }
}

/// Split the task universe into priority bands and count executions per band.
///
/// The universe is every observed task plus every expected task. Lower ids
/// have higher priority; the lowest `high_priority_count` ids form the high band.
pub fn priority_bands(
    per_task: &BTreeMap<u32, TaskStatistics>,
    expected_tasks: &[u32],
    high_priority_count: usize,
) -> PriorityBands {
    let universe: BTreeSet<u32> = per_task.keys().copied().chain(expected_tasks.iter().copied()).collect();

    let mut bands = PriorityBands::default();
    for (rank, task_id) in universe.into_iter().enumerate() {
        let executions = per_task.get(&task_id).map(|s| s.count).unwrap_or(0);
        if rank < high_priority_count {
            bands.high_priority_tasks.push(task_id);
            bands.high_priority_executions += executions;
        } else {
            bands.low_priority_tasks.push(task_id);
            bands.low_priority_executions += executions;
        }
    }
    bands
}

/// Compare band execution totals.
pub fn fairness_verdict(bands: &PriorityBands) -> FairnessVerdict {
    let high = bands.high_priority_executions;
    let low = bands.low_priority_executions;

    if low == 0 && high > 0 {
        FairnessVerdict::PriorityInversion
    } else if high > low.saturating_mul(DOMINANCE_FACTOR) {
        FairnessVerdict::HighPriorityDominance
    } else {
        FairnessVerdict::Balanced
    }
}

/// Build the summary for a record set.
pub fn summarize(
    records: &[ExecutionRecord],
    per_task: &BTreeMap<u32, TaskStatistics>,
    expected_tasks: &[u32],
    high_priority_count: usize,
) -> TimelineSummary {
    let (start_time_ms, end_time_ms) = timeline_span(records).unwrap_or((0, 0));
    let total_executions = records.len() as u64;
    let total_misses = records.iter().filter(|r| !r.deadline_met).count() as u64;
    let overall_miss_rate = if total_executions > 0 {
        total_misses as f64 / total_executions as f64 * 100.0
    } else {
        0.0
    };

    let priority_bands = priority_bands(per_task, expected_tasks, high_priority_count);
    let fairness_verdict = fairness_verdict(&priority_bands);

    let mut starved_tasks: Vec<u32> = expected_tasks.iter().copied().filter(|id| !per_task.contains_key(id)).collect();
    starved_tasks.sort_unstable();
    starved_tasks.dedup();

    TimelineSummary {
        start_time_ms,
        end_time_ms,
        duration_ms: end_time_ms.abs_diff(start_time_ms),
        total_executions,
        total_misses,
        overall_miss_rate,
        health: classify_system(overall_miss_rate),
        fairness_verdict,
        priority_bands,
        starved_tasks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(task_id: u32, start_time_ms: i64, duration_ms: u64, deadline_met: bool) -> ExecutionRecord {
        ExecutionRecord {
            task_id,
            start_time_ms,
            duration_ms,
            deadline_met,
        }
    }

    #[test]
    fn test_span_uses_end_times() {
        let records = vec![record(0, 50, 500, true), record(1, 0, 10, true), record(2, 300, 10, true)];
        assert_eq!(timeline_span(&records), Some((0, 550)));
        assert_eq!(timeline_span(&[]), None);
    }

    #[test]
    fn test_task_aggregates() {
        let records = vec![record(0, 0, 100, true), record(0, 200, 40, false), record(1, 50, 50, true)];
        let per_task = task_statistics(&records, 300);

        let task0 = &per_task[&0];
        assert_eq!(task0.count, 2);
        assert_eq!(task0.total_duration_ms, 140);
        assert_eq!(task0.min_duration_ms, 40);
        assert_eq!(task0.max_duration_ms, 100);
        assert_eq!(task0.miss_count, 1);
        assert_eq!(task0.met_count(), 1);
        assert!((task0.average_duration_ms - 70.0).abs() < 1e-9);
        assert!((task0.miss_rate - 50.0).abs() < 1e-9);
        assert!((task0.cpu_utilization - 140.0 / 3.0).abs() < 1e-9);
        assert_eq!(task0.health, TaskHealth::Critical);

        let task1 = &per_task[&1];
        assert_eq!(task1.miss_count, 0);
        assert_eq!(task1.miss_rate, 0.0);
        assert_eq!(task1.health, TaskHealth::Optimal);
    }

    #[test]
    fn test_zero_timeline_has_zero_utilization() {
        let per_task = task_statistics(&[record(3, 10, 0, true)], 0);
        assert_eq!(per_task[&3].cpu_utilization, 0.0);
    }

    #[test]
    fn test_task_classification_thresholds() {
        assert_eq!(classify_task(0, 0.0), TaskHealth::Optimal);
        assert_eq!(classify_task(1, 5.0), TaskHealth::Acceptable);
        assert_eq!(classify_task(1, 9.99), TaskHealth::Acceptable);
        assert_eq!(classify_task(1, 10.0), TaskHealth::Critical);
    }

    #[test]
    fn test_system_classification_thresholds() {
        assert_eq!(classify_system(0.0), SystemHealth::Healthy);
        assert_eq!(classify_system(0.1), SystemHealth::Warning);
        assert_eq!(classify_system(20.0), SystemHealth::Warning);
        assert_eq!(classify_system(20.1), SystemHealth::Critical);
    }

    #[test]
    fn test_fairness_verdicts() {
        let records = vec![record(0, 0, 1, true), record(1, 0, 1, true)];
        let per_task = task_statistics(&records, 1);
        let bands = priority_bands(&per_task, &[0, 1, 2, 3, 4], 2);
        assert_eq!(bands.high_priority_tasks, vec![0, 1]);
        assert_eq!(bands.low_priority_tasks, vec![2, 3, 4]);
        assert_eq!(fairness_verdict(&bands), FairnessVerdict::PriorityInversion);

        let mut records: Vec<ExecutionRecord> = (0..7).map(|i| record(i % 2, i as i64, 1, true)).collect();
        records.push(record(3, 0, 1, true));
        let per_task = task_statistics(&records, 10);
        let bands = priority_bands(&per_task, &[0, 1, 2, 3, 4], 2);
        assert_eq!(bands.high_priority_executions, 7);
        assert_eq!(bands.low_priority_executions, 1);
        assert_eq!(fairness_verdict(&bands), FairnessVerdict::HighPriorityDominance);

        let records = vec![record(0, 0, 1, true), record(2, 0, 1, true), record(4, 0, 1, true)];
        let per_task = task_statistics(&records, 1);
        let bands = priority_bands(&per_task, &[], 2);
        assert_eq!(bands.high_priority_tasks, vec![0, 2]);
        assert_eq!(fairness_verdict(&bands), FairnessVerdict::Balanced);
    }

    #[test]
    fn test_no_executions_is_balanced() {
        let bands = priority_bands(&BTreeMap::new(), &[0, 1, 2], 2);
        assert_eq!(fairness_verdict(&bands), FairnessVerdict::Balanced);
    }

    #[test]
    fn test_band_boundary_is_configurable() {
        let records = vec![record(0, 0, 1, true), record(1, 0, 1, true), record(2, 0, 1, true)];
        let per_task = task_statistics(&records, 1);
        let bands = priority_bands(&per_task, &[], 3);
        assert!(bands.low_priority_tasks.is_empty());
        assert_eq!(fairness_verdict(&bands), FairnessVerdict::PriorityInversion);

        let bands = priority_bands(&per_task, &[], 0);
        assert_eq!(bands.low_priority_executions, 3);
        assert_eq!(fairness_verdict(&bands), FairnessVerdict::Balanced);
    }

    #[test]
    fn test_summary_lists_starved_tasks() {
        let records = vec![record(0, 0, 10, true), record(2, 5, 10, false)];
        let per_task = task_statistics(&records, 15);
        let summary = summarize(&records, &per_task, &[4, 0, 1, 2, 3], 2);
        assert_eq!(summary.starved_tasks, vec![1, 3, 4]);
        assert_eq!(summary.total_misses, 1);
        assert_eq!(summary.health, SystemHealth::Critical);
    }
}
