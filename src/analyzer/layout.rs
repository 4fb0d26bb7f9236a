//! Timeline layout for the Gantt view.
//!
//! Offsets stay in milliseconds; mapping them to pixels (and enforcing a
//! minimum visible bar width) is done by the renderer.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

use super::types::{ExecutionRecord, TimeAxis, TimelineLayout, TimelineSummary};

/// How task ids map to timeline rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowPolicy {
    /// Row index equals the task id.
    #[default]
    Identity,
    /// Row index is the rank of the task id among observed ids.
    Compact,
}

/// Place every record on the timeline.
///
/// The result is ordered by row, then by relative start. The sort is stable,
/// so overlapping executions of one task keep their log order on ties.
pub fn timeline_layout(records: &[ExecutionRecord], summary: &TimelineSummary, policy: RowPolicy) -> Vec<TimelineLayout> {
    let rows = assign_rows(records, policy);

    let mut layout: Vec<TimelineLayout> = records
        .iter()
        .map(|record| {
            let relative_start = record.start_time_ms.abs_diff(summary.start_time_ms);
            TimelineLayout {
                task_id: record.task_id,
                row_index: rows[&record.task_id],
                relative_start,
                relative_end: relative_start.saturating_add(record.duration_ms),
                duration_ms: record.duration_ms,
                deadline_met: record.deadline_met,
                is_degenerate: record.duration_ms == 0,
            }
        })
        .collect();

    layout.sort_by_key(|bar| (bar.row_index, bar.relative_start));
    layout
}

fn assign_rows(records: &[ExecutionRecord], policy: RowPolicy) -> BTreeMap<u32, usize> {
    let task_ids: BTreeSet<u32> = records.iter().map(|r| r.task_id).collect();
    match policy {
        RowPolicy::Identity => task_ids.into_iter().map(|id| (id, id as usize)).collect(),
        RowPolicy::Compact => task_ids.into_iter().enumerate().map(|(rank, id)| (id, rank)).collect(),
    }
}

/// Upper bound on grid lines; longer spans get a coarser whole-second interval.
const MAX_AXIS_TICKS: u64 = 200;

/// Grid interval and tick positions for the summary's time span.
///
/// The interval is a tenth of the span, at least 100 ms, rounded to one of
/// 100, 500 or 1000 ms.
pub fn time_axis(summary: &TimelineSummary) -> TimeAxis {
    if summary.total_executions == 0 {
        return TimeAxis::default();
    }

    let mut interval_ms = match (summary.duration_ms / 10).max(100) {
        i if i < 500 => 100,
        i if i < 1000 => 500,
        _ => 1000,
    };
    if summary.duration_ms / interval_ms > MAX_AXIS_TICKS {
        interval_ms = (summary.duration_ms / MAX_AXIS_TICKS).div_ceil(1000).saturating_mul(1000);
    }

    let Ok(step) = i64::try_from(interval_ms) else {
        return TimeAxis::default();
    };
    let Some(first) = summary.start_time_ms.div_euclid(step).checked_mul(step) else {
        return TimeAxis::default();
    };
    let ticks = std::iter::successors(Some(first), |t| t.checked_add(step))
        .take_while(|t| *t <= summary.end_time_ms)
        .filter(|t| *t >= summary.start_time_ms)
        .collect();

    TimeAxis { interval_ms, ticks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::statistics::{summarize, task_statistics};

    fn record(task_id: u32, start_time_ms: i64, duration_ms: u64, deadline_met: bool) -> ExecutionRecord {
        ExecutionRecord {
            task_id,
            start_time_ms,
            duration_ms,
            deadline_met,
        }
    }

    fn summary_for(records: &[ExecutionRecord]) -> TimelineSummary {
        let span = records
            .iter()
            .map(ExecutionRecord::end_time_ms)
            .max()
            .unwrap_or(0)
            .abs_diff(records.iter().map(|r| r.start_time_ms).min().unwrap_or(0));
        summarize(records, &task_statistics(records, span), &[], 2)
    }

    #[test]
    fn test_relative_offsets() {
        let records = vec![record(1, 1200, 30, true), record(0, 1000, 100, false)];
        let summary = summary_for(&records);
        let layout = timeline_layout(&records, &summary, RowPolicy::Identity);

        assert_eq!(layout[0].task_id, 0);
        assert_eq!(layout[0].relative_start, 0);
        assert_eq!(layout[0].relative_end, 100);
        assert!(!layout[0].deadline_met);
        assert_eq!(layout[1].task_id, 1);
        assert_eq!(layout[1].row_index, 1);
        assert_eq!(layout[1].relative_start, 200);
        assert_eq!(layout[1].relative_end, 230);
    }

    #[test]
    fn test_zero_duration_is_kept() {
        let records = vec![record(2, 10, 0, true), record(2, 0, 5, true)];
        let summary = summary_for(&records);
        let layout = timeline_layout(&records, &summary, RowPolicy::Identity);

        assert_eq!(layout.len(), 2);
        let point = layout.iter().find(|bar| bar.duration_ms == 0).unwrap();
        assert_eq!(point.relative_start, point.relative_end);
        assert!(point.is_degenerate);
    }

    #[test]
    fn test_same_row_sorted_by_start_and_overlaps_kept() {
        let records = vec![
            record(0, 300, 50, true),
            record(0, 100, 300, true),
            record(0, 150, 20, false),
            record(1, 0, 10, true),
        ];
        let summary = summary_for(&records);
        let layout = timeline_layout(&records, &summary, RowPolicy::Identity);

        let row0: Vec<u64> = layout.iter().filter(|b| b.row_index == 0).map(|b| b.relative_start).collect();
        assert_eq!(row0, vec![100, 150, 300]);
        assert_eq!(layout.len(), 4);
    }

    #[test]
    fn test_compact_rows_are_ranks() {
        let records = vec![record(7, 0, 1, true), record(3, 0, 1, true), record(42, 0, 1, true)];
        let summary = summary_for(&records);
        let layout = timeline_layout(&records, &summary, RowPolicy::Compact);
        let rows: Vec<(u32, usize)> = layout.iter().map(|b| (b.task_id, b.row_index)).collect();
        assert_eq!(rows, vec![(3, 0), (7, 1), (42, 2)]);

        let identity = timeline_layout(&records, &summary, RowPolicy::Identity);
        assert_eq!(identity.last().unwrap().row_index, 42);
    }

    #[test]
    fn test_time_axis_intervals() {
        let summary = summary_for(&[record(0, 0, 300, true)]);
        let axis = time_axis(&summary);
        assert_eq!(axis.interval_ms, 100);
        assert_eq!(axis.ticks, vec![0, 100, 200, 300]);

        let summary = summary_for(&[record(0, 1000, 7000, true)]);
        let axis = time_axis(&summary);
        assert_eq!(axis.interval_ms, 500);
        assert_eq!(axis.ticks.first(), Some(&1000));
        assert_eq!(axis.ticks.last(), Some(&8000));

        let summary = summary_for(&[record(0, 250, 20000, true)]);
        let axis = time_axis(&summary);
        assert_eq!(axis.interval_ms, 1000);
        assert_eq!(axis.ticks.first(), Some(&1000));
        assert_eq!(axis.ticks.last(), Some(&20000));
    }

    #[test]
    fn test_time_axis_huge_span_stays_bounded() {
        let summary = summary_for(&[record(0, 0, 10, true), record(1, 1_000_000_000_000, 10, true)]);
        let axis = time_axis(&summary);
        assert_eq!(axis.interval_ms % 1000, 0);
        assert!(axis.ticks.len() as u64 <= MAX_AXIS_TICKS + 1);
        assert_eq!(axis.ticks.first(), Some(&0));
    }

    #[test]
    fn test_time_axis_start_near_min() {
        let summary = summary_for(&[record(0, i64::MIN + 1, 10, true)]);
        assert_eq!(time_axis(&summary), TimeAxis::default());
    }

    #[test]
    fn test_time_axis_empty() {
        assert_eq!(time_axis(&TimelineSummary::default()), TimeAxis::default());
    }
}
