//! Analytics engine tying statistics and layout together.

use super::layout::{RowPolicy, timeline_layout};
use super::log_parser::parse_execution_log;
use super::statistics::{summarize, task_statistics, timeline_span};
use super::types::{Analysis, ExecutionRecord};

/// Number of lowest task ids treated as high priority when nothing else is configured.
pub const DEFAULT_HIGH_PRIORITY_TASKS: usize = 2;

/// Tunables of the analytics engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// How many of the lowest task ids form the high priority band.
    pub high_priority_count: usize,
    /// Tasks the scheduler is known to run. Missing ones are reported as starved
    /// and still take part in priority banding.
    pub expected_tasks: Vec<u32>,
    pub row_policy: RowPolicy,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            high_priority_count: DEFAULT_HIGH_PRIORITY_TASKS,
            expected_tasks: Vec::new(),
            row_policy: RowPolicy::Identity,
        }
    }
}

/// Stateless transform from execution records to an [`Analysis`].
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    config: AnalyzerConfig,
}

impl AnalyticsEngine {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Compute statistics, summary and layout for a record set.
    ///
    /// Records may be in any order and may be empty.
    pub fn analyze(&self, records: &[ExecutionRecord]) -> Analysis {
        let (start, end) = timeline_span(records).unwrap_or((0, 0));
        let per_task = task_statistics(records, end.abs_diff(start));
        let summary = summarize(records, &per_task, &self.config.expected_tasks, self.config.high_priority_count);
        let layout = timeline_layout(records, &summary, self.config.row_policy);

        Analysis {
            per_task,
            summary,
            layout,
        }
    }

    /// Parse the execution log out of a full status text and analyze it.
    pub fn analyze_text(&self, raw_text: &str) -> Analysis {
        self.analyze(&parse_execution_log(raw_text))
    }
}

/// Analyze with the default configuration.
pub fn analyze(records: &[ExecutionRecord]) -> Analysis {
    AnalyticsEngine::default().analyze(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::types::{FairnessVerdict, SystemHealth, TaskHealth};

    fn record(task_id: u32, start_time_ms: i64, duration_ms: u64, deadline_met: bool) -> ExecutionRecord {
        ExecutionRecord {
            task_id,
            start_time_ms,
            duration_ms,
            deadline_met,
        }
    }

    #[test]
    fn test_empty_input() {
        let analysis = analyze(&[]);
        assert!(analysis.per_task.is_empty());
        assert!(analysis.layout.is_empty());
        assert_eq!(analysis.summary.duration_ms, 0);
        assert_eq!(analysis.summary.overall_miss_rate, 0.0);
        assert_eq!(analysis.summary.health, SystemHealth::Healthy);
        assert_eq!(analysis.summary.fairness_verdict, FairnessVerdict::Balanced);
    }

    #[test]
    fn test_statistics_example() {
        let records = vec![record(0, 0, 100, true), record(0, 200, 100, false), record(1, 50, 50, true)];
        let analysis = analyze(&records);

        let task0 = &analysis.per_task[&0];
        assert_eq!(task0.count, 2);
        assert_eq!(task0.miss_count, 1);
        assert!((task0.miss_rate - 50.0).abs() < 1e-9);

        let task1 = &analysis.per_task[&1];
        assert_eq!(task1.count, 1);
        assert_eq!(task1.miss_count, 0);
        assert_eq!(task1.miss_rate, 0.0);

        let summary = &analysis.summary;
        assert_eq!(summary.start_time_ms, 0);
        assert_eq!(summary.end_time_ms, 300);
        assert_eq!(summary.duration_ms, 300);
        assert_eq!(summary.total_executions, 3);
        assert_eq!(summary.total_misses, 1);
        assert!((summary.overall_miss_rate - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.health, SystemHealth::Warning);
    }

    #[test]
    fn test_priority_inversion_example() {
        let engine = AnalyticsEngine::new(AnalyzerConfig {
            expected_tasks: vec![0, 1, 2, 3, 4],
            ..AnalyzerConfig::default()
        });
        let records = vec![record(0, 0, 10, true), record(1, 20, 10, true), record(0, 100, 10, true)];

        assert_eq!(engine.analyze(&records).summary.fairness_verdict, FairnessVerdict::PriorityInversion);
        assert_eq!(analyze(&records).summary.fairness_verdict, FairnessVerdict::PriorityInversion);

        let analysis = engine.analyze(&records);
        assert_eq!(analysis.summary.starved_tasks, vec![2, 3, 4]);
        assert_eq!(analysis.task_health(3), TaskHealth::Starved);
    }

    #[test]
    fn test_totals_and_bounds_hold() {
        let text = "EXECUTION_LOG:\n\
                    EXEC:3,900,40,MET\n\
                    EXEC:0,100,20,MISSED\n\
                    EXEC:1,-50,10,MET\n\
                    EXEC:2,400,0,LATE\n\
                    EXEC:0,120,500,MET\n";
        let records = parse_execution_log(text);
        let analysis = AnalyticsEngine::default().analyze_text(text);

        assert_eq!(analysis.summary.total_executions, records.len() as u64);
        assert_eq!(
            analysis.summary.total_misses,
            records.iter().filter(|r| !r.deadline_met).count() as u64
        );
        for r in &records {
            assert!(analysis.summary.start_time_ms <= r.start_time_ms);
            assert!(r.end_time_ms() <= analysis.summary.end_time_ms);
        }
        assert_eq!(analysis.summary.start_time_ms, -50);
        assert_eq!(analysis.summary.end_time_ms, 940);
        assert_eq!(analysis.layout.len(), records.len());
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let text = "EXECUTION_LOG:\nEXEC:1,30,5,MET\nEXEC:0,0,50,MISSED\nEXEC:1,10,5,MET\n";
        let engine = AnalyticsEngine::default();
        assert_eq!(engine.analyze_text(text), engine.analyze_text(text));
    }

    #[test]
    fn test_degenerate_inputs() {
        let single = analyze(&[record(4, 10, 0, false)]);
        assert_eq!(single.summary.duration_ms, 0);
        assert_eq!(single.summary.health, SystemHealth::Critical);
        assert_eq!(single.per_task[&4].cpu_utilization, 0.0);
        assert_eq!(single.layout.len(), 1);
        assert!(single.layout[0].is_degenerate);
        assert_eq!(single.layout[0].relative_start, single.layout[0].relative_end);

        let all_missed = analyze(&[record(0, 0, 5, false), record(0, 10, 5, false)]);
        assert_eq!(all_missed.per_task[&0].health, TaskHealth::Critical);
        assert!((all_missed.summary.overall_miss_rate - 100.0).abs() < 1e-9);
    }
}
