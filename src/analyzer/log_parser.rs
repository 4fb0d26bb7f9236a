//! Parse the execution log section of the scheduler status text.
//!
//! The section starts after a line reading `EXECUTION_LOG:` and contains one
//! record per line:
//!
//! ```text
//! EXEC:<task_id>,<start_time_ms>,<duration_ms>,<deadline_result>
//! ```
//!
//! The producer is a live kernel module, so partial or interleaved lines are
//! expected. They are skipped rather than reported.

use super::types::ExecutionRecord;

/// Line that opens the execution log section.
pub const LOG_SECTION_MARKER: &str = "EXECUTION_LOG:";

/// Prefix of every record line.
const RECORD_PREFIX: &str = "EXEC:";

/// Token reported for an execution that met its deadline. Anything else is a miss.
const DEADLINE_MET_TOKEN: &str = "MET";

/// Parse all execution records from a full status text.
///
/// Records are returned in line order, not sorted by start time. Text without
/// a log section yields an empty vector.
pub fn parse_execution_log(raw_text: &str) -> Vec<ExecutionRecord> {
    let mut records = Vec::new();
    let mut in_log_section = false;

    for line in raw_text.lines() {
        let line = line.trim();
        if line == LOG_SECTION_MARKER {
            in_log_section = true;
            continue;
        }

        if !in_log_section || !line.starts_with(RECORD_PREFIX) {
            continue;
        }

        match parse_record_line(line) {
            Some(record) => records.push(record),
            None => log::debug!("Skipping malformed execution record: {}", line),
        }
    }

    records
}

/// Parse a single `EXEC:` line.
///
/// # Returns
///
/// `Some(record)` if the line has exactly four fields and all numeric fields
/// parse, `None` otherwise.
pub fn parse_record_line(line: &str) -> Option<ExecutionRecord> {
    let body = line.strip_prefix(RECORD_PREFIX)?;
    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() != 4 {
        return None;
    }

    let task_id: u32 = fields[0].parse().ok()?;
    let start_time_ms: i64 = fields[1].parse().ok()?;
    let duration_ms: u64 = fields[2].parse().ok()?;

    Some(ExecutionRecord {
        task_id,
        start_time_ms,
        duration_ms,
        deadline_met: fields[3] == DEADLINE_MET_TOKEN,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_malformed_lines() {
        let text = "EXECUTION_LOG:\nEXEC:0,100,50,MET\nEXEC:bad,line\nEXEC:1,200,30,MISS\n";
        let records = parse_execution_log(text);
        assert_eq!(
            records,
            vec![
                ExecutionRecord {
                    task_id: 0,
                    start_time_ms: 100,
                    duration_ms: 50,
                    deadline_met: true,
                },
                ExecutionRecord {
                    task_id: 1,
                    start_time_ms: 200,
                    duration_ms: 30,
                    deadline_met: false,
                },
            ]
        );
    }

    #[test]
    fn test_empty_and_missing_section() {
        assert!(parse_execution_log("").is_empty());
        assert!(parse_execution_log("SchedulerStatus: RUNNING\nEXEC:0,1,2,MET\n").is_empty());
        assert!(parse_execution_log("EXECUTION_LOG:\n").is_empty());
    }

    #[test]
    fn test_ignores_lines_before_marker() {
        let text = "AvionicsSystem: Multi-Task Simulator\n\
                    EXEC:4,0,10,MET\n\
                    ---\n\
                    EXECUTION_LOG:\n\
                    EXEC:2,500,120,MISSED\n";
        let records = parse_execution_log(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].task_id, 2);
        assert!(!records[0].deadline_met);
    }

    #[test]
    fn test_preserves_line_order() {
        let text = "EXECUTION_LOG:\nEXEC:1,900,10,MET\nEXEC:0,100,10,MET\nEXEC:3,500,10,MET\n";
        let starts: Vec<i64> = parse_execution_log(text).iter().map(|r| r.start_time_ms).collect();
        assert_eq!(starts, vec![900, 100, 500]);
    }

    #[test]
    fn test_field_count_and_numeric_failures() {
        assert!(parse_record_line("EXEC:0,100,50").is_none());
        assert!(parse_record_line("EXEC:0,100,50,MET,extra").is_none());
        assert!(parse_record_line("EXEC:0,abc,50,MET").is_none());
        assert!(parse_record_line("EXEC:0,100,-5,MET").is_none());
        assert!(parse_record_line("EXEC:-1,100,5,MET").is_none());
        assert!(parse_record_line("EXEC: 0,100,5,MET").is_none());
        assert!(parse_record_line("exec:0,100,5,MET").is_none());
    }

    #[test]
    fn test_only_exact_met_token_is_met() {
        assert!(parse_record_line("EXEC:0,0,1,MET").unwrap().deadline_met);
        assert!(!parse_record_line("EXEC:0,0,1,met").unwrap().deadline_met);
        assert!(!parse_record_line("EXEC:0,0,1,MISSED").unwrap().deadline_met);
        assert!(!parse_record_line("EXEC:0,0,1,").unwrap().deadline_met);
        assert!(!parse_record_line("EXEC:0,0,1,MET ").unwrap().deadline_met);
    }

    #[test]
    fn test_trims_whole_line() {
        let text = "  EXECUTION_LOG:  \r\n  EXEC:0,-20,5,MET\r\n";
        let records = parse_execution_log(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].start_time_ms, -20);
        assert!(records[0].deadline_met);
    }

    #[test]
    fn test_large_task_ids_are_kept() {
        let records = parse_execution_log("EXECUTION_LOG:\nEXEC:17,0,1,MET\n");
        assert_eq!(records[0].task_id, 17);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "EXECUTION_LOG:\nEXEC:0,100,50,MET\nEXEC:1,\nEXEC:1,200,30,MISSED\n";
        assert_eq!(parse_execution_log(text), parse_execution_log(text));
    }
}
