//! JSON export of one monitor update.

use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::task::MonitorUpdate;
use crate::analyzer::{Analysis, render_report};
use crate::common::StatusSnapshot;

#[derive(Serialize)]
struct ExportedReport<'a> {
    fetched_at: String,
    task_names: &'a BTreeMap<u32, String>,
    snapshot: &'a StatusSnapshot,
    analysis: &'a Analysis,
    report: String,
}

/// Serialize the update, its analysis and the text report as pretty JSON.
pub fn report_json(update: &MonitorUpdate, task_names: &BTreeMap<u32, String>) -> anyhow::Result<String> {
    let exported = ExportedReport {
        fetched_at: update.fetched_at.to_rfc3339(),
        task_names,
        snapshot: &update.snapshot,
        analysis: &update.analysis,
        report: render_report(&update.analysis, task_names),
    };
    serde_json::to_string_pretty(&exported).context("Failed to serialize report")
}

pub fn write_report(path: &Path, update: &MonitorUpdate, task_names: &BTreeMap<u32, String>) -> anyhow::Result<()> {
    let json = report_json(update, task_names)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Exported report to {}", path.display());
    Ok(())
}
