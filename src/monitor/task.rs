//! Background monitor worker.
//!
//! The worker owns the status reader, the parameter writer and the analytics
//! engine. Each loop iteration:
//! 1) drains pending UI commands (refresh, parameter writes, stress test, shutdown)
//! 2) polls the status file when the refresh interval elapsed or a refresh was requested
//! 3) publishes the result to the UI queue
//!
//! Queue operations never block. A full UI queue drops the update; the next
//! poll sends a fresh one.

use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

use super::source::StatusReader;
use crate::analyzer::{AnalyticsEngine, Analysis};
use crate::common::{StatusSnapshot, parse_status_snapshot};
use crate::control::params::stress_workload;
use crate::control::{MonitorConfig, ParameterWriter, TaskParameter};
use crate::ui::{UICommand, UIRefreshState};
use crate::{UICommandQueueReceiver, UIRefreshQueueSender};

/// Sleep between command queue checks.
const COMMAND_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One complete poll of the status interface.
#[derive(Debug, Clone)]
pub struct MonitorUpdate {
    pub raw_text: String,
    pub snapshot: StatusSnapshot,
    pub analysis: Analysis,
    pub fetched_at: DateTime<Local>,
}

/// Read the status file once and analyze it.
pub fn poll_once(reader: &StatusReader, engine: &AnalyticsEngine) -> anyhow::Result<MonitorUpdate> {
    let raw_text = reader.read()?;
    Ok(build_update(raw_text, engine))
}

/// Parse and analyze an already read status text.
pub fn build_update(raw_text: String, engine: &AnalyticsEngine) -> MonitorUpdate {
    let snapshot = parse_status_snapshot(&raw_text);
    let analysis = engine.analyze_text(&raw_text);
    MonitorUpdate {
        raw_text,
        snapshot,
        analysis,
        fetched_at: Local::now(),
    }
}

/// State of the monitor worker between loop iterations.
pub struct MonitorWorker {
    config: MonitorConfig,
    reader: StatusReader,
    writer: ParameterWriter,
    engine: AnalyticsEngine,
    ui_refresh_tx: UIRefreshQueueSender,
    last_snapshot: Option<StatusSnapshot>,
    /// Whether the last poll failed, so repeated failures only alert once.
    read_failing: bool,
}

impl MonitorWorker {
    pub fn new(config: MonitorConfig, ui_refresh_tx: UIRefreshQueueSender) -> Self {
        Self {
            reader: StatusReader::new(config.status_path.clone()),
            writer: ParameterWriter::new(config.parameter_dir.clone(), &config.tasks),
            engine: AnalyticsEngine::new(config.analyzer_config()),
            config,
            ui_refresh_tx,
            last_snapshot: None,
            read_failing: false,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.config.refresh_interval_ms)
    }

    fn publish(&self, state: UIRefreshState) {
        if self.ui_refresh_tx.try_send(state).is_err() {
            log::debug!("UI refresh queue full, dropping update");
        }
    }

    fn task_display_name(&self, task_id: u32) -> String {
        self.config
            .task(task_id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| format!("Task {}", task_id))
    }

    /// Poll the status file and publish the outcome.
    pub fn poll(&mut self) {
        match poll_once(&self.reader, &self.engine) {
            Ok(update) => {
                log::debug!(
                    "Polled {}: {} tasks, {} executions",
                    self.reader.path().display(),
                    update.snapshot.tasks.len(),
                    update.analysis.summary.total_executions
                );
                if update.snapshot.is_empty() {
                    log::warn!("{} contains no status fields", self.reader.path().display());
                }
                let recovered = self.read_failing;
                if recovered {
                    log::info!("Status file readable again");
                    self.read_failing = false;
                }
                let fetched_at = update.fetched_at;
                self.last_snapshot = Some(update.snapshot.clone());
                self.publish(UIRefreshState::Updated(Box::new(update)));
                if recovered {
                    self.publish(UIRefreshState::StatusMessage(format!(
                        "Status restored at {}",
                        fetched_at.format("%H:%M:%S")
                    )));
                }
            }
            Err(err) => {
                let message = format!("{:#}", err);
                if !self.read_failing {
                    log::warn!("{}", message);
                    self.publish(UIRefreshState::Alert(message.clone()));
                    self.read_failing = true;
                }
                self.publish(UIRefreshState::StatusMessage(message));
            }
        }
    }

    fn set_parameters(&self, task_id: u32, updates: &[(TaskParameter, String)]) {
        let name = self.task_display_name(task_id);
        match self.writer.apply(task_id, updates) {
            Ok(outcome) => {
                let message = outcome.describe(&name);
                if !outcome.is_success() {
                    self.publish(UIRefreshState::Alert(message.clone()));
                }
                self.publish(UIRefreshState::StatusMessage(message));
            }
            Err(err) => {
                log::warn!("{}", err);
                self.publish(UIRefreshState::Alert(err.to_string()));
            }
        }
    }

    /// Triple the workload of every configured task that reports one.
    fn stress_test(&self) {
        let Some(snapshot) = &self.last_snapshot else {
            self.publish(UIRefreshState::Alert("No status data yet, cannot apply stress test".to_string()));
            return;
        };

        let mut applied = 0;
        let mut failures = Vec::new();
        for task in &self.config.tasks {
            let current = snapshot.tasks.get(&task.id).and_then(|t| t.workload_ms).unwrap_or(0);
            let stressed = stress_workload(current);
            if stressed == 0 {
                continue;
            }
            match self.writer.write(&task.parameter_prefix, TaskParameter::Workload, stressed) {
                Ok(()) => applied += 1,
                Err(err) => failures.push(err.to_string()),
            }
        }

        log::info!("Stress test applied to {} tasks, {} failures", applied, failures.len());
        if let Some(first) = failures.first() {
            self.publish(UIRefreshState::Alert(format!("Stress test incomplete: {}", first)));
        }
        self.publish(UIRefreshState::StatusMessage(format!(
            "Stress test applied to {} tasks - monitor deadline compliance!",
            applied
        )));
    }

    /// Handle one UI command. Returns `false` when the worker should stop.
    pub fn handle_command(&mut self, command: UICommand) -> bool {
        match command {
            UICommand::RefreshNow => {
                self.poll();
            }
            UICommand::SetParameters { task_id, updates } => {
                self.set_parameters(task_id, &updates);
                self.poll();
            }
            UICommand::StressTest => {
                self.stress_test();
                self.poll();
            }
            UICommand::Shutdown => return false,
        }
        true
    }
}

/// Worker loop. Runs on its own thread until `UICommand::Shutdown` arrives.
pub fn monitor_task(config: MonitorConfig, ui_refresh_tx: UIRefreshQueueSender, ui_command_rx: UICommandQueueReceiver) {
    let mut worker = MonitorWorker::new(config, ui_refresh_tx);
    log::info!(
        "Monitor started: {} every {} ms, parameters in {}",
        worker.reader.path().display(),
        worker.config.refresh_interval_ms,
        worker.writer.parameter_dir().display()
    );

    let mut next_poll = Instant::now();
    loop {
        while let Ok(command) = ui_command_rx.try_receive() {
            if !worker.handle_command(command) {
                log::info!("Monitor stopped");
                return;
            }
            next_poll = Instant::now() + worker.refresh_interval();
        }

        if Instant::now() >= next_poll {
            worker.poll();
            next_poll = Instant::now() + worker.refresh_interval();
        }

        std::thread::sleep(COMMAND_POLL_INTERVAL);
    }
}
