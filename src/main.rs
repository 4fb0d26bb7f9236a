//! Avionics Task Monitor
//!
//! Desktop monitor for a kernel-resident multi-task avionics scheduler. A
//! background worker polls the scheduler's status file, analyzes its execution
//! log and forwards the results to an egui interface, which also lets the
//! operator tune task periods, deadlines and workloads.
//!
//! Without a display the monitor reads the status once and prints the raw
//! status text followed by the analysis report.

use eframe::egui;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use env_logger::Builder;
use log::{LevelFilter, error, info};
use std::thread;

mod analyzer;
mod common;
mod control;
mod monitor;
mod ui;

use crate::analyzer::{AnalyticsEngine, render_report};
use crate::control::MonitorConfig;
use crate::monitor::{StatusReader, monitor_task, poll_once};
use crate::ui::{AppState, UICommand, UIRefreshState};

const UI_REFRESH_QUEUE_SIZE: usize = 64;
type UIRefreshQueue = embassy_sync::channel::Channel<CriticalSectionRawMutex, UIRefreshState, UI_REFRESH_QUEUE_SIZE>;
type UIRefreshQueueReceiver = embassy_sync::channel::Receiver<'static, CriticalSectionRawMutex, UIRefreshState, UI_REFRESH_QUEUE_SIZE>;
type UIRefreshQueueSender = embassy_sync::channel::Sender<'static, CriticalSectionRawMutex, UIRefreshState, UI_REFRESH_QUEUE_SIZE>;

const UI_COMMAND_QUEUE_SIZE: usize = 16;
type UICommandQueue = embassy_sync::channel::Channel<CriticalSectionRawMutex, UICommand, UI_COMMAND_QUEUE_SIZE>;
type UICommandQueueReceiver = embassy_sync::channel::Receiver<'static, CriticalSectionRawMutex, UICommand, UI_COMMAND_QUEUE_SIZE>;
type UICommandQueueSender = embassy_sync::channel::Sender<'static, CriticalSectionRawMutex, UICommand, UI_COMMAND_QUEUE_SIZE>;

fn init_logging() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("avionics_monitor"), LevelFilter::Debug)
        .parse_default_env()
        .init();
}

/// Whether a graphical session is available.
fn has_display() -> bool {
    if cfg!(target_os = "linux") {
        std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some()
    } else {
        true
    }
}

/// Read the status once and print it with the analysis report.
fn run_headless(config: &MonitorConfig) -> anyhow::Result<()> {
    let reader = StatusReader::new(config.status_path.clone());
    let engine = AnalyticsEngine::new(config.analyzer_config());
    let update = poll_once(&reader, &engine)?;

    println!("=== {} ({}) ===", reader.path().display(), update.fetched_at.format("%Y-%m-%d %H:%M:%S"));
    println!("{}", update.raw_text);
    println!("{}", render_report(&update.analysis, &config.task_names()));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging();

    info!("Starting up");

    let config_path = MonitorConfig::default_path();
    let config = MonitorConfig::load_or_default(&config_path)?;

    if !has_display() {
        info!("No display available, running in console mode");
        return run_headless(&config);
    }

    let ui_refresh_queue: &'static UIRefreshQueue = Box::leak(Box::new(UIRefreshQueue::new()));
    let ui_command_queue: &'static UICommandQueue = Box::leak(Box::new(UICommandQueue::new()));

    let ui_refresh_tx = ui_refresh_queue.sender();
    let ui_refresh_rx = ui_refresh_queue.receiver();
    let ui_command_tx = ui_command_queue.sender();
    let ui_command_rx = ui_command_queue.receiver();

    let worker_config = config.clone();
    let worker = thread::Builder::new()
        .name("monitor-worker".to_string())
        .spawn(move || monitor_task(worker_config, ui_refresh_tx, ui_command_rx))?;

    // Start the GUI on the main thread (required on macOS)
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Avionics Task Monitor")
            .with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };
    let result = eframe::run_native(
        "Avionics Task Monitor",
        native_options,
        Box::new(move |cc| Ok(Box::new(AppState::new(ui_refresh_rx, ui_command_tx, config, cc.storage)))),
    );

    if ui_command_tx.try_send(UICommand::Shutdown).is_err() {
        error!("Could not deliver shutdown to the monitor worker");
    } else if worker.join().is_err() {
        error!("Monitor worker panicked");
    }

    if let Err(err) = result {
        error!("UI terminated with error: {}", err);
        anyhow::bail!("UI terminated with error: {}", err);
    }

    info!("Shut down");
    Ok(())
}
