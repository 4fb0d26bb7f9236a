//! # Application State Management
//!
//! This module implements the central `AppState` struct which holds all UI state
//! and coordinates the rendering of all UI components. It implements the `eframe::App`
//! trait to integrate with the egui application framework.
//!
//! ## Responsibilities
//!
//! - Processes incoming messages from the monitor worker via `ui_refresh_rx`
//! - Sends operator commands to the worker via `ui_command_tx`
//! - Coordinates rendering of all UI panels (top, right, tasks, timeline)
//! - Repaints every 50 ms via `request_repaint_after`
//! - Persists user settings (export directory, timeline window, panel width)
//!
//! ## State Management
//!
//! The interface is rebuilt every frame from the last `MonitorUpdate`. Only the
//! operator's in-progress parameter edits survive between updates.

use eframe::egui;
use egui::Color32;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::task_panel::TaskEditor;
use super::{UICommand, UIRefreshState};
use crate::analyzer::{SystemHealth, TaskHealth, render_report};
use crate::control::MonitorConfig;
use crate::monitor::MonitorUpdate;

/// Default width of the right summary panel in pixels.
pub const DEFAULT_RIGHT_PANEL_WIDTH: f32 = 320.0;

pub struct AppState {
    /// Optional alert message to display in a modal dialog.
    pub alert: Option<String>,
    /// Receiver for UI refresh messages from the monitor worker.
    pub ui_refresh_rx: crate::UIRefreshQueueReceiver,
    /// Sender for commands from the UI to the monitor worker.
    pub ui_command_tx: crate::UICommandQueueSender,

    pub config: MonitorConfig,
    /// Display names by task id, from the configuration.
    pub task_names: BTreeMap<u32, String>,

    /// Most recent successful poll.
    pub latest: Option<MonitorUpdate>,
    /// Text report rendered from `latest`.
    pub report_text: String,
    /// Message shown in the bottom status bar.
    pub status_message: String,

    /// Parameter editors by task id.
    pub editors: BTreeMap<u32, TaskEditor>,
    /// Whether the stress test confirmation dialog is open.
    pub confirm_stress_test: bool,
    pub show_timeline: bool,

    /// Last directory used for report export.
    pub last_export_dir: Option<String>,
    /// Width of the right summary panel in pixels.
    pub right_panel_width: f32,
}

/// Settings persisted across application sessions.
#[derive(Default, Serialize, Deserialize)]
struct PersistedSettings {
    last_export_dir: Option<String>,
    show_timeline: bool,
    right_panel_width: Option<f32>,
}

impl AppState {
    /// Create a new AppState, loading persisted settings if available.
    pub fn new(
        rx: crate::UIRefreshQueueReceiver,
        tx: crate::UICommandQueueSender,
        config: MonitorConfig,
        storage: Option<&dyn eframe::Storage>,
    ) -> Self {
        let persisted: PersistedSettings = storage.and_then(|s| eframe::get_value(s, "app_settings")).unwrap_or_default();

        Self {
            alert: None,
            ui_refresh_rx: rx,
            ui_command_tx: tx,
            task_names: config.task_names(),
            editors: config.tasks.iter().map(|t| (t.id, TaskEditor::default())).collect(),
            config,
            latest: None,
            report_text: String::new(),
            status_message: "Waiting for status data...".to_string(),
            confirm_stress_test: false,
            show_timeline: persisted.show_timeline,
            last_export_dir: persisted.last_export_dir,
            right_panel_width: persisted.right_panel_width.unwrap_or(DEFAULT_RIGHT_PANEL_WIDTH),
        }
    }

    /// Queue a command for the monitor worker.
    pub fn send_command(&mut self, command: UICommand) {
        if self.ui_command_tx.try_send(command).is_err() {
            log::warn!("UI command queue full, command dropped");
            self.status_message = "Monitor is busy, try again".to_string();
        }
    }

    /// Fold one worker message into the UI state.
    pub fn apply_refresh(&mut self, msg: UIRefreshState) {
        match msg {
            UIRefreshState::Alert(alert_msg) => {
                self.alert = Some(alert_msg);
            }
            UIRefreshState::StatusMessage(message) => {
                self.status_message = message;
            }
            UIRefreshState::Updated(update) => {
                for (task_id, task) in &update.snapshot.tasks {
                    self.editors.entry(*task_id).or_default().sync(task);
                }
                self.report_text = render_report(&update.analysis, &self.task_names);
                self.latest = Some(*update);
            }
        }
    }

    /// Display name of a task, preferring the configured name over the reported one.
    pub fn task_display_name(&self, task_id: u32) -> String {
        if let Some(name) = self.task_names.get(&task_id) {
            return name.clone();
        }
        self.latest
            .as_ref()
            .and_then(|u| u.snapshot.tasks.get(&task_id))
            .and_then(|t| t.name.clone())
            .unwrap_or_else(|| format!("Task {}", task_id))
    }

    /// Ask for a destination file and write the JSON report there.
    pub fn export_report(&mut self) {
        let Some(update) = &self.latest else {
            self.alert = Some("No data to export yet".to_string());
            return;
        };

        let file_name = format!("avionics_report_{}.json", update.fetched_at.format("%Y%m%d_%H%M%S"));
        let mut dialog = rfd::FileDialog::new().add_filter("JSON", &["json"]).set_file_name(file_name.as_str());
        if let Some(dir) = &self.last_export_dir {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.save_file() else {
            return;
        };

        match crate::monitor::export::write_report(&path, update, &self.task_names) {
            Ok(()) => {
                self.status_message = format!("Report exported to {}", path.display());
                if let Some(parent) = path.parent() {
                    self.last_export_dir = Some(parent.to_string_lossy().to_string());
                }
            }
            Err(err) => {
                log::warn!("Report export failed: {:#}", err);
                self.alert = Some(format!("Report export failed: {:#}", err));
            }
        }
    }

    fn render_alert(&mut self, ctx: &egui::Context) {
        let Some(alert) = self.alert.clone() else {
            return;
        };
        egui::Window::new("Alert")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.label(alert);
                    ui.add_space(20.0);

                    if ui.button("OK").clicked() {
                        self.alert = None;
                    }
                    ui.add_space(10.0);
                });
            });
    }

    fn render_stress_confirmation(&mut self, ctx: &egui::Context) {
        if !self.confirm_stress_test {
            return;
        }
        egui::Window::new("Stress Test")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("This will triple all task workloads (capped at 1000 ms) to test deadline compliance.");
                ui.label("Continue?");
                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    if ui.button("Apply").clicked() {
                        self.confirm_stress_test = false;
                        self.send_command(UICommand::StressTest);
                    }
                    if ui.button("Cancel").clicked() {
                        self.confirm_stress_test = false;
                    }
                });
            });
    }

    fn render_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.status_message.as_str());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(self.config.status_path.display().to_string())
                            .monospace()
                            .color(Color32::GRAY),
                    );
                });
            });
        });
    }
}

/// Bar color for a task on the timeline and in legends.
pub fn color_for_task(task_id: u32) -> Color32 {
    match task_id {
        0 => Color32::from_rgb(0xE7, 0x4C, 0x3C), // Flight attitude: red
        1 => Color32::from_rgb(0xF3, 0x9C, 0x12), // Engine control: orange
        2 => Color32::from_rgb(0x34, 0x98, 0xDB), // Navigation: blue
        3 => Color32::from_rgb(0x2E, 0xCC, 0x71), // Communication: green
        4 => Color32::from_rgb(0x9B, 0x59, 0xB6), // Cabin systems: purple
        _ => Color32::from_rgb(0x95, 0xA5, 0xA6),
    }
}

/// Badge color for a scheduling priority (0 is the most critical).
pub fn color_for_priority(priority: u32) -> Color32 {
    match priority {
        0 => Color32::from_rgb(255, 0, 0),
        1 => Color32::from_rgb(255, 140, 0),
        2 => Color32::from_rgb(255, 215, 0),
        3 => Color32::from_rgb(50, 205, 50),
        4 => Color32::from_rgb(135, 206, 235),
        _ => Color32::from_rgb(204, 204, 204),
    }
}

pub fn color_for_system_health(health: SystemHealth) -> Color32 {
    match health {
        SystemHealth::Healthy => Color32::from_rgb(0x27, 0xAE, 0x60),
        SystemHealth::Warning => Color32::from_rgb(0xF3, 0x9C, 0x12),
        SystemHealth::Critical => Color32::from_rgb(0xE7, 0x4C, 0x3C),
    }
}

pub fn color_for_task_health(health: TaskHealth) -> Color32 {
    match health {
        TaskHealth::Optimal => Color32::from_rgb(0x27, 0xAE, 0x60),
        TaskHealth::Acceptable => Color32::from_rgb(0xF3, 0x9C, 0x12),
        TaskHealth::Critical => Color32::from_rgb(0xE7, 0x4C, 0x3C),
        TaskHealth::Starved => Color32::GRAY,
    }
}

impl eframe::App for AppState {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedSettings {
            last_export_dir: self.last_export_dir.clone(),
            show_timeline: self.show_timeline,
            right_panel_width: Some(self.right_panel_width),
        };
        eframe::set_value(storage, "app_settings", &settings);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Repaint periodically so background updates are visible without input
        ctx.request_repaint_after(Duration::from_millis(50));

        while let Ok(msg) = self.ui_refresh_rx.try_receive() {
            self.apply_refresh(msg);
        }

        self.render_alert(ctx);
        self.render_stress_confirmation(ctx);

        // Panels layout: top and bottom bars, right summary, task grid fills the rest
        super::top_panel::render(ctx, self);
        self.render_status_bar(ctx);
        super::right_panel::render(ctx, self);
        super::task_panel::render(ctx, self);
        super::timeline::render(ctx, self);
    }
}
