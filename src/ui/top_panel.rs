//! # Top Panel - Scheduler Status and Controls
//!
//! This module renders the top panel displaying:
//! - Column 1: Scheduler state, active task count and execution log size
//! - Column 2: Overall health and the time of the last successful poll
//! - Column 3: Action buttons (refresh, stress test, reset, timeline, export)

use eframe::egui;
use egui::{Color32, RichText};

use crate::ui::{AppState, UICommand, color_for_system_health};

/// Render the top panel with status and controls.
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("top_status").exact_height(110.0).show(ctx, |ui| {
        ui.columns(3, |cols| {
            cols[0].vertical(|ui| {
                ui.heading("Avionics Scheduler");
                ui.separator();
                render_scheduler_status(ui, state);
            });

            cols[1].vertical(|ui| {
                ui.heading("Analysis");
                ui.separator();
                render_analysis_status(ui, state);
            });

            cols[2].vertical(|ui| {
                ui.heading("Controls");
                ui.separator();
                render_controls(ui, state);
            });
        });
    });
}

fn render_scheduler_status(ui: &mut egui::Ui, state: &AppState) {
    let snapshot = state.latest.as_ref().map(|u| &u.snapshot);

    let scheduler = snapshot.and_then(|s| s.scheduler_status()).unwrap_or("UNKNOWN");
    let running = snapshot.is_some_and(|s| s.is_scheduler_running());
    ui.horizontal(|ui| {
        ui.label("Scheduler:");
        let color = if running { Color32::from_rgb(0x27, 0xAE, 0x60) } else { Color32::RED };
        ui.label(RichText::new(scheduler).strong().color(color));
        if snapshot.is_some_and(|s| s.system_finished()) {
            ui.label(RichText::new("(finished)").italics());
        }
    });

    let active = snapshot.and_then(|s| s.active_tasks()).map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());
    let log_count = snapshot
        .and_then(|s| s.execution_log_count())
        .map(|n| n.to_string())
        .unwrap_or_else(|| "-".to_string());
    ui.horizontal(|ui| {
        ui.label("Active tasks:");
        ui.label(RichText::new(active).monospace().strong());
        ui.label("  Log entries:");
        ui.label(RichText::new(log_count).monospace().strong());
    });
}

fn render_analysis_status(ui: &mut egui::Ui, state: &AppState) {
    let Some(update) = &state.latest else {
        ui.label("No data yet");
        return;
    };
    let summary = &update.analysis.summary;

    ui.horizontal(|ui| {
        ui.label("System health:");
        ui.label(
            RichText::new(summary.health.to_string())
                .strong()
                .color(color_for_system_health(summary.health)),
        );
        ui.label(format!("({:.1}% missed)", summary.overall_miss_rate));
    });
    ui.horizontal(|ui| {
        ui.label("Last update:");
        ui.label(RichText::new(update.fetched_at.format("%H:%M:%S").to_string()).monospace().strong());
    });
}

fn render_controls(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal_wrapped(|ui| {
        if ui.button("Refresh Now").clicked() {
            state.send_command(UICommand::RefreshNow);
            state.status_message = "Manual refresh requested".to_string();
        }
        if ui.button("Stress Test").clicked() {
            state.confirm_stress_test = true;
        }
        if ui
            .button("Reset Stats")
            .on_hover_text("Statistics live in the kernel module")
            .clicked()
        {
            state.status_message = "Please manually reload the kernel module to reset stats".to_string();
        }
        let timeline_label = if state.show_timeline { "Hide Timeline" } else { "Show Timeline" };
        if ui.button(timeline_label).clicked() {
            state.show_timeline = !state.show_timeline;
        }
        if ui.button("Export Report").clicked() {
            state.export_report();
        }
    });
}
