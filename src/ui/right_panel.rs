//! # Right Panel - System Health and Priority Fairness
//!
//! This module renders the resizable right panel summarizing the latest analysis:
//! - Overall health, execution count and deadline violation rate
//! - Priority fairness verdict with the high and low priority bands
//! - Per-task health with the task's timeline color
//!
//! The panel width is remembered across sessions.

use eframe::egui;
use egui::{Color32, RichText};

use super::app_state::color_for_task_health;
use crate::analyzer::{FairnessVerdict, band_label};
use crate::ui::{AppState, color_for_system_health, color_for_task};

const MIN_PANEL_WIDTH: f32 = 220.0;
const MAX_PANEL_WIDTH: f32 = 640.0;

/// Render the right summary panel.
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    let response = egui::SidePanel::right("summary_right")
        .resizable(true)
        .default_width(state.right_panel_width)
        .width_range(MIN_PANEL_WIDTH..=MAX_PANEL_WIDTH)
        .show(ctx, |ui| {
            ui.heading("System Summary");
            ui.separator();

            let Some(update) = &state.latest else {
                ui.label("Waiting for status data...");
                return;
            };
            let analysis = &update.analysis;
            let summary = &analysis.summary;

            ui.horizontal(|ui| {
                ui.label("Health:");
                ui.label(
                    RichText::new(summary.health.to_string())
                        .strong()
                        .color(color_for_system_health(summary.health)),
                );
            });
            ui.horizontal(|ui| {
                ui.label("Executions:");
                ui.label(RichText::new(summary.total_executions.to_string()).strong());
            });
            ui.horizontal(|ui| {
                ui.label("Violations:");
                ui.label(RichText::new(format!("{} ({:.1}%)", summary.total_misses, summary.overall_miss_rate)).strong());
            });
            ui.horizontal(|ui| {
                ui.label("Timeline:");
                ui.label(RichText::new(format!("{} ms", summary.duration_ms)).strong());
            });

            ui.separator();
            ui.label(RichText::new("Priority Analysis").strong());
            let (verdict_text, verdict_color) = match summary.fairness_verdict {
                FairnessVerdict::Balanced => ("Balanced execution", Color32::from_rgb(0x27, 0xAE, 0x60)),
                FairnessVerdict::HighPriorityDominance => ("High priority dominance", Color32::from_rgb(0xF3, 0x9C, 0x12)),
                FairnessVerdict::PriorityInversion => ("Priority inversion detected", Color32::RED),
            };
            ui.label(RichText::new(verdict_text).color(verdict_color).strong());

            let bands = &summary.priority_bands;
            ui.label(format!(
                "High ({}): {} executions",
                band_label(&bands.high_priority_tasks),
                bands.high_priority_executions
            ));
            ui.label(format!(
                "Low ({}): {} executions",
                band_label(&bands.low_priority_tasks),
                bands.low_priority_executions
            ));
            if !summary.starved_tasks.is_empty() {
                ui.label(
                    RichText::new(format!("Starved: {}", band_label(&summary.starved_tasks)))
                        .color(Color32::GRAY)
                        .italics(),
                );
            }

            ui.separator();
            ui.label(RichText::new("Task Health").strong());
            let task_ids: Vec<u32> = analysis
                .per_task
                .keys()
                .chain(summary.starved_tasks.iter())
                .copied()
                .collect::<std::collections::BTreeSet<u32>>()
                .into_iter()
                .collect();
            for task_id in task_ids {
                let health = analysis.task_health(task_id);
                ui.horizontal(|ui| {
                    ui.label(RichText::new("■").color(color_for_task(task_id)));
                    ui.label(format!("P{} {}", task_id, state.task_display_name(task_id)));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(RichText::new(health.to_string()).color(color_for_task_health(health)));
                    });
                });
            }
        });

    state.right_panel_width = response.response.rect.width();
}
