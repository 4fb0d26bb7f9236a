//! # Task Panel - Per-Task Status and Tuning
//!
//! Central panel listing every configured or reported task in a grid:
//! - priority badge and name
//! - run state, last deadline result and last execution time
//! - met / missed / total counters reported by the scheduler
//! - period, deadline and workload editors with a Set button

use eframe::egui;
use egui::{Color32, RichText};
use std::collections::BTreeSet;

use super::app_state::color_for_priority;
use crate::common::{DeadlineResult, TaskSnapshot, TaskState};
use crate::control::TaskParameter;
use crate::ui::{AppState, UICommand};

/// Operator input for one task's tunable parameters.
///
/// While the operator is typing (`dirty`), incoming snapshots do not
/// overwrite the fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEditor {
    /// Period, deadline and workload, in `TaskParameter::ALL` order.
    pub values: [String; 3],
    pub dirty: bool,
}

impl TaskEditor {
    /// Copy the reported parameters into the editor unless it has unsaved edits.
    pub fn sync(&mut self, task: &TaskSnapshot) {
        if self.dirty {
            return;
        }
        let reported = [task.period_ms, task.deadline_ms, task.workload_ms];
        for (value, reported) in self.values.iter_mut().zip(reported) {
            *value = reported.map(|v| v.to_string()).unwrap_or_default();
        }
    }

    /// Non-empty fields as raw parameter updates.
    pub fn pending_updates(&self) -> Vec<(TaskParameter, String)> {
        TaskParameter::ALL
            .iter()
            .zip(&self.values)
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(parameter, value)| (*parameter, value.trim().to_string()))
            .collect()
    }
}

fn state_color(state: &TaskState) -> Color32 {
    match state {
        TaskState::Executing => Color32::YELLOW,
        TaskState::Ready => Color32::LIGHT_GREEN,
        TaskState::Idle => Color32::LIGHT_BLUE,
        TaskState::Disabled => Color32::GRAY,
        TaskState::Unknown => Color32::WHITE,
    }
}

fn deadline_text(result: DeadlineResult) -> RichText {
    let text = RichText::new(result.to_string());
    match result {
        DeadlineResult::Met => text.color(Color32::from_rgb(0x27, 0xAE, 0x60)),
        DeadlineResult::Missed => text.color(Color32::RED).strong(),
        DeadlineResult::NotAvailable => text,
    }
}

fn count_text(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Render the central task grid.
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Avionics Tasks");
        ui.separator();

        let mut task_ids: BTreeSet<u32> = state.config.tasks.iter().map(|t| t.id).collect();
        if let Some(update) = &state.latest {
            task_ids.extend(update.snapshot.tasks.keys().copied());
        }

        if task_ids.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label("No tasks configured or reported");
            });
            return;
        }

        let mut pending_command: Option<UICommand> = None;

        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("task_grid").striped(true).spacing([12.0, 6.0]).show(ui, |ui| {
                for header in ["Priority", "Task", "Status", "Deadline", "Last Exec", "Met", "Missed", "Total", "Controls"] {
                    ui.strong(header);
                }
                ui.end_row();

                for task_id in task_ids {
                    let name = state.task_display_name(task_id);
                    let task = state
                        .latest
                        .as_ref()
                        .and_then(|u| u.snapshot.tasks.get(&task_id))
                        .cloned()
                        .unwrap_or_default();

                    let priority = task.priority.unwrap_or(task_id);
                    ui.label(
                        RichText::new(format!(" P{} ", priority))
                            .background_color(color_for_priority(priority))
                            .color(Color32::WHITE)
                            .strong(),
                    );
                    ui.label(RichText::new(name.as_str()).strong());
                    ui.label(RichText::new(task.status.to_string()).color(state_color(&task.status)));
                    ui.label(deadline_text(task.last_deadline_result));

                    let exec_text = RichText::new(format!("{} ms", count_text(task.last_exec_time_ms)));
                    if task.exceeded_deadline() {
                        ui.label(exec_text.color(Color32::RED).strong());
                    } else {
                        ui.label(exec_text);
                    }

                    ui.label(RichText::new(count_text(task.met_count)).color(Color32::from_rgb(0x27, 0xAE, 0x60)));
                    ui.label(RichText::new(count_text(task.missed_count)).color(Color32::RED));
                    ui.label(count_text(task.total_executions));

                    let editor = state.editors.entry(task_id).or_default();
                    ui.horizontal(|ui| {
                        for (parameter, value) in TaskParameter::ALL.iter().zip(editor.values.iter_mut()) {
                            ui.label(format!("{}:", parameter.short_label()));
                            if ui.add(egui::TextEdit::singleline(value).desired_width(48.0)).changed() {
                                editor.dirty = true;
                            }
                        }
                        if ui.button("Set").clicked() {
                            let updates = editor.pending_updates();
                            if !updates.is_empty() {
                                pending_command = Some(UICommand::SetParameters { task_id, updates });
                            }
                            editor.dirty = false;
                        }
                    });
                    ui.end_row();
                }
            });
        });

        if let Some(command) = pending_command {
            state.send_command(command);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(period: u32, deadline: u32, workload: Option<u32>) -> TaskSnapshot {
        TaskSnapshot {
            period_ms: Some(period),
            deadline_ms: Some(deadline),
            workload_ms: workload,
            ..TaskSnapshot::default()
        }
    }

    #[test]
    fn test_editor_sync_and_updates() {
        let mut editor = TaskEditor::default();
        editor.sync(&snapshot(100, 50, None));
        assert_eq!(editor.values, ["100".to_string(), "50".to_string(), String::new()]);
        assert_eq!(
            editor.pending_updates(),
            vec![(TaskParameter::Period, "100".to_string()), (TaskParameter::Deadline, "50".to_string())]
        );
    }

    #[test]
    fn test_dirty_editor_keeps_operator_input() {
        let mut editor = TaskEditor::default();
        editor.values[2] = " 300 ".to_string();
        editor.dirty = true;
        editor.sync(&snapshot(100, 50, Some(30)));

        assert_eq!(editor.values[0], "");
        assert_eq!(editor.pending_updates(), vec![(TaskParameter::Workload, "300".to_string())]);

        editor.dirty = false;
        editor.sync(&snapshot(100, 50, Some(30)));
        assert_eq!(editor.values[2], "30");
    }
}
