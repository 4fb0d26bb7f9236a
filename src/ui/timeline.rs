//! # Timeline Window - Execution Gantt Chart
//!
//! Floating window drawing the analyzed execution log:
//! - one row per task with a colored priority badge and the task name
//! - a time axis with grid lines from `time_axis`
//! - one bar per execution, red for deadline misses
//! - a per-task statistics table (`egui_extras::TableBuilder`)
//! - the plain-text analysis report
//!
//! Bar positions come from the pixel-independent `TimelineLayout`; this module
//! only maps milliseconds to pixels.

use eframe::egui;
use egui::{Color32, FontId, Rect, RichText, Stroke, pos2, vec2};
use std::collections::{BTreeMap, BTreeSet};

use crate::analyzer::{Analysis, TimelineLayout, task_name, time_axis};
use crate::monitor::MonitorUpdate;
use crate::ui::app_state::color_for_task_health;
use crate::ui::{AppState, color_for_task};

const LABEL_WIDTH: f32 = 200.0;
const ROW_HEIGHT: f32 = 40.0;
const AXIS_HEIGHT: f32 = 26.0;
const BAR_PADDING: f32 = 8.0;
const RIGHT_MARGIN: f32 = 16.0;
/// Bars are never drawn narrower than this.
pub const MIN_BAR_WIDTH: f32 = 4.0;
/// Bars wider than this carry a duration label.
pub const DURATION_LABEL_MIN_WIDTH: f32 = 30.0;

const MISS_FILL: Color32 = Color32::from_rgb(0xE7, 0x4C, 0x3C);
const MISS_OUTLINE: Color32 = Color32::from_rgb(0xC0, 0x39, 0x2B);
const MET_OUTLINE: Color32 = Color32::from_rgb(0x27, 0xAE, 0x60);
const AXIS_FILL: Color32 = Color32::from_rgb(0x34, 0x49, 0x5E);
const GRID_COLOR: Color32 = Color32::from_rgb(0xBD, 0xC3, 0xC7);

/// Horizontal pixel extent of a bar inside a chart of `chart_width` pixels,
/// relative to the chart's left edge.
pub fn bar_extent(bar: &TimelineLayout, span_ms: u64, chart_width: f32) -> (f32, f32) {
    let start = bar.start_fraction(span_ms) as f32 * chart_width;
    let end = (bar.end_fraction(span_ms) as f32 * chart_width).max(start + MIN_BAR_WIDTH);
    (start, end)
}

/// Task shown on each occupied row. Empty rows are not drawn.
pub fn row_tasks(analysis: &Analysis) -> BTreeMap<usize, u32> {
    analysis.layout.iter().map(|bar| (bar.row_index, bar.task_id)).collect()
}

/// Vertical slot of each occupied row, counted from the top.
fn row_slots(rows: &BTreeMap<usize, u32>) -> BTreeMap<usize, usize> {
    rows.keys().enumerate().map(|(slot, row)| (*row, slot)).collect()
}

/// Render the timeline window if it is open.
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    if !state.show_timeline {
        return;
    }

    let mut open = state.show_timeline;
    egui::Window::new("Execution Timeline")
        .open(&mut open)
        .default_size([960.0, 640.0])
        .resizable(true)
        .show(ctx, |ui| {
            let Some(update) = &state.latest else {
                ui.label("No status data yet");
                return;
            };

            egui::ScrollArea::vertical().show(ui, |ui| {
                render_header(ui, update);
                ui.separator();
                render_gantt(ui, &update.analysis, &state.task_names);
                ui.add_space(8.0);
                render_legend(ui);
                ui.separator();
                ui.heading("Task Statistics");
                render_statistics_table(ui, &update.analysis, &state.task_names);
                ui.separator();
                ui.heading("Report");
                ui.label(RichText::new(state.report_text.as_str()).monospace());
            });
        });
    state.show_timeline = open;
}

fn render_header(ui: &mut egui::Ui, update: &MonitorUpdate) {
    let summary = &update.analysis.summary;
    ui.label(
        RichText::new(format!(
            "Timeline: {}ms - {}ms ({}ms duration) | {} executions",
            summary.start_time_ms, summary.end_time_ms, summary.duration_ms, summary.total_executions
        ))
        .color(Color32::GRAY),
    );
}

fn render_gantt(ui: &mut egui::Ui, analysis: &Analysis, task_names: &BTreeMap<u32, String>) {
    if analysis.layout.is_empty() {
        ui.label(RichText::new("No execution data available").color(Color32::RED));
        return;
    }

    let summary = &analysis.summary;
    let rows = row_tasks(analysis);
    let slots = row_slots(&rows);
    let width = ui.available_width().max(LABEL_WIDTH + 200.0);
    let height = AXIS_HEIGHT + rows.len() as f32 * ROW_HEIGHT;
    let (response, painter) = ui.allocate_painter(vec2(width, height), egui::Sense::hover());
    let rect = response.rect;

    let chart_left = rect.left() + LABEL_WIDTH;
    let chart_width = (rect.right() - RIGHT_MARGIN - chart_left).max(1.0);
    let chart_top = rect.top() + AXIS_HEIGHT;
    let chart_bottom = rect.bottom();

    // Time axis header
    let axis_rect = Rect::from_min_max(pos2(chart_left, rect.top()), pos2(chart_left + chart_width, chart_top));
    painter.rect_filled(axis_rect, 2.0, AXIS_FILL);

    // Row backgrounds and labels
    for (slot, task_id) in rows.values().enumerate() {
        let y = chart_top + slot as f32 * ROW_HEIGHT;
        let label_rect = Rect::from_min_max(pos2(rect.left(), y), pos2(chart_left, y + ROW_HEIGHT));
        painter.rect_filled(label_rect, 0.0, ui.visuals().faint_bg_color);

        let badge = Rect::from_min_size(pos2(rect.left() + 4.0, y + 10.0), vec2(30.0, 20.0));
        painter.rect_filled(badge, 3.0, color_for_task(*task_id));
        painter.text(
            badge.center(),
            egui::Align2::CENTER_CENTER,
            format!("P{}", task_id),
            FontId::proportional(11.0),
            Color32::WHITE,
        );
        painter.text(
            pos2(badge.right() + 8.0, y + ROW_HEIGHT / 2.0),
            egui::Align2::LEFT_CENTER,
            task_name(task_names, *task_id),
            FontId::proportional(13.0),
            ui.visuals().text_color(),
        );

        let chart_row = Rect::from_min_max(pos2(chart_left, y), pos2(chart_left + chart_width, y + ROW_HEIGHT));
        painter.rect_filled(chart_row, 0.0, ui.visuals().extreme_bg_color);
        painter.line_segment(
            [pos2(chart_left, y + ROW_HEIGHT), pos2(chart_left + chart_width, y + ROW_HEIGHT)],
            Stroke::new(1.0, GRID_COLOR),
        );
    }

    // Vertical grid lines with absolute tick labels
    for tick in time_axis(summary).ticks {
        let offset = tick.abs_diff(summary.start_time_ms);
        let fraction = if summary.duration_ms == 0 { 0.0 } else { offset as f32 / summary.duration_ms as f32 };
        let x = chart_left + fraction * chart_width;
        painter.line_segment([pos2(x, chart_top), pos2(x, chart_bottom)], Stroke::new(1.0, GRID_COLOR));
        painter.text(
            pos2(x, rect.top() + AXIS_HEIGHT / 2.0),
            egui::Align2::CENTER_CENTER,
            tick.to_string(),
            FontId::monospace(10.0),
            Color32::WHITE,
        );
    }

    // Execution bars
    for bar in &analysis.layout {
        let slot = slots.get(&bar.row_index).copied().unwrap_or_default();
        let y = chart_top + slot as f32 * ROW_HEIGHT;
        let (start, end) = bar_extent(bar, summary.duration_ms, chart_width);
        let bar_rect = Rect::from_min_max(
            pos2(chart_left + start, y + BAR_PADDING),
            pos2(chart_left + end, y + ROW_HEIGHT - BAR_PADDING),
        );

        let (fill, stroke) = if bar.deadline_met {
            (color_for_task(bar.task_id), Stroke::new(1.0, MET_OUTLINE))
        } else {
            (MISS_FILL, Stroke::new(2.0, MISS_OUTLINE))
        };
        painter.rect_filled(bar_rect, 2.0, fill);
        painter.rect_stroke(bar_rect, 2.0, stroke, egui::StrokeKind::Inside);

        if bar_rect.width() > DURATION_LABEL_MIN_WIDTH {
            painter.text(
                bar_rect.center(),
                egui::Align2::CENTER_CENTER,
                format!("{}ms", bar.duration_ms),
                FontId::proportional(10.0),
                Color32::WHITE,
            );
        }
    }
}

fn render_legend(ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("■").color(MET_OUTLINE));
        ui.label("Deadline met (task color)");
        ui.add_space(12.0);
        ui.label(RichText::new("■").color(MISS_FILL));
        ui.label("Deadline missed");
    });
}

fn render_statistics_table(ui: &mut egui::Ui, analysis: &Analysis, task_names: &BTreeMap<u32, String>) {
    use egui_extras::{Column, TableBuilder};

    let task_ids: BTreeSet<u32> = analysis
        .per_task
        .keys()
        .chain(analysis.summary.starved_tasks.iter())
        .copied()
        .collect();

    let row_height = ui.text_style_height(&egui::TextStyle::Body) * 1.3;
    TableBuilder::new(ui)
        .striped(true)
        .resizable(false)
        .vscroll(false)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::remainder().at_least(160.0)) // Task
        .column(Column::initial(70.0).at_least(50.0)) // Executions
        .column(Column::initial(80.0).at_least(60.0)) // Avg
        .column(Column::initial(90.0).at_least(60.0)) // Range
        .column(Column::initial(110.0).at_least(80.0)) // Misses
        .column(Column::initial(60.0).at_least(50.0)) // CPU
        .column(Column::initial(90.0).at_least(70.0)) // Health
        .header(row_height, |mut header| {
            for title in ["Task", "Execs", "Avg (ms)", "Range (ms)", "Misses", "CPU", "Health"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for task_id in task_ids {
                let health = analysis.task_health(task_id);
                let stats = analysis.per_task.get(&task_id);
                body.row(row_height, |mut row| {
                    row.col(|ui| {
                        ui.label(RichText::new(format!("P{} {}", task_id, task_name(task_names, task_id))).color(color_for_task(task_id)));
                    });
                    row.col(|ui| {
                        ui.label(stats.map(|s| s.count.to_string()).unwrap_or_else(|| "0".to_string()));
                    });
                    row.col(|ui| {
                        ui.label(stats.map(|s| format!("{:.1}", s.average_duration_ms)).unwrap_or_else(|| "-".to_string()));
                    });
                    row.col(|ui| {
                        ui.label(
                            stats
                                .map(|s| format!("{} - {}", s.min_duration_ms, s.max_duration_ms))
                                .unwrap_or_else(|| "-".to_string()),
                        );
                    });
                    row.col(|ui| {
                        ui.label(
                            stats
                                .map(|s| format!("{} ({:.1}%)", s.miss_count, s.miss_rate))
                                .unwrap_or_else(|| "-".to_string()),
                        );
                    });
                    row.col(|ui| {
                        ui.label(stats.map(|s| format!("{:.1}%", s.cpu_utilization)).unwrap_or_else(|| "-".to_string()));
                    });
                    row.col(|ui| {
                        ui.label(RichText::new(health.to_string()).strong().color(color_for_task_health(health)));
                    });
                });
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{AnalyticsEngine, AnalyzerConfig, RowPolicy};

    fn bar(relative_start: u64, relative_end: u64) -> TimelineLayout {
        TimelineLayout {
            task_id: 0,
            row_index: 0,
            relative_start,
            relative_end,
            duration_ms: relative_end - relative_start,
            deadline_met: true,
            is_degenerate: relative_start == relative_end,
        }
    }

    #[test]
    fn test_bar_extent_scales_to_chart() {
        assert_eq!(bar_extent(&bar(0, 300), 300, 600.0), (0.0, 600.0));
        assert_eq!(bar_extent(&bar(150, 300), 300, 600.0), (300.0, 600.0));
    }

    #[test]
    fn test_bar_extent_minimum_width() {
        assert_eq!(bar_extent(&bar(100, 100), 300, 600.0), (200.0, 204.0));
        assert_eq!(bar_extent(&bar(0, 0), 0, 600.0), (0.0, MIN_BAR_WIDTH));
    }

    #[test]
    fn test_row_tasks() {
        let text = "EXECUTION_LOG:\nEXEC:3,0,10,MET\nEXEC:1,20,10,MISSED\n";

        let identity = AnalyticsEngine::default().analyze_text(text);
        let rows = row_tasks(&identity);
        assert_eq!(rows, BTreeMap::from([(1, 1), (3, 3)]));
        assert_eq!(row_slots(&rows), BTreeMap::from([(1, 0), (3, 1)]));

        let compact = AnalyticsEngine::new(AnalyzerConfig {
            row_policy: RowPolicy::Compact,
            ..AnalyzerConfig::default()
        })
        .analyze_text(text);
        let rows = row_tasks(&compact);
        assert_eq!(rows, BTreeMap::from([(0, 1), (1, 3)]));
    }

    #[test]
    fn test_rows_for_far_apart_task_ids() {
        let text = "EXECUTION_LOG:\nEXEC:0,0,10,MET\nEXEC:20000000,5,10,MET\nEXEC:4000000000,8,1,MISSED\n";
        let analysis = AnalyticsEngine::default().analyze_text(text);

        let rows = row_tasks(&analysis);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[&20_000_000], 20_000_000);
        assert_eq!(row_slots(&rows)[&4_000_000_000], 2);
    }
}
