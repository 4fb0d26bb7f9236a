// UI module for the Avionics Task Monitor
//
// This module organizes the UI into separate components:
// - `top_panel`: Scheduler status and action buttons
// - `task_panel`: Central per-task grid with parameter editors
// - `right_panel`: System health and priority fairness summary
// - `timeline`: Gantt chart, statistics table and text report window
// - `app_state`: Application state management and main update loop

pub mod app_state;
pub mod right_panel;
pub mod task_panel;
pub mod timeline;
pub mod top_panel;

use crate::control::TaskParameter;
use crate::monitor::MonitorUpdate;

pub use app_state::{AppState, color_for_system_health, color_for_task};

#[derive(Debug)]
pub enum UIRefreshState {
    Alert(String),
    Updated(Box<MonitorUpdate>),
    StatusMessage(String),
}

#[derive(Debug)]
pub enum UICommand {
    RefreshNow,
    SetParameters {
        task_id: u32,
        updates: Vec<(TaskParameter, String)>,
    },
    StressTest,
    Shutdown,
}
