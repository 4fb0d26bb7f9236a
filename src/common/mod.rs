//! Status interface types shared by the monitor worker and the UI.

pub mod status;

pub use status::{DeadlineResult, StatusSnapshot, TaskSnapshot, TaskState, parse_status_snapshot};
