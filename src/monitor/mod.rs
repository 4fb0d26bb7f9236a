//! Status polling and the background monitor worker.
//!
//! - `source`: reads the scheduler status file
//! - `task`: the worker loop connecting the status file, the parameter
//!   writer and the analytics engine to the UI queues
//! - `export`: JSON export of a poll result

pub mod export;
pub mod source;
pub mod task;

pub use source::StatusReader;
pub use task::{MonitorUpdate, monitor_task, poll_once};
