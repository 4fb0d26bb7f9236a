//! Monitor configuration and task parameter tuning.
//!
//! - `config`: the TOML configuration (paths, refresh rate, task table)
//! - `params`: validated writes of period, deadline and workload values

pub mod config;
pub mod params;

pub use config::{ConfigLoadError, MonitorConfig, TaskConfig};
pub use params::{ParameterError, ParameterOutcome, ParameterWriter, TaskParameter, stress_workload};
