//! Reading the scheduler status file.

use anyhow::Context;
use std::path::{Path, PathBuf};

/// Reads the full status text exposed by the scheduler module.
#[derive(Debug, Clone)]
pub struct StatusReader {
    path: PathBuf,
}

impl StatusReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> anyhow::Result<String> {
        std::fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read {}. Is the kernel module loaded?", self.path.display()))
    }
}
