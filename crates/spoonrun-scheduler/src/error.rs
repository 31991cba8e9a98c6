//! Scheduler error types.

use std::path::PathBuf;

use spoonrun_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("scheduler {operation} for task '{task}' exited with code {code}")]
    SchedulerCommand {
        operation: &'static str,
        task: String,
        code: i32,
    },

    #[error("task '{task}' still running after {attempts} status checks")]
    Timeout { task: String, attempts: u32 },

    #[error("wait for task '{task}' was cancelled")]
    Cancelled { task: String },

    #[error("no '*.{extension}' file appeared in {}", dir.display())]
    MissingArtifact { dir: PathBuf, extension: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;
