//! Error types for tool invocation and output extraction.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Classification of an `Error:` line printed by the tool itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolFailureKind {
    /// The target image name is already taken and `--overwrite` was not given.
    ImageAlreadyExists,
    /// Any other tool-reported error.
    Unknown,
}

impl fmt::Display for ToolFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolFailureKind::ImageAlreadyExists => write!(f, "image already exists"),
            ToolFailureKind::Unknown => write!(f, "unknown tool error"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("'{program}' exited with code {code}")]
    ProcessFailure { program: String, code: i32 },

    #[error("'{command}' output did not contain a match for `{pattern}`")]
    Extraction { command: String, pattern: String },

    #[error("Tool reported failure ({kind}): {message}")]
    ToolReported {
        kind: ToolFailureKind,
        message: String,
    },

    #[error("Failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    pub fn config(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
