pub mod json;
pub mod table;

use std::sync::Arc;

use clap::ValueEnum;
use spoonrun_core::OutputCallback;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(self, OutputFormat::Json)
    }

    /// Live echo of tool output. In JSON mode stdout carries only the result
    /// document, so the echo goes to stderr.
    pub fn echo_callback(self) -> OutputCallback {
        match self {
            OutputFormat::Text => Arc::new(|line: &str| print!("{line}")),
            OutputFormat::Json => Arc::new(|line: &str| eprint!("{line}")),
        }
    }
}
