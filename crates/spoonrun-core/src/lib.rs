//! Drive the spoon command-line tool and turn its console output into
//! typed results.
//!
//! # Usage
//!
//! Commands are assembled with validating builders and consumed by
//! [`ToolCommand::run`]:
//!
//! 1. **Build** a command (`BuildCommand::builder(..)`); setters reject bad
//!    values immediately and `build()` rejects missing required fields.
//! 2. **Run** it through a [`ProcessLauncher`]; output is streamed into an
//!    [`OutputCollector`] which echoes, normalizes and bounds it.
//! 3. **Interpret**: each command extracts its payload from the captured
//!    lines (produced image, version, hub URL).

pub mod command_line;
pub mod commands;
pub mod config;
pub mod error;
pub mod image;
pub mod launcher;
pub mod output;
pub mod version;

pub use command_line::{ArgToken, CommandSpec, CommandSpecBuilder};
pub use commands::{CommandResult, ExecutionMode, ToolCommand};
pub use config::ToolConfig;
pub use error::{CoreError, Result, ToolFailureKind};
pub use image::ImageName;
pub use launcher::{LaunchContext, LaunchRequest, ProcessLauncher, TokioProcessLauncher};
pub use output::{
    CapturedOutput, ExtractionPattern, OutputCallback, OutputCollector, OutputLine, OutputSink,
};
pub use version::Version;
