//! `version`: report the installed tool version.

use std::sync::LazyLock;

use tracing::debug;

use super::{ToolCommand, require_program};
use crate::command_line::{CommandSpec, CommandSpecBuilder};
use crate::error::{CoreError, Result};
use crate::output::{CapturedOutput, ExtractionPattern};

static VERSION_LINE: LazyLock<ExtractionPattern> = LazyLock::new(|| {
    ExtractionPattern::new(r"(?i)Version:\s+(\S+)").expect("Invalid version pattern")
});

#[derive(Debug, Clone)]
pub struct VersionCommand {
    spec: CommandSpec,
}

impl VersionCommand {
    pub fn builder(program: impl Into<String>) -> VersionCommandBuilder {
        VersionCommandBuilder {
            program: program.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VersionCommandBuilder {
    program: String,
}

impl VersionCommandBuilder {
    pub fn build(self) -> Result<VersionCommand> {
        require_program("version", &self.program)?;
        Ok(VersionCommand {
            spec: CommandSpecBuilder::new(self.program).arg("version").build(),
        })
    }
}

impl ToolCommand for VersionCommand {
    /// The version token as printed; see [`crate::Version::parse`] for comparisons.
    type Payload = String;

    fn verb(&self) -> &'static str {
        "version"
    }

    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    // A missing version line means the tool is absent or too old to report one.
    fn interpret(&self, _exit_code: i32, output: &CapturedOutput) -> Result<String> {
        let version = output
            .find_all(&VERSION_LINE)
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::Extraction {
                command: "version".to_string(),
                pattern: VERSION_LINE.to_string(),
            })?;
        debug!(version, "Tool version reported");
        Ok(version.to_string())
    }
}
