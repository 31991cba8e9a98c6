//! `import`: convert an external package into an image.

use std::path::PathBuf;
use std::sync::LazyLock;

use tracing::info;

use super::{ToolCommand, parse_image, parse_path, parse_token, path_arg, require, require_program};
use crate::command_line::{CommandSpec, CommandSpecBuilder};
use crate::error::{CoreError, Result};
use crate::image::ImageName;
use crate::output::{CapturedOutput, ExtractionPattern};

static IMPORTED_AS: LazyLock<ExtractionPattern> = LazyLock::new(|| {
    ExtractionPattern::new(r"(?i)imported as:?\s+(\S+)").expect("Invalid import pattern")
});

#[derive(Debug, Clone)]
pub struct ImportCommand {
    spec: CommandSpec,
}

impl ImportCommand {
    pub fn builder(program: impl Into<String>) -> ImportCommandBuilder {
        ImportCommandBuilder {
            program: program.into(),
            kind: None,
            path: None,
            name: None,
            overwrite: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportCommandBuilder {
    program: String,
    kind: Option<String>,
    path: Option<PathBuf>,
    name: Option<ImageName>,
    overwrite: bool,
}

impl ImportCommandBuilder {
    /// Package type understood by the tool (for example `msi` or `svm`).
    pub fn kind(mut self, kind: &str) -> Result<Self> {
        self.kind = Some(parse_token("type", kind)?);
        Ok(self)
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Result<Self> {
        self.path = Some(parse_path("path", path)?);
        Ok(self)
    }

    pub fn name(mut self, image: &str) -> Result<Self> {
        self.name = Some(parse_image("name", image)?);
        Ok(self)
    }

    pub fn overwrite(mut self, enabled: bool) -> Self {
        self.overwrite = enabled;
        self
    }

    pub fn build(self) -> Result<ImportCommand> {
        require_program("import", &self.program)?;
        let kind = require("import", "type", self.kind)?;
        let path = require("import", "path", self.path)?;

        let spec = CommandSpecBuilder::new(self.program)
            .arg("import")
            .arg(kind)
            .arg(path_arg(&path))
            .opt_arg(self.name.map(|name| format!("--name={name}")))
            .arg_if(self.overwrite, "--overwrite")
            .build();
        Ok(ImportCommand { spec })
    }
}

impl ToolCommand for ImportCommand {
    /// The image name exactly as the tool printed it.
    type Payload = String;

    fn verb(&self) -> &'static str {
        "import"
    }

    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    // The tool always names the imported image; silence is a contract violation.
    fn interpret(&self, exit_code: i32, output: &CapturedOutput) -> Result<String> {
        let image = output
            .find_last(&IMPORTED_AS)
            .ok_or_else(|| CoreError::Extraction {
                command: "import".to_string(),
                pattern: IMPORTED_AS.to_string(),
            })?;
        info!(image, exit_code, "Package imported");
        Ok(image.to_string())
    }
}
