//! `build`: run a build script and report the produced image.

use std::path::PathBuf;
use std::sync::LazyLock;

use serde::Serialize;
use tracing::{info, warn};

use super::{ToolCommand, parse_image, parse_path, path_arg, require, require_program};
use crate::command_line::{CommandSpec, CommandSpecBuilder};
use crate::error::{CoreError, Result, ToolFailureKind};
use crate::image::ImageName;
use crate::output::{CapturedOutput, ExtractionPattern};
use crate::version::Version;

static OUTPUT_IMAGE: LazyLock<ExtractionPattern> = LazyLock::new(|| {
    ExtractionPattern::new(r"(?i)Output image:\s+(\S+)").expect("Invalid output image pattern")
});

static ERROR_LINE: LazyLock<ExtractionPattern> = LazyLock::new(|| {
    ExtractionPattern::new(r"(?i)^Error:\s+(.*)").expect("Invalid error line pattern")
});

const IMAGE_EXISTS_MARKER: &str = "image already exists";

/// Why a build produced no image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildFailure {
    /// No error was reported (the build may still have produced no image).
    None,
    ImageAlreadyExists,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Last `Output image:` token, exactly as the tool printed it.
    pub image: Option<String>,
    pub failure: BuildFailure,
    /// Messages from `Error:` lines, in output order.
    pub errors: Vec<String>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.image.is_some()
    }

    /// The produced image as an [`ImageName`], when it fits `[ns/]repo[:tag]`.
    /// Registry-qualified names such as `host/ns/repo:tag` yield `None`.
    pub fn image_name(&self) -> Option<ImageName> {
        self.image
            .as_deref()
            .and_then(|image| ImageName::parse(image).ok())
    }

    /// The produced image, or the tool's failure as an error.
    pub fn into_image(self) -> Result<String> {
        if let Some(image) = self.image {
            return Ok(image);
        }

        match self.failure {
            BuildFailure::ImageAlreadyExists => Err(CoreError::ToolReported {
                kind: ToolFailureKind::ImageAlreadyExists,
                message: self
                    .errors
                    .into_iter()
                    .find(|e| e.to_lowercase().contains(IMAGE_EXISTS_MARKER))
                    .unwrap_or_default(),
            }),
            BuildFailure::Unknown => Err(CoreError::ToolReported {
                kind: ToolFailureKind::Unknown,
                message: self.errors.join("; "),
            }),
            BuildFailure::None => Err(CoreError::Extraction {
                command: "build".to_string(),
                pattern: OUTPUT_IMAGE.to_string(),
            }),
        }
    }
}

/// A `<source>=<target>` folder mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountSpec {
    pub source: String,
    pub target: String,
}

impl MountSpec {
    pub fn parse(value: &str) -> Result<Self> {
        let Some((source, target)) = value.split_once('=') else {
            return Err(CoreError::config(format!(
                "mount '{value}' must have the form <source>=<target>"
            )));
        };
        if source.trim().is_empty() || target.trim().is_empty() {
            return Err(CoreError::config(format!(
                "mount '{value}' has an empty source or target"
            )));
        }
        Ok(Self {
            source: source.to_string(),
            target: target.to_string(),
        })
    }

    fn render(&self) -> String {
        format!("{}={}", self.source, self.target)
    }
}

#[derive(Debug, Clone)]
pub struct BuildCommand {
    spec: CommandSpec,
}

impl BuildCommand {
    pub fn builder(program: impl Into<String>) -> BuildCommandBuilder {
        BuildCommandBuilder {
            program: program.into(),
            script: None,
            name: None,
            vm: None,
            working_dir: None,
            mounts: Vec::new(),
            overwrite: false,
            no_base: false,
            diagnostic: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuildCommandBuilder {
    program: String,
    script: Option<PathBuf>,
    name: Option<ImageName>,
    vm: Option<Version>,
    working_dir: Option<PathBuf>,
    mounts: Vec<MountSpec>,
    overwrite: bool,
    no_base: bool,
    diagnostic: bool,
}

impl BuildCommandBuilder {
    pub fn script(mut self, path: impl Into<PathBuf>) -> Result<Self> {
        self.script = Some(parse_path("script", path)?);
        Ok(self)
    }

    pub fn name(mut self, image: &str) -> Result<Self> {
        self.name = Some(parse_image("name", image)?);
        Ok(self)
    }

    pub fn vm(mut self, version: &str) -> Result<Self> {
        self.vm = Some(Version::parse_quad(version)?);
        Ok(self)
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Result<Self> {
        self.working_dir = Some(parse_path("working-dir", dir)?);
        Ok(self)
    }

    pub fn mount(mut self, mount: &str) -> Result<Self> {
        self.mounts.push(MountSpec::parse(mount)?);
        Ok(self)
    }

    pub fn overwrite(mut self, enabled: bool) -> Self {
        self.overwrite = enabled;
        self
    }

    pub fn no_base(mut self, enabled: bool) -> Self {
        self.no_base = enabled;
        self
    }

    pub fn diagnostic(mut self, enabled: bool) -> Self {
        self.diagnostic = enabled;
        self
    }

    pub fn build(self) -> Result<BuildCommand> {
        require_program("build", &self.program)?;
        let script = require("build", "script", self.script)?;

        let mut spec = CommandSpecBuilder::new(self.program)
            .arg("build")
            .opt_arg(self.name.map(|name| format!("--name={name}")))
            .opt_arg(self.vm.map(|vm| format!("--vm={vm}")))
            .opt_arg(
                self.working_dir
                    .map(|dir| format!("--working-dir={}", path_arg(&dir))),
            );
        for mount in &self.mounts {
            spec = spec.arg("--mount").arg(mount.render());
        }
        let spec = spec
            .arg_if(self.overwrite, "--overwrite")
            .arg_if(self.no_base, "--no-base")
            .arg_if(self.diagnostic, "--diagnostic")
            .arg(path_arg(&script))
            .build();

        Ok(BuildCommand { spec })
    }
}

impl ToolCommand for BuildCommand {
    type Payload = BuildReport;

    fn verb(&self) -> &'static str {
        "build"
    }

    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn interpret(&self, exit_code: i32, output: &CapturedOutput) -> Result<BuildReport> {
        let errors: Vec<String> = output
            .find_all(&ERROR_LINE)
            .into_iter()
            .map(str::to_string)
            .collect();

        if let Some(image) = output.find_last(&OUTPUT_IMAGE) {
            info!(image, exit_code, "Build produced image");
            return Ok(BuildReport {
                image: Some(image.to_string()),
                failure: BuildFailure::None,
                errors,
            });
        }

        let failure = if errors
            .iter()
            .any(|e| e.to_lowercase().contains(IMAGE_EXISTS_MARKER))
        {
            BuildFailure::ImageAlreadyExists
        } else if !errors.is_empty() {
            BuildFailure::Unknown
        } else {
            BuildFailure::None
        };

        warn!(exit_code, failure = ?failure, errors = ?errors, "Build produced no image");
        Ok(BuildReport {
            image: None,
            failure,
            errors,
        })
    }
}
