//! `check`: run an image's self-test; only the exit code matters.

use super::{ExecutionMode, ToolCommand, parse_exit_codes, parse_image, require, require_program};
use crate::command_line::{CommandSpec, CommandSpecBuilder};
use crate::error::Result;
use crate::image::ImageName;
use crate::output::CapturedOutput;
use crate::version::Version;

#[derive(Debug, Clone)]
pub struct CheckCommand {
    spec: CommandSpec,
    acceptable: Vec<i32>,
}

impl CheckCommand {
    pub fn builder(program: impl Into<String>) -> CheckCommandBuilder {
        CheckCommandBuilder {
            program: program.into(),
            image: None,
            vm: None,
            diagnostic: false,
            acceptable: vec![0],
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckCommandBuilder {
    program: String,
    image: Option<ImageName>,
    vm: Option<Version>,
    diagnostic: bool,
    acceptable: Vec<i32>,
}

impl CheckCommandBuilder {
    pub fn image(mut self, image: &str) -> Result<Self> {
        self.image = Some(parse_image("image", image)?);
        Ok(self)
    }

    pub fn vm(mut self, version: &str) -> Result<Self> {
        self.vm = Some(Version::parse_quad(version)?);
        Ok(self)
    }

    pub fn diagnostic(mut self, enabled: bool) -> Self {
        self.diagnostic = enabled;
        self
    }

    pub fn accept_exit_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Result<Self> {
        self.acceptable = parse_exit_codes(codes)?;
        Ok(self)
    }

    pub fn build(self) -> Result<CheckCommand> {
        require_program("check", &self.program)?;
        let image = require("check", "image", self.image)?;

        let spec = CommandSpecBuilder::new(self.program)
            .arg("check")
            .arg(image.to_string())
            .opt_arg(self.vm.map(|vm| format!("--vm={vm}")))
            .arg_if(self.diagnostic, "--diagnostic")
            .build();
        Ok(CheckCommand {
            spec,
            acceptable: self.acceptable,
        })
    }
}

impl ToolCommand for CheckCommand {
    type Payload = ();

    fn verb(&self) -> &'static str {
        "check"
    }

    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::FireAndForget {
            acceptable: self.acceptable.clone(),
        }
    }

    fn interpret(&self, _exit_code: i32, _output: &CapturedOutput) -> Result<()> {
        Ok(())
    }
}
