//! `model`: capture a runtime model of an image.

use super::{ExecutionMode, ToolCommand, parse_exit_codes, parse_image, require, require_program};
use crate::command_line::{CommandSpec, CommandSpecBuilder};
use crate::error::Result;
use crate::image::ImageName;
use crate::output::CapturedOutput;

#[derive(Debug, Clone)]
pub struct ModelCommand {
    spec: CommandSpec,
    acceptable: Vec<i32>,
}

impl ModelCommand {
    pub fn builder(program: impl Into<String>) -> ModelCommandBuilder {
        ModelCommandBuilder {
            program: program.into(),
            image: None,
            include_exe: false,
            screencast: false,
            acceptable: vec![0],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelCommandBuilder {
    program: String,
    image: Option<ImageName>,
    include_exe: bool,
    screencast: bool,
    acceptable: Vec<i32>,
}

impl ModelCommandBuilder {
    pub fn image(mut self, image: &str) -> Result<Self> {
        self.image = Some(parse_image("image", image)?);
        Ok(self)
    }

    pub fn include_exe(mut self, enabled: bool) -> Self {
        self.include_exe = enabled;
        self
    }

    /// Record a screencast of the session into the screenshot directory.
    pub fn screencast(mut self, enabled: bool) -> Self {
        self.screencast = enabled;
        self
    }

    pub fn accept_exit_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Result<Self> {
        self.acceptable = parse_exit_codes(codes)?;
        Ok(self)
    }

    pub fn build(self) -> Result<ModelCommand> {
        require_program("model", &self.program)?;
        let image = require("model", "image", self.image)?;

        let spec = CommandSpecBuilder::new(self.program)
            .arg("model")
            .arg(image.to_string())
            .arg_if(self.include_exe, "--include-exe")
            .arg_if(self.screencast, "--screencast")
            .build();
        Ok(ModelCommand {
            spec,
            acceptable: self.acceptable,
        })
    }
}

impl ModelCommand {
    /// The rendered command line, as handed to the task scheduler.
    pub fn command_line(&self) -> String {
        self.spec.render()
    }
}

impl ToolCommand for ModelCommand {
    type Payload = ();

    fn verb(&self) -> &'static str {
        "model"
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
