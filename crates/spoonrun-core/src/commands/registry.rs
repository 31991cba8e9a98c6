//! Hub transfers: `pull`, `push` and `pushm`.

use std::path::PathBuf;

use super::{
    ExecutionMode, ToolCommand, parse_exit_codes, parse_image, parse_path, path_arg, require,
    require_program,
};
use crate::command_line::{CommandSpec, CommandSpecBuilder};
use crate::error::Result;
use crate::image::ImageName;
use crate::output::CapturedOutput;

// ─── pull ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PullCommand {
    spec: CommandSpec,
    acceptable: Vec<i32>,
}

impl PullCommand {
    pub fn builder(program: impl Into<String>) -> PullCommandBuilder {
        PullCommandBuilder {
            program: program.into(),
            image: None,
            acceptable: vec![0],
        }
    }
}

#[derive(Debug, Clone)]
pub struct PullCommandBuilder {
    program: String,
    image: Option<ImageName>,
    acceptable: Vec<i32>,
}

impl PullCommandBuilder {
    pub fn image(mut self, image: &str) -> Result<Self> {
        self.image = Some(parse_image("image", image)?);
        Ok(self)
    }

    pub fn accept_exit_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Result<Self> {
        self.acceptable = parse_exit_codes(codes)?;
        Ok(self)
    }

    pub fn build(self) -> Result<PullCommand> {
        require_program("pull", &self.program)?;
        let image = require("pull", "image", self.image)?;
        Ok(PullCommand {
            spec: CommandSpecBuilder::new(self.program)
                .arg("pull")
                .arg(image.to_string())
                .build(),
            acceptable: self.acceptable,
        })
    }
}

impl ToolCommand for PullCommand {
    type Payload = ();

    fn verb(&self) -> &'static str {
        "pull"
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

// ─── push ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PushCommand {
    spec: CommandSpec,
    acceptable: Vec<i32>,
}

impl PushCommand {
    pub fn builder(program: impl Into<String>) -> PushCommandBuilder {
        PushCommandBuilder {
            program: program.into(),
            image: None,
            remote: None,
            acceptable: vec![0],
        }
    }
}

#[derive(Debug, Clone)]
pub struct PushCommandBuilder {
    program: String,
    image: Option<ImageName>,
    remote: Option<ImageName>,
    acceptable: Vec<i32>,
}

impl PushCommandBuilder {
    pub fn image(mut self, image: &str) -> Result<Self> {
        self.image = Some(parse_image("image", image)?);
        Ok(self)
    }

    /// Name to publish under, when different from the local name.
    pub fn remote(mut self, image: &str) -> Result<Self> {
        self.remote = Some(parse_image("remote", image)?);
        Ok(self)
    }

    pub fn accept_exit_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Result<Self> {
        self.acceptable = parse_exit_codes(codes)?;
        Ok(self)
    }

    pub fn build(self) -> Result<PushCommand> {
        require_program("push", &self.program)?;
        let image = require("push", "image", self.image)?;
        Ok(PushCommand {
            spec: CommandSpecBuilder::new(self.program)
                .arg("push")
                .arg(image.to_string())
                .opt_arg(self.remote.map(|remote| remote.to_string()))
                .build(),
            acceptable: self.acceptable,
        })
    }
}

impl ToolCommand for PushCommand {
    type Payload = ();

    fn verb(&self) -> &'static str {
        "push"
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

// ─── pushm ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PushModelCommand {
    spec: CommandSpec,
    acceptable: Vec<i32>,
}

impl PushModelCommand {
    pub fn builder(program: impl Into<String>) -> PushModelCommandBuilder {
        PushModelCommandBuilder {
            program: program.into(),
            model_dir: None,
            remote: None,
            acceptable: vec![0],
        }
    }
}

#[derive(Debug, Clone)]
pub struct PushModelCommandBuilder {
    program: String,
    model_dir: Option<PathBuf>,
    remote: Option<ImageName>,
    acceptable: Vec<i32>,
}

impl PushModelCommandBuilder {
    /// Directory holding the captured model.
    pub fn model_dir(mut self, dir: impl Into<PathBuf>) -> Result<Self> {
        self.model_dir = Some(parse_path("model-dir", dir)?);
        Ok(self)
    }

    pub fn remote(mut self, image: &str) -> Result<Self> {
        self.remote = Some(parse_image("remote", image)?);
        Ok(self)
    }

    pub fn accept_exit_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Result<Self> {
        self.acceptable = parse_exit_codes(codes)?;
        Ok(self)
    }

    pub fn build(self) -> Result<PushModelCommand> {
        require_program("pushm", &self.program)?;
        let model_dir = require("pushm", "model-dir", self.model_dir)?;
        Ok(PushModelCommand {
            spec: CommandSpecBuilder::new(self.program)
                .arg("pushm")
                .arg(path_arg(&model_dir))
                .opt_arg(self.remote.map(|remote| remote.to_string()))
                .build(),
            acceptable: self.acceptable,
        })
    }
}

impl ToolCommand for PushModelCommand {
    type Payload = ();

    fn verb(&self) -> &'static str {
        "pushm"
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_rendering() {
        let command = PullCommand::builder("spoon")
            .image("ns/app:2")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(command.spec().render(), "spoon pull ns/app:2");
    }

    #[test]
    fn test_push_with_remote() {
        let command = PushCommand::builder("spoon")
            .image("app")
            .unwrap()
            .remote("team/app:1.0")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(command.spec().render(), "spoon push app team/app:1.0");
    }

    #[test]
    fn test_push_model_rendering() {
        let command = PushModelCommand::builder("spoon")
            .model_dir("C:\\models\\my app")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(command.spec().render(), "spoon pushm \"C:\\models\\my app\"");
    }

    #[test]
    fn test_required_fields() {
        assert!(PullCommand::builder("spoon").build().is_err());
        assert!(PushCommand::builder("spoon").build().is_err());
        assert!(PushModelCommand::builder("spoon").build().is_err());
    }

    #[test]
    fn test_custom_acceptable_codes() {
        let command = PushCommand::builder("spoon")
            .image("app")
            .unwrap()
            .accept_exit_codes([0, 3])
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            command.mode(),
            ExecutionMode::FireAndForget {
                acceptable: vec![0, 3]
            }
        );
    }
}
