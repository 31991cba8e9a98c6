//! Tool verbs.
//!
//! Each verb is one type implementing [`ToolCommand`]. A command is built
//! once through its validating builder, consumed by [`ToolCommand::run`], and
//! owns the policy that turns captured output into its typed payload.

mod build;
mod check;
mod config;
mod import;
mod model;
mod registry;
mod version;

pub use build::{BuildCommand, BuildCommandBuilder, BuildFailure, BuildReport, MountSpec};
pub use check::{CheckCommand, CheckCommandBuilder};
pub use config::{ConfigCommand, ConfigCommandBuilder};
pub use import::{ImportCommand, ImportCommandBuilder};
pub use model::{ModelCommand, ModelCommandBuilder};
pub use registry::{
    PullCommand, PullCommandBuilder, PushCommand, PushCommandBuilder, PushModelCommand,
    PushModelCommandBuilder,
};
pub use version::{VersionCommand, VersionCommandBuilder};

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::command_line::CommandSpec;
use crate::error::{CoreError, Result};
use crate::image::ImageName;
use crate::launcher::{LaunchContext, LaunchRequest, ProcessLauncher};
use crate::output::CapturedOutput;

/// How a command's process outcome is judged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Only the exit code matters; it must be one of `acceptable`.
    FireAndForget { acceptable: Vec<i32> },
    /// Output is captured and interpreted whatever the exit code.
    Harvest,
}

impl ExecutionMode {
    pub fn fire_and_forget() -> Self {
        ExecutionMode::FireAndForget {
            acceptable: vec![0],
        }
    }
}

/// Exit code, retained output and the command-specific payload.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResult<T> {
    pub exit_code: i32,
    pub output: CapturedOutput,
    pub payload: T,
}

#[async_trait]
pub trait ToolCommand: Send + Sync + Sized {
    type Payload: Send;

    /// Tool verb, used in logs and errors.
    fn verb(&self) -> &'static str;

    fn spec(&self) -> &CommandSpec;

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Harvest
    }

    fn interpret(&self, exit_code: i32, output: &CapturedOutput) -> Result<Self::Payload>;

    /// Launch the command once and interpret its outcome.
    async fn run(
        self,
        launcher: &dyn ProcessLauncher,
        context: &LaunchContext,
    ) -> Result<CommandResult<Self::Payload>> {
        execute(self, launcher, context).await
    }
}

pub async fn execute<C: ToolCommand>(
    command: C,
    launcher: &dyn ProcessLauncher,
    context: &LaunchContext,
) -> Result<CommandResult<C::Payload>> {
    let spec = command.spec();
    let request = LaunchRequest::from_spec(spec, context);
    let mode = command.mode();

    info!(verb = command.verb(), command = %spec, "Running tool command");

    let mut collector = match &mode {
        ExecutionMode::FireAndForget { .. } => context.echo_collector(),
        ExecutionMode::Harvest => context.harvesting_collector(),
    };
    let exit_code = launcher.launch(&request, &mut collector).await?;
    let output = collector.finish();

    if let ExecutionMode::FireAndForget { acceptable } = &mode
        && !acceptable.contains(&exit_code)
    {
        warn!(
            verb = command.verb(),
            exit_code,
            acceptable = ?acceptable,
            "Tool command exited with unacceptable code"
        );
        return Err(CoreError::ProcessFailure {
            program: spec.program().to_string(),
            code: exit_code,
        });
    }

    debug!(
        verb = command.verb(),
        exit_code,
        retained_lines = output.len(),
        truncated = output.is_truncated(),
        "Interpreting tool output"
    );
    let payload = command.interpret(exit_code, &output)?;

    Ok(CommandResult {
        exit_code,
        output,
        payload,
    })
}

// ─── Builder validation helpers ─────────────────────────────────────────

fn require<T>(verb: &str, field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| CoreError::config(format!("{verb}: required field '{field}' is not set")))
}

fn require_program(verb: &str, program: &str) -> Result<()> {
    if program.trim().is_empty() {
        return Err(CoreError::config(format!(
            "{verb}: tool executable must not be empty"
        )));
    }
    Ok(())
}

fn parse_image(field: &str, value: &str) -> Result<ImageName> {
    ImageName::parse(value).map_err(|e| CoreError::config(format!("{field}: {e}")))
}

fn parse_token(field: &str, value: &str) -> Result<String> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(CoreError::config(format!(
            "{field}: '{value}' must be a single token without whitespace"
        )));
    }
    Ok(value.to_string())
}

fn parse_path(field: &str, value: impl Into<PathBuf>) -> Result<PathBuf> {
    let path = value.into();
    if path.as_os_str().is_empty() {
        return Err(CoreError::config(format!("{field}: path must not be empty")));
    }
    Ok(path)
}

fn parse_exit_codes(codes: impl IntoIterator<Item = i32>) -> Result<Vec<i32>> {
    let codes: Vec<i32> = codes.into_iter().collect();
    if codes.is_empty() {
        return Err(CoreError::config(
            "at least one acceptable exit code is required",
        ));
    }
    Ok(codes)
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::Result;
    use crate::launcher::{LaunchRequest, ProcessLauncher};
    use crate::output::{CapturedOutput, DEFAULT_OUTPUT_BUDGET, OutputCollector, OutputSink};

    /// Launcher replaying canned output and exit codes.
    #[derive(Default)]
    pub struct ScriptedLauncher {
        runs: Mutex<VecDeque<(String, i32)>>,
        pub requests: Mutex<Vec<LaunchRequest>>,
    }

    impl ScriptedLauncher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn then(self, output: &str, exit_code: i32) -> Self {
            self.runs
                .lock()
                .unwrap()
                .push_back((output.to_string(), exit_code));
            self
        }
    }

    #[async_trait]
    impl ProcessLauncher for ScriptedLauncher {
        async fn launch(&self, request: &LaunchRequest, sink: &mut dyn OutputSink) -> Result<i32> {
            self.requests.lock().unwrap().push(request.clone());
            let (output, code) = self
                .runs
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected launch");
            for line in output.split_inclusive('\n') {
                sink.accept_line(line.as_bytes());
            }
            Ok(code)
        }
    }

    pub fn captured(text: &str) -> CapturedOutput {
        let mut collector = OutputCollector::new(DEFAULT_OUTPUT_BUDGET);
        collector.feed(text.as_bytes());
        collector.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedLauncher;
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_fire_and_forget_rejects_unlisted_exit_code() {
        let launcher = ScriptedLauncher::new().then("pulling\n", 2);
        let command = PullCommand::builder("spoon")
            .image("ns/app")
            .unwrap()
            .build()
            .unwrap();

        let err = command
            .run(&launcher, &LaunchContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ProcessFailure { code: 2, .. }));
    }

    #[tokio::test]
    async fn test_fire_and_forget_accepts_listed_exit_code_and_echoes() {
        let echoed = Arc::new(Mutex::new(String::new()));
        let sink = echoed.clone();
        let context = LaunchContext::default().with_echo(Arc::new(move |line: &str| {
            sink.lock().unwrap().push_str(line);
        }));
        let launcher = ScriptedLauncher::new().then("checked\n", 1);
        let command = CheckCommand::builder("spoon")
            .image("ns/app")
            .unwrap()
            .accept_exit_codes([0, 1])
            .unwrap()
            .build()
            .unwrap();

        let result = command.run(&launcher, &context).await.unwrap();
        assert_eq!(result.exit_code, 1);
        assert!(result.output.is_empty());
        assert_eq!(*echoed.lock().unwrap(), "checked\n");
    }

    #[tokio::test]
    async fn test_harvest_interprets_despite_nonzero_exit() {
        let launcher = ScriptedLauncher::new().then("Output image: ns/app:1\n", 1);
        let command = BuildCommand::builder("spoon")
            .script("app.me")
            .unwrap()
            .build()
            .unwrap();

        let result = command
            .run(&launcher, &LaunchContext::default())
            .await
            .unwrap();
        assert_eq!(result.exit_code, 1);
        assert_eq!(
            result.payload.image.map(|i| i.to_string()),
            Some("ns/app:1".to_string())
        );
    }

    #[tokio::test]
    async fn test_request_uses_context_working_dir() {
        let launcher = ScriptedLauncher::new().then("Version: 3.33.8.1\n", 0);
        let context = LaunchContext::default().with_working_dir("/work");
        VersionCommand::builder("spoon")
            .build()
            .unwrap()
            .run(&launcher, &context)
            .await
            .unwrap();

        let requests = launcher.requests.lock().unwrap();
        assert_eq!(requests[0].program, "spoon");
        assert_eq!(requests[0].args, vec!["version"]);
        assert_eq!(requests[0].working_dir, Some(PathBuf::from("/work")));
    }

    #[test]
    fn test_empty_exit_code_set_rejected() {
        assert!(parse_exit_codes(Vec::new()).is_err());
    }
}
