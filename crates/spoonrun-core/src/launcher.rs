//! Process launching.
//!
//! [`ProcessLauncher`] is the boundary to the operating system: it runs one
//! program to completion and streams every output line into an
//! [`OutputSink`]. [`TokioProcessLauncher`] is the production implementation.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::command_line::CommandSpec;
use crate::error::{CoreError, Result};
use crate::output::{DEFAULT_OUTPUT_BUDGET, OutputCallback, OutputCollector, OutputSink};

/// Everything needed to start one process.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl LaunchRequest {
    pub fn from_spec(spec: &CommandSpec, context: &LaunchContext) -> Self {
        Self {
            program: spec.program().to_string(),
            args: spec.arg_values(),
            working_dir: context.working_dir.clone(),
            env: context.env.clone(),
        }
    }
}

/// Runs a process to completion, writing its output to a sink.
///
/// Implementations must drain all output before returning the exit code.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    async fn launch(&self, request: &LaunchRequest, sink: &mut dyn OutputSink) -> Result<i32>;
}

/// Per-invocation settings shared by every command run.
#[derive(Clone)]
pub struct LaunchContext {
    pub working_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub encoding: &'static Encoding,
    pub output_budget: usize,
    pub echo: Option<OutputCallback>,
}

impl Default for LaunchContext {
    fn default() -> Self {
        Self {
            working_dir: None,
            env: BTreeMap::new(),
            encoding: UTF_8,
            output_budget: DEFAULT_OUTPUT_BUDGET,
            echo: None,
        }
    }
}

impl LaunchContext {
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_output_budget(mut self, bytes: usize) -> Self {
        self.output_budget = bytes;
        self
    }

    pub fn with_echo(mut self, echo: OutputCallback) -> Self {
        self.echo = Some(echo);
        self
    }

    /// Collector retaining up to the configured budget.
    pub fn harvesting_collector(&self) -> OutputCollector {
        OutputCollector::new(self.output_budget)
            .with_encoding(self.encoding)
            .with_echo_opt(self.echo.clone())
    }

    /// Collector that only echoes.
    pub fn echo_collector(&self) -> OutputCollector {
        OutputCollector::echo_only()
            .with_encoding(self.encoding)
            .with_echo_opt(self.echo.clone())
    }
}

impl std::fmt::Debug for LaunchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchContext")
            .field("working_dir", &self.working_dir)
            .field("env", &self.env.keys().collect::<Vec<_>>())
            .field("encoding", &self.encoding.name())
            .field("output_budget", &self.output_budget)
            .field("echo", &self.echo.is_some())
            .finish()
    }
}

/// Launches real processes with `tokio::process`, merging stdout and stderr.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessLauncher;

impl TokioProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessLauncher for TokioProcessLauncher {
    async fn launch(&self, request: &LaunchRequest, sink: &mut dyn OutputSink) -> Result<i32> {
        info!(
            program = %request.program,
            args = ?request.args,
            working_dir = ?request.working_dir,
            "Launching process"
        );

        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args)
            .envs(&request.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &request.working_dir {
            cmd.current_dir(dir);
        }

        let launch_error = |source: std::io::Error| CoreError::Launch {
            program: request.program.clone(),
            source,
        };

        let mut child = cmd.spawn().map_err(|e| {
            error!(program = %request.program, error = %e, "Failed to spawn process");
            launch_error(e)
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| launch_error(std::io::Error::other("stdout was not captured")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| launch_error(std::io::Error::other("stderr was not captured")))?;

        let mut stdout_reader = BufReader::new(stdout);
        let mut stderr_reader = BufReader::new(stderr);
        let mut stdout_line = Vec::new();
        let mut stderr_line = Vec::new();
        let mut stdout_open = true;
        let mut stderr_open = true;

        // read_until keeps partial data in the buffer when another branch wins,
        // so each stream owns its own line buffer across iterations.
        while stdout_open || stderr_open {
            tokio::select! {
                read = stdout_reader.read_until(b'\n', &mut stdout_line), if stdout_open => {
                    stdout_open = drain_read(read, &mut stdout_line, sink).map_err(launch_error)?;
                }
                read = stderr_reader.read_until(b'\n', &mut stderr_line), if stderr_open => {
                    stderr_open = drain_read(read, &mut stderr_line, sink).map_err(launch_error)?;
                }
            }
        }

        let status = child.wait().await.map_err(launch_error)?;
        let exit_code = status.code().unwrap_or(-1);
        debug!(program = %request.program, exit_code, "Process exited");
        Ok(exit_code)
    }
}

/// Hand a completed line to the sink; returns whether the stream is still open.
fn drain_read(
    read: std::io::Result<usize>,
    line: &mut Vec<u8>,
    sink: &mut dyn OutputSink,
) -> std::io::Result<bool> {
    let read = read?;
    if read == 0 {
        if !line.is_empty() {
            sink.accept_line(line);
            line.clear();
        }
        return Ok(false);
    }

    if line.last() == Some(&b'\n') {
        sink.accept_line(line);
        line.clear();
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_spec_carries_context() {
        let spec = crate::command_line::CommandSpecBuilder::new("spoon")
            .arg("version")
            .build();
        let context = LaunchContext::default()
            .with_working_dir("/tmp")
            .with_env("SPOON_HOME", "/opt/spoon");
        let request = LaunchRequest::from_spec(&spec, &context);

        assert_eq!(request.program, "spoon");
        assert_eq!(request.args, vec!["version"]);
        assert_eq!(request.working_dir, Some(PathBuf::from("/tmp")));
        assert_eq!(request.env.get("SPOON_HOME").map(String::as_str), Some("/opt/spoon"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_launch_drains_both_streams_before_exit() {
        let request = LaunchRequest {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "echo out; echo err 1>&2; printf tail; exit 3".to_string(),
            ],
            working_dir: None,
            env: BTreeMap::new(),
        };
        let mut collector = OutputCollector::new(DEFAULT_OUTPUT_BUDGET);
        let code = TokioProcessLauncher::new()
            .launch(&request, &mut collector)
            .await
            .unwrap();
        let output = collector.finish();

        assert_eq!(code, 3);
        let mut texts: Vec<&str> = output.lines().iter().map(|l| l.text.as_str()).collect();
        texts.sort();
        assert_eq!(texts, vec!["err", "out", "tail"]);
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_error() {
        let request = LaunchRequest {
            program: "definitely-not-a-real-program-4711".to_string(),
            args: vec![],
            working_dir: None,
            env: BTreeMap::new(),
        };
        let mut collector = OutputCollector::echo_only();
        let err = TokioProcessLauncher::new()
            .launch(&request, &mut collector)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Launch { .. }));
    }
}
