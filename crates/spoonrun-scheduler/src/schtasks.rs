//! Task scheduler primitives backed by the Windows `schtasks` CLI.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Local};
use spoonrun_core::{
    CapturedOutput, CommandSpec, CommandSpecBuilder, ExtractionPattern, LaunchContext,
    LaunchRequest, ProcessLauncher,
};
use tracing::debug;

use crate::error::{Result, SchedulerError};
use crate::task::TaskName;

pub const DEFAULT_SCHTASKS_EXECUTABLE: &str = "schtasks";

/// Last quoted field of a `/fo csv` row.
static LAST_QUOTED_FIELD: LazyLock<ExtractionPattern> = LazyLock::new(|| {
    ExtractionPattern::new(r#""([^"]*)"\s*$"#).expect("Invalid CSV status pattern")
});

/// Create/run/query/delete primitives of an OS task scheduler.
#[async_trait]
pub trait TaskScheduler: Send + Sync {
    async fn create(&self, name: &TaskName, command_line: &str) -> Result<()>;

    /// Trigger the task; returns without waiting for it to finish.
    async fn run(&self, name: &TaskName) -> Result<()>;

    /// Most recent non-empty status, or `None` when the task does not exist.
    async fn query(&self, name: &TaskName) -> Result<Option<String>>;

    async fn delete(&self, name: &TaskName) -> Result<()>;
}

pub struct SchtasksScheduler {
    launcher: Arc<dyn ProcessLauncher>,
    program: String,
    context: LaunchContext,
}

impl SchtasksScheduler {
    pub fn new(launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            launcher,
            program: DEFAULT_SCHTASKS_EXECUTABLE.to_string(),
            context: LaunchContext::default(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_context(mut self, context: LaunchContext) -> Self {
        self.context = context;
        self
    }

    /// `/create` command; the start time only has to be valid, the task is
    /// always triggered explicitly with `/run`.
    pub fn create_spec(
        &self,
        name: &TaskName,
        command_line: &str,
        now: DateTime<Local>,
    ) -> CommandSpec {
        let start = now + ChronoDuration::days(1);
        CommandSpecBuilder::new(self.program.as_str())
            .arg("/create")
            .arg("/tn")
            .arg(name.as_str())
            .arg("/tr")
            .quoted_arg(command_line)
            .arg("/sc")
            .arg("ONCE")
            .arg("/sd")
            .arg(start.format("%m/%d/%Y").to_string())
            .arg("/st")
            .arg(start.format("%H:%M").to_string())
            .build()
    }

    pub fn run_spec(&self, name: &TaskName) -> CommandSpec {
        CommandSpecBuilder::new(self.program.as_str())
            .arg("/run")
            .arg("/tn")
            .arg(name.as_str())
            .build()
    }

    pub fn query_spec(&self, name: &TaskName) -> CommandSpec {
        CommandSpecBuilder::new(self.program.as_str())
            .arg("/query")
            .arg("/tn")
            .arg(name.as_str())
            .arg("/fo")
            .arg("csv")
            .arg("/nh")
            .build()
    }

    pub fn delete_spec(&self, name: &TaskName) -> CommandSpec {
        CommandSpecBuilder::new(self.program.as_str())
            .arg("/delete")
            .arg("/tn")
            .arg(name.as_str())
            .arg("/f")
            .build()
    }

    async fn launch(&self, spec: &CommandSpec) -> Result<(i32, CapturedOutput)> {
        let request = LaunchRequest::from_spec(spec, &self.context);
        let mut collector = self.context.harvesting_collector();
        let exit_code = self.launcher.launch(&request, &mut collector).await?;
        Ok((exit_code, collector.finish()))
    }

    async fn launch_checked(
        &self,
        operation: &'static str,
        name: &TaskName,
        spec: &CommandSpec,
    ) -> Result<()> {
        let (exit_code, _) = self.launch(spec).await?;
        if exit_code != 0 {
            return Err(SchedulerError::SchedulerCommand {
                operation,
                task: name.to_string(),
                code: exit_code,
            });
        }
        Ok(())
    }
}

/// Latest non-empty status among `/fo csv` rows.
pub fn parse_status(output: &CapturedOutput) -> Option<String> {
    output
        .find_all(&LAST_QUOTED_FIELD)
        .into_iter()
        .rev()
        .map(str::trim)
        .find(|status| !status.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl TaskScheduler for SchtasksScheduler {
    async fn create(&self, name: &TaskName, command_line: &str) -> Result<()> {
        let spec = self.create_spec(name, command_line, Local::now());
        self.launch_checked("create", name, &spec).await
    }

    async fn run(&self, name: &TaskName) -> Result<()> {
        let spec = self.run_spec(name);
        self.launch_checked("run", name, &spec).await
    }

    async fn query(&self, name: &TaskName) -> Result<Option<String>> {
        let (exit_code, output) = self.launch(&self.query_spec(name)).await?;
        if exit_code != 0 {
            debug!(task = %name, exit_code, "Task not found by scheduler query");
            return Ok(None);
        }
        Ok(parse_status(&output))
    }

    async fn delete(&self, name: &TaskName) -> Result<()> {
        let spec = self.delete_spec(name);
        self.launch_checked("delete", name, &spec).await
    }
}
