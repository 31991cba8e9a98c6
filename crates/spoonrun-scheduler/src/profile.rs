//! Profiling jobs: run a tool command as a scheduled task and collect the
//! file it leaves behind.

use serde::Serialize;
use spoonrun_core::CoreError;
use spoonrun_core::commands::ModelCommand;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::artifact::ArtifactExpectation;
use crate::controller::{ScheduledTaskController, TaskOutcome};
use crate::error::Result;
use crate::task::{ScheduledTask, TaskName};

pub const TASK_NAME_PREFIX: &str = "spoonrun-profile-";

/// Task name for a project key; characters outside `[A-Za-z0-9_-]` become `_`.
pub fn task_name_for(project: &str) -> Result<TaskName> {
    if project.trim().is_empty() {
        return Err(CoreError::config("profile project key is empty").into());
    }
    let sanitized: String = project
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    TaskName::new(format!("{TASK_NAME_PREFIX}{sanitized}"))
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfilingJob {
    project: String,
    task: TaskName,
    command_line: String,
    artifact: ArtifactExpectation,
}

impl ProfilingJob {
    pub fn new(
        project: &str,
        command_line: impl Into<String>,
        artifact: ArtifactExpectation,
    ) -> Result<Self> {
        let command_line = command_line.into();
        if command_line.trim().is_empty() {
            return Err(CoreError::config("profile command line is empty").into());
        }
        Ok(Self {
            project: project.to_string(),
            task: task_name_for(project)?,
            command_line,
            artifact,
        })
    }

    /// Profile a `model` invocation.
    pub fn for_model(
        project: &str,
        command: &ModelCommand,
        artifact: ArtifactExpectation,
    ) -> Result<Self> {
        Self::new(project, command.command_line(), artifact)
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn task_name(&self) -> &TaskName {
        &self.task
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn artifact(&self) -> &ArtifactExpectation {
        &self.artifact
    }

    pub async fn run(
        &self,
        controller: &ScheduledTaskController,
        cancel: &CancellationToken,
    ) -> Result<TaskOutcome> {
        info!(
            project = %self.project,
            task = %self.task,
            artifact_dir = %self.artifact.dir().display(),
            "Starting profiling job"
        );
        let task = ScheduledTask::new(self.task.clone(), self.command_line.clone());
        controller
            .run_to_completion(task, Some(&self.artifact), cancel)
            .await
    }
}
