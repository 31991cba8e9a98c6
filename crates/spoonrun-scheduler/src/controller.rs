//! Bounded-wait scheduled task driver.
//!
//! [`ScheduledTaskController`] walks a task through
//! `Absent → Defined → Running → Finished` and always returns it to `Absent`.
//! The wait is a fixed number of status checks spaced by the poll interval;
//! each sleep races a [`CancellationToken`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use spoonrun_core::CoreError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::artifact::ArtifactExpectation;
use crate::error::{Result, SchedulerError};
use crate::schtasks::TaskScheduler;
use crate::task::{ScheduledTask, TaskName, TaskState, is_running};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Result<Self> {
        if max_attempts == 0 {
            return Err(CoreError::config("poll max_attempts must be at least 1").into());
        }
        Ok(Self {
            interval,
            max_attempts,
        })
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Result of a task that ran to completion.
#[derive(Debug, Clone, Serialize)]
pub struct TaskOutcome {
    pub task: TaskName,
    /// Last status reported before the task left "Running".
    pub final_status: Option<String>,
    pub attempts: u32,
    pub artifacts: Vec<PathBuf>,
}

pub struct ScheduledTaskController {
    scheduler: Arc<dyn TaskScheduler>,
    policy: PollPolicy,
}

impl ScheduledTaskController {
    pub fn new(scheduler: Arc<dyn TaskScheduler>, policy: PollPolicy) -> Self {
        Self { scheduler, policy }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub async fn create(&self, task: &mut ScheduledTask) -> Result<()> {
        self.scheduler
            .create(task.name(), task.command_line())
            .await?;
        task.set_state(TaskState::Defined);
        info!(task = %task.name(), command = %task.command_line(), "Scheduled task created");
        Ok(())
    }

    /// Trigger the task without waiting for it.
    pub async fn run(&self, task: &mut ScheduledTask) -> Result<()> {
        self.scheduler.run(task.name()).await?;
        task.set_state(TaskState::Running);
        info!(task = %task.name(), "Scheduled task started");
        Ok(())
    }

    /// Query the current status; anything other than "Running" finishes the task.
    pub async fn poll(&self, task: &mut ScheduledTask) -> Result<Option<String>> {
        let status = self.scheduler.query(task.name()).await?;
        debug!(task = %task.name(), status = ?status, "Polled scheduled task");
        if !is_running(status.as_deref()) {
            task.set_state(TaskState::Finished);
        }
        Ok(status)
    }

    /// Remove the task. Failures are logged and dropped.
    pub async fn delete(&self, task: &mut ScheduledTask) {
        match self.scheduler.delete(task.name()).await {
            Ok(()) => debug!(task = %task.name(), "Scheduled task deleted"),
            Err(e) => warn!(task = %task.name(), error = %e, "Failed to delete scheduled task"),
        }
        task.set_state(TaskState::Absent);
    }

    pub async fn exists(&self, name: &TaskName) -> Result<bool> {
        Ok(self.scheduler.query(name).await?.is_some())
    }

    /// Sleep then poll, up to the policy's attempt budget.
    ///
    /// Returns the final status and the number of status checks made.
    pub async fn wait_for_completion(
        &self,
        task: &mut ScheduledTask,
        cancel: &CancellationToken,
    ) -> Result<(Option<String>, u32)> {
        for attempt in 1..=self.policy.max_attempts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(task = %task.name(), attempt, "Wait for scheduled task cancelled");
                    return Err(SchedulerError::Cancelled {
                        task: task.name().to_string(),
                    });
                }
                _ = tokio::time::sleep(self.policy.interval) => {}
            }

            let status = self.poll(task).await?;
            if task.state() == TaskState::Finished {
                return Ok((status, attempt));
            }
        }

        Err(SchedulerError::Timeout {
            task: task.name().to_string(),
            attempts: self.policy.max_attempts,
        })
    }

    /// Replace any same-named task, run it, wait for it and check its
    /// artifact. The task is deleted on every path out.
    pub async fn run_to_completion(
        &self,
        mut task: ScheduledTask,
        artifact: Option<&ArtifactExpectation>,
        cancel: &CancellationToken,
    ) -> Result<TaskOutcome> {
        let result = self.drive(&mut task, artifact, cancel).await;
        self.delete(&mut task).await;

        match &result {
            Ok(outcome) => info!(
                task = %task.name(),
                status = ?outcome.final_status,
                attempts = outcome.attempts,
                artifacts = outcome.artifacts.len(),
                "Scheduled task completed"
            ),
            Err(e) => warn!(task = %task.name(), error = %e, "Scheduled task failed"),
        }
        result
    }

    async fn drive(
        &self,
        task: &mut ScheduledTask,
        artifact: Option<&ArtifactExpectation>,
        cancel: &CancellationToken,
    ) -> Result<TaskOutcome> {
        if self.exists(task.name()).await? {
            info!(task = %task.name(), "Removing leftover scheduled task");
            self.delete(task).await;
        }

        self.create(task).await?;
        self.run(task).await?;
        let (final_status, attempts) = self.wait_for_completion(task, cancel).await?;

        let artifacts = match artifact {
            Some(expectation) => expectation.verify()?,
            None => Vec::new(),
        };

        Ok(TaskOutcome {
            task: task.name().clone(),
            final_status,
            attempts,
            artifacts,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeScheduler;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const RUNNING: Option<&str> = Some("Running");

    fn task() -> ScheduledTask {
        ScheduledTask::new(
            TaskName::new("spoonrun-profile-app").unwrap(),
            "spoon model ns/app",
        )
    }

    fn controller(scheduler: Arc<FakeScheduler>, max_attempts: u32) -> ScheduledTaskController {
        ScheduledTaskController::new(
            scheduler,
            PollPolicy::new(Duration::from_secs(5), max_attempts).unwrap(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_completes_within_budget() {
        let scheduler = Arc::new(FakeScheduler::new(&[
            None,
            RUNNING,
            RUNNING,
            RUNNING,
            Some("Ready"),
        ]));
        let outcome = controller(scheduler.clone(), 4)
            .run_to_completion(task(), None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.final_status.as_deref(), Some("Ready"));
        assert_eq!(outcome.attempts, 4);
        assert_eq!(
            scheduler.calls(),
            vec!["query", "create", "run", "query", "query", "query", "query", "delete"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_budget_exhausted() {
        let scheduler = Arc::new(FakeScheduler::new(&[
            None,
            RUNNING,
            RUNNING,
            RUNNING,
            Some("Ready"),
        ]));
        let err = controller(scheduler.clone(), 2)
            .run_to_completion(task(), None, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SchedulerError::Timeout { attempts: 2, .. }));
        assert_eq!(scheduler.count("delete"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_status_counts_as_finished() {
        let scheduler = Arc::new(FakeScheduler::new(&[None, RUNNING, None]));
        let outcome = controller(scheduler, 5)
            .run_to_completion(task(), None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.final_status, None);
        assert_eq!(outcome.attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_runs_once_when_run_fails() {
        let scheduler = Arc::new(FakeScheduler::new(&[None]).failing_run());
        let err = controller(scheduler.clone(), 3)
            .run_to_completion(task(), None, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SchedulerError::SchedulerCommand {
                operation: "run",
                ..
            }
        ));
        assert_eq!(scheduler.count("delete"), 1);
        assert_eq!(scheduler.count("query"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_leftover_task_is_replaced() {
        let scheduler = Arc::new(FakeScheduler::new(&[Some("Ready"), Some("Ready")]));
        controller(scheduler.clone(), 3)
            .run_to_completion(task(), None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            scheduler.calls(),
            vec!["query", "delete", "create", "run", "query", "delete"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_still_deletes() {
        let scheduler = Arc::new(FakeScheduler::new(&[None, RUNNING, RUNNING]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = controller(scheduler.clone(), 10)
            .run_to_completion(task(), None, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, SchedulerError::Cancelled { .. }));
        assert_eq!(scheduler.count("delete"), 1);
        assert_eq!(scheduler.count("query"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_wait_still_deletes() {
        let scheduler = Arc::new(FakeScheduler::new(&[
            None, RUNNING, RUNNING, RUNNING, RUNNING,
        ]));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        // Polls land at 5s and 10s; the third sleep is interrupted.
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(12)).await;
            trigger.cancel();
        });

        let err = controller(scheduler.clone(), 10)
            .run_to_completion(task(), None, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, SchedulerError::Cancelled { .. }));
        assert_eq!(scheduler.count("query"), 3);
        assert_eq!(scheduler.count("delete"), 1);
        assert_eq!(
            scheduler.calls(),
            vec!["query", "create", "run", "query", "query", "delete"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_failure_does_not_mask_error() {
        let scheduler = Arc::new(
            FakeScheduler::new(&[None])
                .failing_run()
                .failing_delete(),
        );
        let err = controller(scheduler, 3)
            .run_to_completion(task(), None, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SchedulerError::SchedulerCommand {
                operation: "run",
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_artifact_checked_after_completion() {
        let dir = TempDir::new().unwrap();
        let expectation = ArtifactExpectation::new(dir.path(), "xlayer");

        let scheduler = Arc::new(FakeScheduler::new(&[None, Some("Ready")]));
        let err = controller(scheduler.clone(), 3)
            .run_to_completion(task(), Some(&expectation), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulerError::MissingArtifact { .. }));
        assert_eq!(scheduler.count("delete"), 1);

        fs::write(dir.path().join("app.xlayer"), b"model").unwrap();
        let scheduler = Arc::new(FakeScheduler::new(&[None, Some("Ready")]));
        let outcome = controller(scheduler, 3)
            .run_to_completion(task(), Some(&expectation), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.artifacts, vec![dir.path().join("app.xlayer")]);
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let scheduler = Arc::new(FakeScheduler::new(&[RUNNING, Some("Ready")]));
        let controller = controller(scheduler, 3);
        let mut task = task();

        controller.create(&mut task).await.unwrap();
        assert_eq!(task.state(), TaskState::Defined);
        controller.run(&mut task).await.unwrap();
        assert_eq!(task.state(), TaskState::Running);
        controller.poll(&mut task).await.unwrap();
        assert_eq!(task.state(), TaskState::Running);
        controller.poll(&mut task).await.unwrap();
        assert_eq!(task.state(), TaskState::Finished);
        controller.delete(&mut task).await;
        assert_eq!(task.state(), TaskState::Absent);
    }

    #[test]
    fn test_zero_attempt_policy_rejected() {
        assert!(PollPolicy::new(Duration::from_secs(1), 0).is_err());
        assert_eq!(PollPolicy::default().max_attempts, 60);
    }
}
