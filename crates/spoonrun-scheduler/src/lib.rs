//! Run a command as an OS scheduled task and wait for it within a fixed
//! budget.
//!
//! # Workflow
//!
//! [`ScheduledTaskController::run_to_completion`] replaces any leftover task
//! of the same name, creates and triggers the task, polls its status until it
//! leaves "Running" or the [`PollPolicy`] budget runs out, optionally checks
//! for an [`ArtifactExpectation`], and deletes the task on every exit path.
//!
//! The scheduler itself sits behind [`TaskScheduler`];
//! [`SchtasksScheduler`] drives `schtasks` through a
//! [`spoonrun_core::ProcessLauncher`].

pub mod artifact;
pub mod config;
pub mod controller;
pub mod error;
pub mod profile;
pub mod schtasks;
pub mod task;

pub use artifact::ArtifactExpectation;
pub use config::SchedulerConfig;
pub use controller::{PollPolicy, ScheduledTaskController, TaskOutcome};
pub use error::{Result, SchedulerError};
pub use profile::{ProfilingJob, task_name_for};
pub use schtasks::{SchtasksScheduler, TaskScheduler};
pub use task::{ScheduledTask, TaskName, TaskState};
