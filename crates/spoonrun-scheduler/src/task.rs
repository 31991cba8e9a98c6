//! Scheduled task identity and lifecycle state.

use std::fmt;

use serde::{Serialize, Serializer};
use spoonrun_core::CoreError;

use crate::error::Result;

/// The only status the scheduler reports for a task that is still executing.
pub const RUNNING_STATUS: &str = "Running";

/// Whether a polled status means the task is still in progress.
pub fn is_running(status: Option<&str>) -> bool {
    status == Some(RUNNING_STATUS)
}

/// Scheduler-wide unique task name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskName(String);

impl TaskName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == '"') {
            return Err(CoreError::config(format!(
                "task name '{name}' must be a single token without whitespace or quotes"
            ))
            .into());
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for TaskName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Absent,
    Defined,
    Running,
    Finished,
}

#[derive(Debug, Clone)]
pub struct ScheduledTask {
    name: TaskName,
    command_line: String,
    state: TaskState,
}

impl ScheduledTask {
    pub fn new(name: TaskName, command_line: impl Into<String>) -> Self {
        Self {
            name,
            command_line: command_line.into(),
            state: TaskState::Absent,
        }
    }

    pub fn name(&self) -> &TaskName {
        &self.name
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: TaskState) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_name_validation() {
        assert!(TaskName::new("spoonrun-profile-app").is_ok());
        assert!(TaskName::new("").is_err());
        assert!(TaskName::new("has space").is_err());
        assert!(TaskName::new("quote\"d").is_err());
    }

    #[test]
    fn test_only_literal_running_is_in_progress() {
        assert!(is_running(Some("Running")));
        assert!(!is_running(Some("running")));
        assert!(!is_running(Some("Ready")));
        assert!(!is_running(None));
    }

    #[test]
    fn test_new_task_is_absent() {
        let task = ScheduledTask::new(TaskName::new("t").unwrap(), "spoon model app");
        assert_eq!(task.state(), TaskState::Absent);
        assert_eq!(task.command_line(), "spoon model app");
    }
}
