//! Explicit scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::controller::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL, PollPolicy};
use crate::error::Result;
use crate::schtasks::DEFAULT_SCHTASKS_EXECUTABLE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Scheduler CLI executable name or absolute path
    pub executable: String,
    /// Seconds slept before each status check
    pub poll_interval_secs: u64,
    /// Status checks before giving up
    pub max_attempts: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_SCHTASKS_EXECUTABLE.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl SchedulerConfig {
    pub fn poll_policy(&self) -> Result<PollPolicy> {
        PollPolicy::new(
            Duration::from_secs(self.poll_interval_secs),
            self.max_attempts,
        )
    }
}
