//! Explicit tool configuration.
//!
//! Everything the commands need about the host (where the tool lives, how
//! its console output is encoded, how much of it to keep) is passed in
//! through this value rather than looked up globally.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::launcher::LaunchContext;
use crate::output::{DEFAULT_OUTPUT_BUDGET, OutputCallback, resolve_encoding};

pub const DEFAULT_TOOL_EXECUTABLE: &str = "spoon";
pub const DEFAULT_ENCODING: &str = "utf-8";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Tool executable name or absolute path
    pub executable: String,
    /// Working directory for every invocation
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables
    pub env: BTreeMap<String, String>,
    /// Console output encoding label
    pub encoding: String,
    /// Bytes of normalized output retained by harvesting commands
    pub output_budget: usize,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_TOOL_EXECUTABLE.to_string(),
            working_dir: None,
            env: BTreeMap::new(),
            encoding: DEFAULT_ENCODING.to_string(),
            output_budget: DEFAULT_OUTPUT_BUDGET,
        }
    }
}

impl ToolConfig {
    /// Resolve into a launch context, validating the encoding label.
    pub fn launch_context(&self, echo: Option<OutputCallback>) -> Result<LaunchContext> {
        let encoding = resolve_encoding(&self.encoding)?;
        Ok(LaunchContext {
            working_dir: self.working_dir.clone(),
            env: self.env.clone(),
            encoding,
            output_budget: self.output_budget,
            echo,
        })
    }
}
