//! CLI configuration file support
//!
//! Loads configuration from ~/.config/spoonrun/config.toml

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use spoonrun_core::ToolConfig;
use spoonrun_scheduler::SchedulerConfig;

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// How to invoke the tool
    #[serde(default)]
    pub tool: ToolConfig,
    /// Scheduled task settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write daily rolling log files here instead of stderr
    pub log_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Load from an explicit path, or the default path when none is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from_path(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a specific path. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Get the default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("spoonrun").join("config.toml"))
    }

    /// Apply command-line overrides on top of the file.
    pub fn apply_overrides(&mut self, tool: Option<String>, working_dir: Option<PathBuf>) {
        if let Some(tool) = tool {
            self.tool.executable = tool;
        }
        if let Some(dir) = working_dir {
            self.tool.working_dir = Some(dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = CliConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.tool.executable, "spoon");
        assert_eq!(config.scheduler.max_attempts, 60);
        assert!(config.logging.log_dir.is_none());
    }

    #[test]
    fn test_full_file_parses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[tool]
executable = "C:/spoon/spoon.exe"
working_dir = "C:/build"
encoding = "windows-1252"
output_budget = 4096

[tool.env]
SPOON_HOME = "C:/spoon"

[scheduler]
poll_interval_secs = 2
max_attempts = 10

[logging]
log_dir = "/var/log/spoonrun"
"#,
        )
        .unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.tool.executable, "C:/spoon/spoon.exe");
        assert_eq!(config.tool.output_budget, 4096);
        assert_eq!(
            config.tool.env.get("SPOON_HOME").map(String::as_str),
            Some("C:/spoon")
        );
        assert_eq!(config.scheduler.executable, "schtasks");
        assert_eq!(config.scheduler.poll_interval_secs, 2);
        assert_eq!(
            config.logging.log_dir,
            Some(PathBuf::from("/var/log/spoonrun"))
        );
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tool\nexecutable = ").unwrap();
        assert!(CliConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let mut config = CliConfig::default();
        config.apply_overrides(Some("/opt/spoon".to_string()), Some(PathBuf::from("/work")));
        assert_eq!(config.tool.executable, "/opt/spoon");
        assert_eq!(config.tool.working_dir, Some(PathBuf::from("/work")));
    }
}
