//! `config`: show or change the hub the tool talks to.

use std::sync::LazyLock;

use tracing::{debug, warn};
use url::Url;

use super::{ToolCommand, require_program};
use crate::command_line::{CommandSpec, CommandSpecBuilder};
use crate::error::{CoreError, Result};
use crate::output::{CapturedOutput, ExtractionPattern};

static HUB_SERVER: LazyLock<ExtractionPattern> = LazyLock::new(|| {
    ExtractionPattern::new(r"(?i)Hub server:\s+(\S+)").expect("Invalid hub server pattern")
});

#[derive(Debug, Clone)]
pub struct ConfigCommand {
    spec: CommandSpec,
}

impl ConfigCommand {
    pub fn builder(program: impl Into<String>) -> ConfigCommandBuilder {
        ConfigCommandBuilder {
            program: program.into(),
            hub: None,
            reset: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigCommandBuilder {
    program: String,
    hub: Option<Url>,
    reset: bool,
}

impl ConfigCommandBuilder {
    pub fn hub(mut self, url: &str) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| CoreError::config(format!("hub: invalid URL '{url}': {e}")))?;
        self.hub = Some(parsed);
        Ok(self)
    }

    pub fn reset(mut self, enabled: bool) -> Self {
        self.reset = enabled;
        self
    }

    pub fn build(self) -> Result<ConfigCommand> {
        require_program("config", &self.program)?;
        if self.reset && self.hub.is_some() {
            return Err(CoreError::config(
                "config: --reset and --hub cannot be combined",
            ));
        }

        let spec = CommandSpecBuilder::new(self.program)
            .arg("config")
            .opt_arg(self.hub.map(|hub| format!("--hub={hub}")))
            .arg_if(self.reset, "--reset")
            .build();
        Ok(ConfigCommand { spec })
    }
}

impl ToolCommand for ConfigCommand {
    /// The configured hub as printed, or `None` when the tool has no hub set.
    type Payload = Option<String>;

    fn verb(&self) -> &'static str {
        "config"
    }

    fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    fn interpret(&self, _exit_code: i32, output: &CapturedOutput) -> Result<Option<String>> {
        let Some(hub) = output.find_all(&HUB_SERVER).into_iter().next() else {
            debug!("No hub server configured");
            return Ok(None);
        };

        if let Err(e) = Url::parse(hub) {
            warn!(hub, error = %e, "Hub server is not an absolute URL");
        }
        Ok(Some(hub.to_string()))
    }
}
