pub mod profile;
pub mod tool;

use std::sync::Arc;

use anyhow::{Context, Result};
use spoonrun_core::{LaunchContext, TokioProcessLauncher};

use crate::cli::Commands;
use crate::config::CliConfig;
use crate::output::OutputFormat;

/// Resolved configuration shared by every command handler.
pub struct Session {
    pub config: CliConfig,
    pub format: OutputFormat,
    pub launcher: Arc<TokioProcessLauncher>,
}

impl Session {
    pub fn new(config: CliConfig, format: OutputFormat) -> Self {
        Self {
            config,
            format,
            launcher: Arc::new(TokioProcessLauncher::new()),
        }
    }

    pub fn program(&self) -> &str {
        &self.config.tool.executable
    }

    /// Launch context echoing tool output as it arrives.
    pub fn launch_context(&self) -> Result<LaunchContext> {
        self.config
            .tool
            .launch_context(Some(self.format.echo_callback()))
            .context("Invalid [tool] configuration")
    }
}

pub async fn run(command: Commands, session: &Session) -> Result<()> {
    match command {
        Commands::Build(args) => tool::build(session, args).await,
        Commands::Check(args) => tool::check(session, args).await,
        Commands::Config(args) => tool::config(session, args).await,
        Commands::Import(args) => tool::import(session, args).await,
        Commands::Pull(args) => tool::pull(session, args).await,
        Commands::Push(args) => tool::push(session, args).await,
        Commands::PushModel(args) => tool::push_model(session, args).await,
        Commands::Model(args) => tool::model(session, args).await,
        Commands::Version(args) => tool::version(session, args).await,
        Commands::Profile(args) => profile::run(session, args).await,
        // Handled before the session exists.
        Commands::Completions { .. } => Ok(()),
    }
}
