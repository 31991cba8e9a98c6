mod cli;
mod commands;
mod completions;
mod config;
mod error;
mod logging;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use commands::Session;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error::handle_error(err);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        completions::write_completions(shell, &mut std::io::stdout().lock());
        return Ok(());
    }

    let mut config = config::CliConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.tool, cli.working_dir);

    // Held until exit so buffered file logs are flushed.
    let _guard = logging::init(cli.verbose, config.logging.log_dir.as_deref())?;

    let session = Session::new(config, cli.format);
    commands::run(cli.command, &session).await
}
