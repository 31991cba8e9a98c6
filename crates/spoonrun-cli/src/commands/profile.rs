use std::sync::Arc;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use spoonrun_core::commands::ModelCommand;
use spoonrun_scheduler::{
    ArtifactExpectation, ProfilingJob, ScheduledTaskController, SchtasksScheduler,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::Session;
use crate::cli::ProfileArgs;
use crate::output::json::print_json;
use crate::output::table::{key_value_table, print_table};

pub async fn run(session: &Session, args: ProfileArgs) -> Result<()> {
    let artifact = ArtifactExpectation::new(args.artifact_dir, &args.extension);
    let job = match (args.image, args.command) {
        (Some(image), _) => {
            let model = ModelCommand::builder(session.program())
                .image(&image)?
                .include_exe(args.include_exe)
                .screencast(args.screencast)
                .build()?;
            ProfilingJob::for_model(&args.project, &model, artifact)?
        }
        (None, Some(command_line)) => ProfilingJob::new(&args.project, command_line, artifact)?,
        (None, None) => bail!("profile needs either --command or --image"),
    };

    let scheduler_config = &session.config.scheduler;
    let policy = scheduler_config
        .poll_policy()
        .context("Invalid [scheduler] configuration")?;
    let context = session.launch_context()?;
    let scheduler = SchtasksScheduler::new(session.launcher.clone())
        .with_program(scheduler_config.executable.as_str())
        .with_context(context);
    let controller = ScheduledTaskController::new(Arc::new(scheduler), policy);

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling scheduled task wait");
            ctrl_c_cancel.cancel();
        }
    });

    info!(
        task = %job.task_name(),
        interval_secs = policy.interval.as_secs(),
        max_attempts = policy.max_attempts,
        "Running profiling job"
    );
    let outcome = job.run(&controller, &cancel).await;
    ctrl_c.abort();
    let outcome = outcome.with_context(|| format!("Profiling job '{}' failed", args.project))?;

    if session.format.is_json() {
        return print_json(&outcome);
    }

    let artifacts = outcome
        .artifacts
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    print_table(key_value_table([
        ("Task", outcome.task.to_string()),
        (
            "Final status",
            outcome.final_status.clone().unwrap_or_else(|| "-".to_string()),
        ),
        ("Status checks", outcome.attempts.to_string()),
        ("Artifacts", artifacts),
    ]))?;
    println!("{}", "Profiling complete".green().bold());
    Ok(())
}
