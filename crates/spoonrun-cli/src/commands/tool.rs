use anyhow::{Context, Result};
use colored::Colorize;
use spoonrun_core::commands::{
    BuildCommand, CheckCommand, ConfigCommand, ImportCommand, ModelCommand, PullCommand,
    PushCommand, PushModelCommand, VersionCommand,
};
use spoonrun_core::{CommandResult, ToolCommand, Version};

use super::Session;
use crate::cli::{
    BuildArgs, CheckArgs, ConfigArgs, ImportArgs, ModelArgs, PullArgs, PushArgs, PushModelArgs,
    VersionArgs,
};
use crate::output::json::{ExitReport, print_json};
use crate::output::table::{key_value_table, print_table};

async fn execute<C: ToolCommand>(
    session: &Session,
    command: C,
) -> Result<CommandResult<C::Payload>> {
    let verb = command.verb();
    let context = session.launch_context()?;
    command
        .run(session.launcher.as_ref(), &context)
        .await
        .with_context(|| format!("spoon {verb} failed"))
}

/// Report a fire-and-forget command that exited acceptably.
fn report_done(session: &Session, result: &CommandResult<()>, label: &str) -> Result<()> {
    if session.format.is_json() {
        return print_json(&ExitReport {
            command: label,
            exit_code: result.exit_code,
        });
    }
    println!(
        "{} {} (exit code {})",
        "Done:".green().bold(),
        label,
        result.exit_code
    );
    Ok(())
}

pub async fn build(session: &Session, args: BuildArgs) -> Result<()> {
    let mut builder = BuildCommand::builder(session.program())
        .script(args.script)?
        .overwrite(args.overwrite)
        .no_base(args.no_base)
        .diagnostic(args.diagnostic);
    if let Some(name) = &args.name {
        builder = builder.name(name)?;
    }
    if let Some(vm) = &args.vm {
        builder = builder.vm(vm)?;
    }
    if let Some(dir) = args.build_dir {
        builder = builder.working_dir(dir)?;
    }
    for mount in &args.mount {
        builder = builder.mount(mount)?;
    }

    let result = execute(session, builder.build()?).await?;
    if session.format.is_json() {
        print_json(&result)?;
    }

    let image = result
        .payload
        .into_image()
        .context("Build did not produce an image")?;
    if !session.format.is_json() {
        println!("{} {}", "Built image:".green().bold(), image);
    }
    Ok(())
}

pub async fn check(session: &Session, args: CheckArgs) -> Result<()> {
    let mut builder = CheckCommand::builder(session.program())
        .image(&args.image)?
        .diagnostic(args.diagnostic);
    if let Some(vm) = &args.vm {
        builder = builder.vm(vm)?;
    }
    if !args.accept_exit_codes.is_empty() {
        builder = builder.accept_exit_codes(args.accept_exit_codes)?;
    }

    let result = execute(session, builder.build()?).await?;
    report_done(session, &result, &format!("check {}", args.image))
}

pub async fn config(session: &Session, args: ConfigArgs) -> Result<()> {
    let mut builder = ConfigCommand::builder(session.program()).reset(args.reset);
    if let Some(hub) = &args.hub {
        builder = builder.hub(hub)?;
    }

    let result = execute(session, builder.build()?).await?;
    if session.format.is_json() {
        return print_json(&result);
    }

    match result.payload {
        Some(hub) => println!("{} {}", "Hub server:".bold(), hub),
        None => println!("{}", "No hub server configured".yellow()),
    }
    Ok(())
}

pub async fn import(session: &Session, args: ImportArgs) -> Result<()> {
    let mut builder = ImportCommand::builder(session.program())
        .kind(&args.kind)?
        .path(args.path)?
        .overwrite(args.overwrite);
    if let Some(name) = &args.name {
        builder = builder.name(name)?;
    }

    let result = execute(session, builder.build()?).await?;
    if session.format.is_json() {
        return print_json(&result);
    }
    println!("{} {}", "Imported as:".green().bold(), result.payload);
    Ok(())
}

pub async fn pull(session: &Session, args: PullArgs) -> Result<()> {
    let mut builder = PullCommand::builder(session.program()).image(&args.image)?;
    if !args.accept_exit_codes.is_empty() {
        builder = builder.accept_exit_codes(args.accept_exit_codes)?;
    }

    let result = execute(session, builder.build()?).await?;
    report_done(session, &result, &format!("pull {}", args.image))
}

pub async fn push(session: &Session, args: PushArgs) -> Result<()> {
    let mut builder = PushCommand::builder(session.program()).image(&args.image)?;
    if let Some(remote) = &args.remote {
        builder = builder.remote(remote)?;
    }
    if !args.accept_exit_codes.is_empty() {
        builder = builder.accept_exit_codes(args.accept_exit_codes)?;
    }

    let result = execute(session, builder.build()?).await?;
    report_done(session, &result, &format!("push {}", args.image))
}

pub async fn push_model(session: &Session, args: PushModelArgs) -> Result<()> {
    let label = format!("push-model {}", args.model_dir.display());
    let mut builder = PushModelCommand::builder(session.program()).model_dir(args.model_dir)?;
    if let Some(remote) = &args.remote {
        builder = builder.remote(remote)?;
    }
    if !args.accept_exit_codes.is_empty() {
        builder = builder.accept_exit_codes(args.accept_exit_codes)?;
    }

    let result = execute(session, builder.build()?).await?;
    report_done(session, &result, &label)
}

pub async fn model(session: &Session, args: ModelArgs) -> Result<()> {
    let mut builder = ModelCommand::builder(session.program())
        .image(&args.image)?
        .include_exe(args.include_exe)
        .screencast(args.screencast);
    if !args.accept_exit_codes.is_empty() {
        builder = builder.accept_exit_codes(args.accept_exit_codes)?;
    }

    let result = execute(session, builder.build()?).await?;
    report_done(session, &result, &format!("model {}", args.image))
}

pub async fn version(session: &Session, args: VersionArgs) -> Result<()> {
    let minimum = args
        .minimum
        .as_deref()
        .map(Version::parse)
        .transpose()
        .context("Invalid --minimum version")?;

    let command = VersionCommand::builder(session.program()).build()?;
    let result = execute(session, command).await?;

    if session.format.is_json() {
        print_json(&result)?;
    } else {
        print_table(key_value_table([
            ("Tool", session.program().to_string()),
            ("Version", result.payload.to_string()),
        ]))?;
    }

    if let Some(minimum) = minimum {
        let reported = Version::parse(&result.payload).with_context(|| {
            format!(
                "Tool version '{}' cannot be compared with --minimum",
                result.payload
            )
        })?;
        reported.ensure_at_least(&minimum)?;
    }
    Ok(())
}
