use colored::Colorize;

pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), err);
    for cause in err.chain().skip(1) {
        eprintln!("  {} {}", "caused by:".dimmed(), cause);
    }

    let msg = format!("{err:#}").to_lowercase();

    if msg.contains("failed to launch") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Point spoonrun at the tool executable with:");
        eprintln!("  {} spoonrun --tool <path> <command>", "$".dimmed());
        eprintln!("  or set [tool] executable in ~/.config/spoonrun/config.toml");
    }

    if msg.contains("status checks") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  The scheduled task did not finish in time. Raise the budget with");
        eprintln!("  [scheduler] max_attempts or poll_interval_secs in the config file.");
    }

    if msg.contains("appeared in") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  The task finished without producing its artifact.");
        eprintln!("  Check --artifact-dir and --extension, then rerun with --verbose.");
    }

    if msg.contains("image already exists") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Pass --overwrite to replace the existing image.");
    }

    std::process::exit(1);
}
