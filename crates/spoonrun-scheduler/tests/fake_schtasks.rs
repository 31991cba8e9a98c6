//! End-to-end workflow against a scripted stand-in for `schtasks`.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use spoonrun_core::TokioProcessLauncher;
use spoonrun_core::commands::ModelCommand;
use spoonrun_scheduler::{
    ArtifactExpectation, PollPolicy, ProfilingJob, ScheduledTaskController, SchedulerError,
    SchtasksScheduler,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Reports "Running" for the first `running_polls` queries, then "Ready".
/// `/run` drops a `trace.xlayer` into `out/`.
const SCRIPT: &str = r#"#!/bin/sh
state="__DIR__/state"
echo "$1" >> "__DIR__/calls"
case "$1" in
  /create)
    echo 0 > "$state"
    echo "$5" > "__DIR__/command"
    echo "SUCCESS: The scheduled task \"$3\" has successfully been created." ;;
  /run)
    [ -f "$state" ] || exit 1
    mkdir -p "__DIR__/out" && echo model > "__DIR__/out/trace.xlayer"
    echo "SUCCESS: Attempted to run the scheduled task \"$3\"." ;;
  /query)
    [ -f "$state" ] || { echo "ERROR: The system cannot find the file specified." 1>&2; exit 1; }
    n=$(cat "$state"); n=$((n+1)); echo $n > "$state"
    if [ $n -le __RUNNING__ ]; then status=Running; else status=Ready; fi
    echo "\"\\$3\",\"N/A\",\"$status\"" ;;
  /delete)
    rm -f "$state"
    echo "SUCCESS: The scheduled task \"$3\" was successfully deleted." ;;
esac
"#;

fn fake_schtasks(dir: &TempDir, running_polls: u32) -> PathBuf {
    let path = dir.path().join("schtasks");
    let script = SCRIPT
        .replace("__DIR__", &dir.path().display().to_string())
        .replace("__RUNNING__", &running_polls.to_string());
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn calls(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("calls"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

fn controller(program: &Path, max_attempts: u32) -> ScheduledTaskController {
    let scheduler = SchtasksScheduler::new(Arc::new(TokioProcessLauncher::new()))
        .with_program(program.display().to_string());
    ScheduledTaskController::new(
        Arc::new(scheduler),
        PollPolicy::new(Duration::from_millis(10), max_attempts).unwrap(),
    )
}

#[tokio::test]
async fn test_profiling_job_against_fake_scheduler() {
    let dir = TempDir::new().unwrap();
    let program = fake_schtasks(&dir, 2);
    let job = ProfilingJob::new(
        "demo app",
        "spoon model ns/app --screencast",
        ArtifactExpectation::new(dir.path().join("out"), "xlayer"),
    )
    .unwrap();

    let outcome = job
        .run(&controller(&program, 5), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.task.as_str(), "spoonrun-profile-demo_app");
    assert_eq!(outcome.final_status.as_deref(), Some("Ready"));
    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.artifacts, vec![dir.path().join("out").join("trace.xlayer")]);
    assert_eq!(
        calls(dir.path()),
        vec!["/query", "/create", "/run", "/query", "/query", "/query", "/delete"]
    );
    assert!(!dir.path().join("state").exists());
}

#[tokio::test]
async fn test_timeout_against_fake_scheduler_still_deletes() {
    let dir = TempDir::new().unwrap();
    let program = fake_schtasks(&dir, 10);
    let job = ProfilingJob::new(
        "slow",
        "spoon model ns/slow",
        ArtifactExpectation::new(dir.path().join("out"), "xlayer"),
    )
    .unwrap();

    let err = job
        .run(&controller(&program, 2), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SchedulerError::Timeout { attempts: 2, .. }));
    assert_eq!(calls(dir.path()).last().map(String::as_str), Some("/delete"));
    assert!(!dir.path().join("state").exists());
}

#[tokio::test]
async fn test_model_job_registers_rendered_command() {
    let dir = TempDir::new().unwrap();
    let program = fake_schtasks(&dir, 0);
    let model = ModelCommand::builder("spoon")
        .image("ns/app:1")
        .unwrap()
        .screencast(true)
        .build()
        .unwrap();
    let job = ProfilingJob::for_model(
        "app",
        &model,
        ArtifactExpectation::new(dir.path().join("out"), "xlayer"),
    )
    .unwrap();

    let outcome = job
        .run(&controller(&program, 3), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.attempts, 1);
    let command = fs::read_to_string(dir.path().join("command")).unwrap();
    assert_eq!(command.trim_end(), "spoon model ns/app:1 --screencast");
}
