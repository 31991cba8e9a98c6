use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "spoonrun")]
#[command(version, about = "Spoonrun - drive the spoon container tool from scripts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (defaults to ~/.config/spoonrun/config.toml)
    #[arg(long, global = true, env = "SPOONRUN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Tool executable, overriding the config file
    #[arg(long, global = true)]
    pub tool: Option<String>,

    /// Working directory for tool invocations
    #[arg(long, global = true)]
    pub working_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Build an image from a script
    Build(BuildArgs),

    /// Run an image's self-check
    Check(CheckArgs),

    /// Show or change the tool's hub configuration
    Config(ConfigArgs),

    /// Import an external package as an image
    Import(ImportArgs),

    /// Pull an image from the hub
    Pull(PullArgs),

    /// Push an image to the hub
    Push(PushArgs),

    /// Push a captured model directory to the hub
    PushModel(PushModelArgs),

    /// Capture a runtime model of an image
    Model(ModelArgs),

    /// Show the installed tool version
    Version(VersionArgs),

    /// Run a command as a scheduled task and wait for its artifact
    Profile(ProfileArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Build script
    pub script: PathBuf,

    /// Name for the output image
    #[arg(long)]
    pub name: Option<String>,

    /// Runtime version (a.b.c.d)
    #[arg(long)]
    pub vm: Option<String>,

    /// Working directory inside the build
    #[arg(long = "build-dir")]
    pub build_dir: Option<PathBuf>,

    /// Mount a host folder (<source>=<target>), repeatable
    #[arg(long)]
    pub mount: Vec<String>,

    /// Replace an existing image with the same name
    #[arg(long)]
    pub overwrite: bool,

    /// Build without the base layer
    #[arg(long)]
    pub no_base: bool,

    /// Emit diagnostic output
    #[arg(long)]
    pub diagnostic: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    pub image: String,

    /// Runtime version (a.b.c.d)
    #[arg(long)]
    pub vm: Option<String>,

    #[arg(long)]
    pub diagnostic: bool,

    /// Exit codes treated as success (default: 0)
    #[arg(long = "accept-exit-code")]
    pub accept_exit_codes: Vec<i32>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Hub server URL to set
    #[arg(long)]
    pub hub: Option<String>,

    /// Reset the configuration to defaults
    #[arg(long, conflicts_with = "hub")]
    pub reset: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Package type (for example: msi, zip)
    pub kind: String,

    /// Package path
    pub path: PathBuf,

    /// Name for the imported image
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Args)]
pub struct PullArgs {
    pub image: String,

    #[arg(long = "accept-exit-code")]
    pub accept_exit_codes: Vec<i32>,
}

#[derive(Args)]
pub struct PushArgs {
    pub image: String,

    /// Remote image name
    pub remote: Option<String>,

    #[arg(long = "accept-exit-code")]
    pub accept_exit_codes: Vec<i32>,
}

#[derive(Args)]
pub struct PushModelArgs {
    /// Model directory produced by `model`
    pub model_dir: PathBuf,

    /// Remote image name
    pub remote: Option<String>,

    #[arg(long = "accept-exit-code")]
    pub accept_exit_codes: Vec<i32>,
}

#[derive(Args)]
pub struct ModelArgs {
    pub image: String,

    /// Include executables in the model
    #[arg(long)]
    pub include_exe: bool,

    /// Record a screencast of the session
    #[arg(long)]
    pub screencast: bool,

    #[arg(long = "accept-exit-code")]
    pub accept_exit_codes: Vec<i32>,
}

#[derive(Args)]
pub struct VersionArgs {
    /// Fail unless the installed tool is at least this version
    #[arg(long)]
    pub minimum: Option<String>,
}

#[derive(Args)]
pub struct ProfileArgs {
    /// Project key, used to name the scheduled task
    #[arg(long)]
    pub project: String,

    /// Command line the scheduled task runs
    #[arg(long, required_unless_present = "image", conflicts_with = "image")]
    pub command: Option<String>,

    /// Profile `model <image>` instead of a raw command line
    #[arg(long)]
    pub image: Option<String>,

    /// Pass --include-exe to the model run
    #[arg(long, requires = "image")]
    pub include_exe: bool,

    /// Pass --screencast to the model run
    #[arg(long, requires = "image")]
    pub screencast: bool,

    /// Directory the artifact is expected in
    #[arg(long)]
    pub artifact_dir: PathBuf,

    /// Artifact file extension
    #[arg(long)]
    pub extension: String,
}
