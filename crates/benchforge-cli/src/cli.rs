//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "benchforge",
    version,
    about = "Run benchmark experiments and plot their results",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Raise log verbosity (-v debug, -vv trace). Overrides RUST_LOG.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run experiments and write their reports
    Run(RunArgs),
    /// Validate a configuration and print the experiment plan
    Check(CheckArgs),
    /// List experiments and their variants
    List(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Configuration document (.toml, .yaml or .yml)
    #[arg(value_name = "CONFIG", default_value = "benchforge.toml")]
    pub config: PathBuf,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Fail if a program named without a path is missing from PATH
    #[arg(long)]
    pub preflight: bool,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Run only this experiment; repeat to select several
    #[arg(short, long = "experiment", value_name = "NAME")]
    pub experiments: Vec<String>,

    /// Write artifacts here instead of the configured directory
    #[arg(long, value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// Run up to N experiments at once
    #[arg(short, long, value_name = "N", default_value_t = 1)]
    pub jobs: usize,

    /// Skip the configured plotting command
    #[arg(long)]
    pub no_plot: bool,

    /// Refuse to start if a program named without a path is missing from PATH
    #[arg(long)]
    pub preflight: bool,
}
