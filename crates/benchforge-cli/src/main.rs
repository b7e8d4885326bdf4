//! `benchforge` command-line driver.
//!
//! Exit codes:
//! - `0`: every selected experiment ran; failed cells are reported, not fatal
//! - `1`: artifacts could not be written
//! - `2`: the configuration was invalid and nothing ran

mod cli;
mod commands;
mod error;
mod logging;

use std::io;
use std::process::ExitCode;

use benchforge_runner::ProcessExecutor;
use clap::Parser;

use cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut stdout = io::stdout().lock();
    let outcome = match &cli.command {
        Command::Run(args) => commands::run(args, ProcessExecutor::new(), &mut stdout).map(|_| ()),
        Command::Check(args) => commands::check(args, &mut stdout),
        Command::List(args) => commands::list(args, &mut stdout),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("benchforge: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
