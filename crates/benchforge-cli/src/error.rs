//! Fatal errors and their exit codes.

use std::io;

use benchforge_config::ConfigError;
use benchforge_report::ReportError;
use benchforge_runner::{MissingProgram, RunnerError};
use thiserror::Error;

/// Exit code for a configuration that prevented any experiment from running.
pub const EXIT_CONFIG: u8 = 2;

/// Exit code for a failure while writing artifacts.
pub const EXIT_IO: u8 = 1;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("{} program(s) not found on PATH: {}", .0.len(), program_list(.0))]
    MissingPrograms(Vec<MissingProgram>),

    #[error("cannot write report: {0}")]
    Report(#[from] ReportError),

    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Config(_)
            | CliError::Runner(RunnerError::Definition(_))
            | CliError::Report(ReportError::Definition(_))
            | CliError::MissingPrograms(_) => EXIT_CONFIG,
            CliError::Runner(RunnerError::ThreadPool(_))
            | CliError::Report(ReportError::Io { .. } | ReportError::Json { .. })
            | CliError::Output(_) => EXIT_IO,
        }
    }
}

fn program_list(missing: &[MissingProgram]) -> String {
    let mut programs: Vec<&str> = missing.iter().map(|m| m.program.as_str()).collect();
    programs.sort_unstable();
    programs.dedup();
    programs.join(", ")
}
