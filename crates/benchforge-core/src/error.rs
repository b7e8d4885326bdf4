//! Error types for BenchForge

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::exec::RunResult;

/// Main error type for BenchForge operations.
///
/// Everything except [`BenchForgeError::Definition`] is a variant-level
/// failure: the orchestrator records it in the results table and moves on.
#[derive(Debug, Error)]
pub enum BenchForgeError {
    /// Invalid experiment definition (fatal, raised before execution)
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// Process could not be launched or exceeded its budget
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// A pipeline step failed and later steps were skipped
    #[error(transparent)]
    Pipeline(#[from] PipelineFailed),

    /// Program output did not follow the expected convention
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Not enough samples survived warm-up discard
    #[error("summary error: {0}")]
    Summary(#[from] SummaryError),
}

/// Result type alias for BenchForge operations
pub type Result<T> = std::result::Result<T, BenchForgeError>;

/// Failure of the command executor itself.
///
/// A non-zero exit code is *not* an `ExecError`; it is reported in
/// [`RunResult::exit_code`] and interpreted by the caller.
#[derive(Debug, Error)]
pub enum ExecError {
    /// Executable not found or failed to spawn.
    #[error("failed to launch `{program}`: {source}")]
    Launch { program: String, source: io::Error },

    /// Process exceeded its wall-clock budget and was killed.
    #[error("`{program}` exceeded its {timeout:?} budget and was killed")]
    Timeout {
        program: String,
        timeout: Duration,
        /// Output buffered before the process was killed.
        partial: Box<RunResult>,
    },

    /// Waiting on a spawned process failed.
    #[error("failed waiting on `{program}`: {source}")]
    Wait { program: String, source: io::Error },
}

impl ExecError {
    /// Returns the program this error refers to.
    pub fn program(&self) -> &str {
        match self {
            ExecError::Launch { program, .. }
            | ExecError::Timeout { program, .. }
            | ExecError::Wait { program, .. } => program,
        }
    }
}

/// Why a single pipeline step failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepFailure {
    #[error("exited with {}", exit_label(.code))]
    NonZeroExit { code: Option<i32> },

    #[error("launch failed: {message}")]
    Launch { message: String },

    #[error("timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("pipeline has no steps")]
    EmptyPipeline,
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// A pipeline stopped at a failing step.
///
/// `step_index` is 1-based: a failure in the second step reports `2`.
#[derive(Debug, Clone, Error)]
#[error("step {step_index} (`{program}`) {cause}")]
pub struct PipelineFailed {
    /// 1-based index of the failing step (0 for an empty pipeline).
    pub step_index: usize,
    /// Program of the failing step.
    pub program: String,
    /// Failure cause.
    pub cause: StepFailure,
    /// Captured stdout of the failing step, if any.
    pub stdout: String,
    /// Captured stderr of the failing step, if any.
    pub stderr: String,
}

impl PipelineFailed {
    /// Returns the exit code of the failing step, if it exited.
    pub fn exit_code(&self) -> Option<i32> {
        match self.cause {
            StepFailure::NonZeroExit { code } => code,
            _ => None,
        }
    }
}

/// Sample extraction failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected {expected} samples, found only {found}")]
    IncompleteSamples { expected: usize, found: usize },

    #[error("expected {expected} samples, found {found}")]
    ExcessSamples { expected: usize, found: usize },

    #[error("malformed sample on line {line}: `{text}`")]
    MalformedSample { line: usize, text: String },

    #[error("report declares {declared} executions but lists {found}")]
    CountMismatch { declared: usize, found: usize },

    #[error("report is missing its execution count")]
    MissingCount,
}

/// Sample reduction failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SummaryError {
    #[error("{available} samples leave nothing after discarding {warmup} warm-up iterations")]
    InsufficientSamples { available: usize, warmup: usize },

    #[error("sample {index} is not a finite number")]
    NonFiniteSample { index: usize },
}

/// Invalid experiment definition.
///
/// These errors are fatal: they abort the run before any process starts,
/// since a partial report would be misleading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("experiment id `{experiment}` {reason}")]
    InvalidId {
        experiment: String,
        reason: &'static str,
    },

    #[error("experiment `{experiment}` declares no sequences")]
    NoSequences { experiment: String },

    #[error("experiment `{experiment}` declares sequence `{sequence}` twice")]
    DuplicateSequence { experiment: String, sequence: String },

    #[error("sequence `{sequence}` of experiment `{experiment}` has no variants")]
    EmptySequence { experiment: String, sequence: String },

    #[error("variant `{variant}` in sequence `{sequence}` of experiment `{experiment}` has an empty pipeline")]
    EmptyPipeline {
        experiment: String,
        sequence: String,
        variant: String,
    },

    #[error("step {step} of variant `{variant}` in sequence `{sequence}` of experiment `{experiment}` has no program")]
    EmptyProgram {
        experiment: String,
        sequence: String,
        variant: String,
        step: usize,
    },

    #[error("sequence `{sequence}` of experiment `{experiment}` has variants {found:?}, expected {expected:?}")]
    AsymmetricVariants {
        experiment: String,
        sequence: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("experiment `{experiment}` runs variant `{variant}` without a variant definition")]
    UnknownVariant { experiment: String, variant: String },

    #[error("experiment `{experiment}` defines variant `{variant}` but no sequence runs it")]
    UnusedVariant { experiment: String, variant: String },

    #[error("experiment `{experiment}` defines variant `{variant}` twice")]
    DuplicateVariant { experiment: String, variant: String },

    #[error("variant `{variant}` of experiment `{experiment}` must run at least one iteration")]
    ZeroIterations { experiment: String, variant: String },

    #[error("variant `{variant}` of experiment `{experiment}` discards {warmup} warm-up iterations out of {iterations}")]
    WarmupTooLarge {
        experiment: String,
        variant: String,
        warmup: usize,
        iterations: usize,
    },

    #[error("experiment `{experiment}` uses unknown sequence `{sequence}` for the global plot")]
    UnknownGlobalSequence { experiment: String, sequence: String },

    #[error("experiment `{experiment}` lists `{variant}` twice in its arrangement")]
    DuplicateArrangement { experiment: String, variant: String },
}
