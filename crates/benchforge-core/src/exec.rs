//! Command execution seam.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::error::ExecError;
use crate::step::PipelineStep;

/// Raw captured output of one pipeline step execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunResult {
    /// Program that was executed.
    pub program: String,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
    /// Exit code, or `None` if the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Wall-clock time from spawn to exit.
    pub elapsed: Duration,
}

impl RunResult {
    /// Creates a result for a process that exited with `exit_code`.
    ///
    /// # Example
    ///
    /// ```
    /// use benchforge_core::RunResult;
    ///
    /// let result = RunResult::exited("true", 0);
    /// assert!(result.success());
    /// assert!(!RunResult::exited("false", 1).success());
    /// ```
    pub fn exited(program: impl Into<String>, exit_code: i32) -> Self {
        Self {
            program: program.into(),
            exit_code: Some(exit_code),
            ..Self::default()
        }
    }

    /// Sets the captured standard output.
    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    /// Sets the captured standard error.
    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    /// Sets the elapsed wall-clock time.
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Returns true if the process exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs one external process to completion.
///
/// Implementations must pass `step.args` as literal tokens (no shell
/// interpretation), enforce `timeout` by forcibly terminating the process,
/// and reap the process on every exit path.
///
/// The orchestrator blocks on this call. Implementations are `Sync` so that
/// independent experiments can share one executor across a worker pool.
pub trait CommandExecutor: Send + Sync {
    /// Executes `step` in `working_dir` (or the current directory).
    fn execute(
        &self,
        step: &PipelineStep,
        working_dir: Option<&Path>,
        timeout: Duration,
    ) -> Result<RunResult, ExecError>;
}

impl<E: CommandExecutor + ?Sized> CommandExecutor for &E {
    fn execute(
        &self,
        step: &PipelineStep,
        working_dir: Option<&Path>,
        timeout: Duration,
    ) -> Result<RunResult, ExecError> {
        (**self).execute(step, working_dir, timeout)
    }
}
