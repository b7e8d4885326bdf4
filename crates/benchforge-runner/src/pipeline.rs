//! Sequential pipeline execution.

use std::path::Path;
use std::time::Duration;

use benchforge_core::{CommandExecutor, ExecError, PipelineFailed, PipelineStep, RunResult, StepFailure};
use tracing::debug;

/// Runs a variant's pipeline steps strictly in order.
///
/// The first step that exits non-zero, fails to launch, or times out stops
/// the pipeline; later steps are never attempted. On success the result of
/// the *last* step is returned, since that is the step whose output carries
/// timing data.
pub struct PipelineRunner<'a, E: CommandExecutor + ?Sized> {
    executor: &'a E,
    timeout: Duration,
}

impl<'a, E: CommandExecutor + ?Sized> PipelineRunner<'a, E> {
    /// Creates a runner that gives every step `timeout` of wall-clock time.
    pub fn new(executor: &'a E, timeout: Duration) -> Self {
        Self { executor, timeout }
    }

    /// Runs all steps once.
    pub fn run(
        &self,
        steps: &[PipelineStep],
        working_dir: Option<&Path>,
    ) -> Result<RunResult, PipelineFailed> {
        let Some((last, prefix)) = steps.split_last() else {
            return Err(empty_pipeline());
        };
        self.run_prefix(prefix, working_dir)?;
        self.run_step(steps.len(), last, working_dir)
    }

    /// Runs the leading steps once and the final step `repeats` times.
    ///
    /// Used for programs that measure a single iteration per invocation.
    /// The returned result concatenates the output of every repeat and sums
    /// their elapsed time.
    pub fn run_repeated(
        &self,
        steps: &[PipelineStep],
        repeats: usize,
        working_dir: Option<&Path>,
    ) -> Result<RunResult, PipelineFailed> {
        let Some((last, prefix)) = steps.split_last() else {
            return Err(empty_pipeline());
        };
        self.run_prefix(prefix, working_dir)?;

        let mut combined = RunResult {
            program: last.program.clone(),
            ..RunResult::default()
        };
        for repeat in 0..repeats.max(1) {
            debug!(event = "step_repeat", repeat = repeat + 1, repeats = repeats);
            let run = self.run_step(steps.len(), last, working_dir)?;
            append_line_block(&mut combined.stdout, &run.stdout);
            append_line_block(&mut combined.stderr, &run.stderr);
            combined.elapsed += run.elapsed;
            combined.exit_code = run.exit_code;
        }
        Ok(combined)
    }

    fn run_prefix(
        &self,
        prefix: &[PipelineStep],
        working_dir: Option<&Path>,
    ) -> Result<(), PipelineFailed> {
        for (index, step) in prefix.iter().enumerate() {
            self.run_step(index + 1, step, working_dir)?;
        }
        Ok(())
    }

    fn run_step(
        &self,
        step_index: usize,
        step: &PipelineStep,
        working_dir: Option<&Path>,
    ) -> Result<RunResult, PipelineFailed> {
        debug!(event = "step_start", step = step_index, command = %step);

        let failed = |cause: StepFailure, stdout: String, stderr: String| PipelineFailed {
            step_index,
            program: step.program.clone(),
            cause,
            stdout,
            stderr,
        };

        match self.executor.execute(step, working_dir, self.timeout) {
            Ok(run) if run.success() => {
                debug!(
                    event = "step_end",
                    step = step_index,
                    elapsed_ms = run.elapsed.as_millis() as u64,
                );
                Ok(run)
            }
            Ok(run) => Err(failed(
                StepFailure::NonZeroExit {
                    code: run.exit_code,
                },
                run.stdout,
                run.stderr,
            )),
            Err(ExecError::Timeout {
                timeout, partial, ..
            }) => {
                let partial = *partial;
                Err(failed(
                    StepFailure::Timeout { timeout },
                    partial.stdout,
                    partial.stderr,
                ))
            }
            Err(err) => Err(failed(
                StepFailure::Launch {
                    message: err.to_string(),
                },
                String::new(),
                String::new(),
            )),
        }
    }
}

fn empty_pipeline() -> PipelineFailed {
    PipelineFailed {
        step_index: 0,
        program: String::new(),
        cause: StepFailure::EmptyPipeline,
        stdout: String::new(),
        stderr: String::new(),
    }
}

fn append_line_block(target: &mut String, block: &str) {
    if !target.is_empty() && !target.ends_with('\n') {
        target.push('\n');
    }
    target.push_str(block);
}
