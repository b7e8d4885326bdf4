//! Experiment orchestration.

use std::time::Instant;

use benchforge_core::{
    Cell, CellFailure, CommandExecutor, DefinitionError, Experiment, PipelineStep, ResultsTable,
    Sequence, VariantPhase, VariantSpec,
};
use tracing::{debug, info, warn};

use crate::parser::{ParserStrategy, SampleParser};
use crate::pipeline::PipelineRunner;
use crate::summarizer::{Summarizer, SummarizerStrategy};

/// Drives every (sequence, variant) pair of an experiment through
/// `Pending → Running → Parsed → Summarized → Recorded`.
///
/// Cells run strictly one after another. A cell that fails in any phase is
/// recorded as [`Cell::Failed`] and the orchestrator moves on, so one broken
/// variant never hides the others.
///
/// # Type Parameters
///
/// * `E` - The command executor used for every pipeline step
///
/// # Example
///
/// ```
/// use benchforge_runner::Orchestrator;
/// use benchforge_test::{counting_experiment, lf_cpp_output, Reply, ScriptedExecutor};
///
/// let executor = ScriptedExecutor::new()
///     .on_program("bin/CountingBenchmark", Reply::stdout(lf_cpp_output(&[120.0, 100.0, 98.0, 101.0])));
/// let orchestrator = Orchestrator::new(executor);
///
/// let table = orchestrator.run_experiment(&counting_experiment()).unwrap();
/// assert_eq!(table.value("1", "lf-cpp-1").map(|v| v.value), Some(100.0));
/// assert!(table.is_complete());
/// ```
#[derive(Debug)]
pub struct Orchestrator<E: CommandExecutor> {
    executor: E,
}

impl<E: CommandExecutor> Orchestrator<E> {
    /// Creates an orchestrator running steps through `executor`.
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Returns the executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Validates `experiment`, then runs all of its cells.
    ///
    /// Only an invalid definition is an error; every execution failure ends
    /// up in the returned table.
    pub fn run_experiment(&self, experiment: &Experiment) -> Result<ResultsTable, DefinitionError> {
        experiment.validate()?;

        let variants: Vec<&str> = experiment
            .sequences()
            .first()
            .map(|sequence| sequence.variant_names().collect())
            .unwrap_or_default();
        let mut table = ResultsTable::new(
            experiment.id(),
            experiment.sequences().iter().map(Sequence::id),
            variants.iter().copied(),
        );

        info!(
            event = "experiment_start",
            experiment = experiment.id(),
            sequences = experiment.sequences().len(),
            variants = variants.len(),
        );
        let start = Instant::now();

        for sequence in experiment.sequences() {
            for (name, steps) in sequence.pipelines() {
                let cell = match experiment.variant(name) {
                    Some(variant) => self.run_cell(experiment, sequence.id(), variant, steps),
                    None => Cell::Failed(CellFailure::not_run(format!(
                        "variant `{name}` has no definition"
                    ))),
                };
                table.record(sequence.id(), name, cell);
            }
        }

        info!(
            event = "experiment_end",
            experiment = experiment.id(),
            recorded = table.recorded_count(),
            failed = table.failed_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
        );
        Ok(table)
    }

    /// Runs one (sequence, variant) cell to a value or a failure record.
    pub fn run_cell(
        &self,
        experiment: &Experiment,
        sequence: &str,
        variant: &VariantSpec,
        steps: &[PipelineStep],
    ) -> Cell {
        let cell = self.resolve_cell(experiment, sequence, variant, steps);
        match &cell {
            Cell::Value(summary) => transition(
                experiment,
                sequence,
                variant,
                VariantPhase::Recorded,
                Some(summary.value),
            ),
            Cell::Failed(failure) => warn!(
                event = "cell_failed",
                experiment = experiment.id(),
                sequence = sequence,
                variant = %variant.name,
                phase = %failure.phase,
                kind = ?failure.kind,
                message = %failure.message,
            ),
        }
        cell
    }

    fn resolve_cell(
        &self,
        experiment: &Experiment,
        sequence: &str,
        variant: &VariantSpec,
        steps: &[PipelineStep],
    ) -> Cell {
        let iterations = experiment.iterations_for(variant);
        let runner = PipelineRunner::new(&self.executor, experiment.timeout());

        transition(experiment, sequence, variant, VariantPhase::Running, None);
        let run = if experiment.repeat_run_step() {
            runner.run_repeated(steps, iterations, experiment.working_dir())
        } else {
            runner.run(steps, experiment.working_dir())
        };
        let run = match run {
            Ok(run) => run,
            Err(failed) => return Cell::Failed(CellFailure::from_pipeline(&failed)),
        };

        let parser = ParserStrategy::from(variant.parser);
        let samples = match parser.parse(&run.stdout, iterations) {
            Ok(samples) => samples,
            Err(err) => {
                return Cell::Failed(CellFailure::from_parse(&err, &run.stdout, &run.stderr))
            }
        };
        transition(experiment, sequence, variant, VariantPhase::Parsed, None);

        let summarizer = SummarizerStrategy::from(variant.summarizer);
        match summarizer.summarize(&samples, experiment.warmup()) {
            Ok(summary) => {
                transition(
                    experiment,
                    sequence,
                    variant,
                    VariantPhase::Summarized,
                    Some(summary.value),
                );
                Cell::Value(summary)
            }
            Err(err) => Cell::Failed(CellFailure::from_summary(&err)),
        }
    }
}

fn transition(
    experiment: &Experiment,
    sequence: &str,
    variant: &VariantSpec,
    phase: VariantPhase,
    value: Option<f64>,
) {
    debug!(
        event = "cell_phase",
        experiment = experiment.id(),
        sequence = sequence,
        variant = %variant.name,
        phase = %phase,
        value = ?value,
    );
}

#[cfg(test)]
mod tests;
