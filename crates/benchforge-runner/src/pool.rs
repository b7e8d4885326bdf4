//! Running independent experiments side by side.

use std::num::NonZeroUsize;

use benchforge_core::{CommandExecutor, DefinitionError, Experiment, ResultsTable};
use rayon::prelude::*;
use thiserror::Error;
use tracing::info;

use crate::orchestrator::Orchestrator;

/// How a batch of experiments is scheduled.
///
/// Variants of one experiment always run sequentially, since concurrent
/// benchmark processes would perturb each other's timings. Only whole
/// experiments are ever distributed across workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One experiment after another on the calling thread.
    #[default]
    Sequential,
    /// Up to `jobs` experiments at once on a dedicated thread pool.
    Parallel { jobs: NonZeroUsize },
}

impl ExecutionMode {
    /// Picks a mode from a job count; `0` and `1` mean sequential.
    pub fn from_jobs(jobs: usize) -> Self {
        match NonZeroUsize::new(jobs) {
            Some(jobs) if jobs.get() > 1 => ExecutionMode::Parallel { jobs },
            _ => ExecutionMode::Sequential,
        }
    }
}

/// Failure to run a batch of experiments.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// An experiment definition was invalid; nothing ran.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl<E: CommandExecutor> Orchestrator<E> {
    /// Runs a batch of experiments and returns their tables in input order.
    ///
    /// Every definition is validated before the first process starts, so an
    /// invalid experiment aborts the whole batch without side effects.
    pub fn run_experiments(
        &self,
        experiments: &[Experiment],
        mode: ExecutionMode,
    ) -> Result<Vec<ResultsTable>, RunnerError> {
        for experiment in experiments {
            experiment.validate()?;
        }

        info!(event = "batch_start", experiments = experiments.len(), mode = ?mode);
        let tables = match mode {
            ExecutionMode::Sequential => experiments
                .iter()
                .map(|experiment| self.run_experiment(experiment))
                .collect::<Result<Vec<_>, _>>()?,
            ExecutionMode::Parallel { jobs } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(jobs.get())
                    .thread_name(|index| format!("benchforge-worker-{index}"))
                    .build()?;
                pool.install(|| {
                    experiments
                        .par_iter()
                        .map(|experiment| self.run_experiment(experiment))
                        .collect::<Result<Vec<_>, _>>()
                })?
            }
        };

        let failed: usize = tables.iter().map(ResultsTable::failed_count).sum();
        info!(event = "batch_end", experiments = tables.len(), failed_cells = failed);
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use benchforge_core::{ParserKind, PipelineStep, Sequence, VariantSpec};
    use benchforge_test::{counting_experiment, lf_cpp_output, Reply, ScriptedExecutor};

    use super::*;

    fn experiment(id: &str) -> Experiment {
        Experiment::new(id)
            .with_variant(VariantSpec::new("lf-cpp-1", ParserKind::LfCpp))
            .with_sequence(
                Sequence::new("1")
                    .with_pipeline("lf-cpp-1", vec![PipelineStep::new("bin/Run").arg(id)]),
            )
    }

    fn executor() -> ScriptedExecutor {
        ScriptedExecutor::new()
            .on_program("bin/Run", Reply::stdout(lf_cpp_output(&[10.0, 20.0, 30.0, 40.0])))
            .on_command(&["bin/Run", "Broken"], Reply::exit(2))
    }

    #[test]
    fn test_from_jobs() {
        assert_eq!(ExecutionMode::from_jobs(0), ExecutionMode::Sequential);
        assert_eq!(ExecutionMode::from_jobs(1), ExecutionMode::Sequential);
        assert_eq!(
            ExecutionMode::from_jobs(4),
            ExecutionMode::Parallel {
                jobs: NonZeroUsize::new(4).unwrap()
            }
        );
    }

    #[test]
    fn test_parallel_preserves_input_order_and_isolation() {
        let experiments: Vec<Experiment> = ["A", "Broken", "C", "D"].into_iter().map(experiment).collect();
        let orchestrator = Orchestrator::new(executor());

        let tables = orchestrator
            .run_experiments(&experiments, ExecutionMode::from_jobs(3))
            .unwrap();

        let ids: Vec<&str> = tables.iter().map(ResultsTable::experiment).collect();
        assert_eq!(ids, vec!["A", "Broken", "C", "D"]);
        assert_eq!(tables[1].failed_count(), 1);
        for table in [&tables[0], &tables[2], &tables[3]] {
            assert_eq!(table.value("1", "lf-cpp-1").map(|v| v.value), Some(30.0));
        }
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let experiments: Vec<Experiment> = ["A", "Broken"].into_iter().map(experiment).collect();

        let sequential = Orchestrator::new(executor())
            .run_experiments(&experiments, ExecutionMode::Sequential)
            .unwrap();
        let parallel = Orchestrator::new(executor())
            .run_experiments(&experiments, ExecutionMode::from_jobs(2))
            .unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_invalid_experiment_aborts_batch_before_running() {
        let experiments = vec![counting_experiment(), Experiment::new("Empty")];
        let orchestrator = Orchestrator::new(ScriptedExecutor::new());

        let err = orchestrator
            .run_experiments(&experiments, ExecutionMode::Sequential)
            .unwrap_err();

        assert!(matches!(
            err,
            RunnerError::Definition(DefinitionError::NoSequences { .. })
        ));
        assert_eq!(orchestrator.executor().call_count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_parallel_mode_overlaps_experiments() {
        use crate::ProcessExecutor;

        let sleeper = |id: &str| {
            Experiment::new(id)
                .with_iterations(2)
                .with_warmup(1)
                .with_variant(VariantSpec::new("sh", ParserKind::LfC))
                .with_sequence(Sequence::new("1").with_pipeline(
                    "sh",
                    vec![PipelineStep::new("sh").arg("-c").arg(
                        "sleep 0.3; echo 'Iteration 1 - 1 ms'; echo 'Iteration 2 - 2 ms'",
                    )],
                ))
        };
        let experiments: Vec<Experiment> = ["A", "B", "C"].into_iter().map(sleeper).collect();
        let orchestrator = Orchestrator::new(ProcessExecutor::new());

        let start = Instant::now();
        let tables = orchestrator
            .run_experiments(&experiments, ExecutionMode::from_jobs(3))
            .unwrap();

        assert!(start.elapsed() < Duration::from_millis(850));
        assert!(tables.iter().all(|t| t.failed_count() == 0));
    }
}
