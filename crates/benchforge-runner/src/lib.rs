//! BenchForge benchmark runner.
//!
//! This crate turns experiment definitions into results tables:
//! - [`ProcessExecutor`] runs one OS process with a timeout
//! - [`PipelineRunner`] runs a variant's steps in order and stops at the first failure
//! - [`parser`] extracts timing samples from each toolchain's output
//! - [`summarizer`] reduces samples to one comparable statistic
//! - [`Orchestrator`] drives every (sequence, variant) pair of an experiment
//! - [`ExecutionMode`] optionally spreads independent experiments over a thread pool
//! - [`missing_programs`] checks that bare program names resolve on `PATH`
//!
//! Logging levels:
//! - **INFO**: Experiment start/end with recorded and failed cell counts
//! - **DEBUG**: Pipeline steps and cell state transitions
//! - **TRACE**: Captured output sizes
//! - **WARN**: Failed cells
//!
//! # Example
//!
//! ```no_run
//! use benchforge_core::{Experiment, ParserKind, PipelineStep, Sequence, VariantSpec};
//! use benchforge_runner::{Orchestrator, ProcessExecutor};
//!
//! let experiment = Experiment::new("Counting")
//!     .with_variant(VariantSpec::new("lf-cpp-1", ParserKind::LfCpp))
//!     .with_sequence(Sequence::new("1").with_pipeline(
//!         "lf-cpp-1",
//!         vec![
//!             PipelineStep::new("lfc").arg("Savina/count/CountingBenchmark.lf"),
//!             PipelineStep::new("bin/CountingBenchmark").args(["--fast", "--numIterations", "4"]),
//!         ],
//!     ));
//!
//! let orchestrator = Orchestrator::new(ProcessExecutor::new());
//! let table = orchestrator.run_experiment(&experiment)?;
//! println!("{} cells failed", table.failed_count());
//! # Ok::<(), benchforge_core::DefinitionError>(())
//! ```

mod executor;
pub mod orchestrator;
pub mod parser;
mod pipeline;
mod pool;
mod preflight;
pub mod summarizer;

pub use executor::ProcessExecutor;
pub use orchestrator::Orchestrator;
pub use parser::{ParserStrategy, SampleParser};
pub use pipeline::PipelineRunner;
pub use pool::{ExecutionMode, RunnerError};
pub use preflight::{missing_programs, missing_programs_in, MissingProgram};
pub use summarizer::{Summarizer, SummarizerStrategy};
