//! Core types and traits for BenchForge.
//!
//! This crate defines the data model shared by every other BenchForge crate:
//! - [`Experiment`], [`Sequence`], and [`PipelineStep`] describe what to run
//! - [`RunResult`], [`SampleSet`], and [`SummaryValue`] carry measurements
//! - [`ResultsTable`] collects one summary (or failure) per cell
//! - [`CommandExecutor`] is the seam between the orchestrator and the OS
//!
//! Strategy identifiers ([`ParserKind`], [`SummarizerKind`], [`PlotterKind`])
//! are closed enums. Names are resolved once, when the configuration loads.

pub mod error;
pub mod exec;
pub mod experiment;
pub mod sample;
pub mod step;
pub mod strategy;
pub mod table;

pub use error::{
    BenchForgeError, DefinitionError, ExecError, ParseError, PipelineFailed, Result, StepFailure,
    SummaryError,
};
pub use exec::{CommandExecutor, RunResult};
pub use experiment::{Experiment, GlobalPlot, PlotDisplay, Sequence, VariantSpec};
pub use sample::{SampleSet, Spread, SummaryValue};
pub use step::PipelineStep;
pub use strategy::{ParserKind, PlotterKind, SummarizerKind, UnknownStrategy};
pub use table::{Cell, CellFailure, FailureKind, ResultsTable, VariantPhase};
