//! Report generation for BenchForge results.
//!
//! This crate turns finished results tables into artifacts:
//! - [`ReportBuilder`] projects a table onto a [`PlotDescription`], and rolls
//!   several tables up into the overview chart
//! - [`gnuplot`] renders data files and scripts for each description
//! - [`CsvExporter`] and [`MarkdownReport`] export the tables themselves
//! - [`ReportWriter`] writes everything into a results directory and
//!   optionally runs the plotting command
//!
//! Cells without a value are never dropped or zeroed. They stay in the
//! description as [`PlotValue::Absent`] with the failure message.
//!
//! # Example
//!
//! ```
//! use benchforge_core::{Cell, CellFailure, ResultsTable, SummaryValue};
//! use benchforge_report::ReportBuilder;
//! use benchforge_test::counting_experiment;
//!
//! let mut table = ResultsTable::new("Counting", ["1"], ["lf-cpp-1", "lf-cpp-4"]);
//! table.record("1", "lf-cpp-1", Cell::Value(SummaryValue::new(100.0, 3)));
//! table.record("1", "lf-cpp-4", Cell::Failed(CellFailure::not_run("build failed")));
//!
//! let plot = ReportBuilder::build(&counting_experiment(), &table);
//! println!("{}", plot.to_json()?);
//! # Ok::<(), serde_json::Error>(())
//! ```

mod builder;
mod error;
mod export;
pub mod gnuplot;
mod plot;
mod writer;

pub use builder::{ReportBuilder, GLOBAL_NAME};
pub use error::ReportError;
pub use export::{CsvExporter, MarkdownReport};
pub use plot::{PlotDescription, PlotEntry, PlotSeries, PlotValue};
pub use writer::{Artifacts, ReportWriter, PLOT_TIMEOUT};
