//! Results table.
//!
//! Every (sequence, variant) pair of an experiment ends up in the table as a
//! [`Cell::Value`] or an explicit [`Cell::Failed`] marker. A failed cell is
//! never defaulted to zero: that would corrupt comparison charts.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::{ParseError, PipelineFailed, StepFailure, SummaryError};
use crate::sample::SummaryValue;

/// Raw output kept for diagnostics is truncated to this many bytes.
pub const MAX_RAW_OUTPUT: usize = 4096;

/// Lifecycle of one (experiment, sequence, variant) triple.
///
/// `Pending → Running → Parsed → Summarized → Recorded`, or `Failed` from
/// any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantPhase {
    Pending,
    Running,
    Parsed,
    Summarized,
    Recorded,
    Failed,
}

impl fmt::Display for VariantPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariantPhase::Pending => "pending",
            VariantPhase::Running => "running",
            VariantPhase::Parsed => "parsed",
            VariantPhase::Summarized => "summarized",
            VariantPhase::Recorded => "recorded",
            VariantPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Failure category of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Executable not found or failed to spawn.
    Launch,
    /// A step exceeded its time budget.
    Timeout,
    /// A step exited non-zero.
    PipelineFailed,
    /// Output did not match the parser's convention.
    Parse,
    /// Not enough samples after warm-up.
    Summary,
    /// The cell was never executed.
    NotRun,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Launch => "launch",
            FailureKind::Timeout => "timeout",
            FailureKind::PipelineFailed => "pipeline_failed",
            FailureKind::Parse => "parse",
            FailureKind::Summary => "summary",
            FailureKind::NotRun => "not_run",
        };
        f.write_str(name)
    }
}

/// Diagnostic record of a failed cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellFailure {
    /// Last phase reached before the failure.
    pub phase: VariantPhase,
    pub kind: FailureKind,
    pub message: String,
    /// 1-based index of the failing pipeline step, if a step failed.
    pub step_index: Option<usize>,
    pub exit_code: Option<i32>,
    /// Captured output, truncated to [`MAX_RAW_OUTPUT`] bytes.
    pub raw_output: Option<String>,
}

impl CellFailure {
    /// Converts a pipeline failure.
    pub fn from_pipeline(failure: &PipelineFailed) -> Self {
        let kind = match failure.cause {
            StepFailure::NonZeroExit { .. } | StepFailure::EmptyPipeline => {
                FailureKind::PipelineFailed
            }
            StepFailure::Launch { .. } => FailureKind::Launch,
            StepFailure::Timeout { .. } => FailureKind::Timeout,
        };
        let output = combined_output(&failure.stdout, &failure.stderr);
        Self {
            phase: VariantPhase::Running,
            kind,
            message: failure.to_string(),
            step_index: Some(failure.step_index),
            exit_code: failure.exit_code(),
            raw_output: non_empty(truncate_output(&output)),
        }
    }

    /// Converts a parse failure, keeping the output that failed to parse
    /// followed by whatever the run wrote to stderr.
    pub fn from_parse(error: &ParseError, stdout: &str, stderr: &str) -> Self {
        Self {
            phase: VariantPhase::Running,
            kind: FailureKind::Parse,
            message: error.to_string(),
            step_index: None,
            exit_code: None,
            raw_output: non_empty(truncate_output(&combined_output(stdout, stderr))),
        }
    }

    /// Converts a summary failure.
    pub fn from_summary(error: &SummaryError) -> Self {
        Self {
            phase: VariantPhase::Parsed,
            kind: FailureKind::Summary,
            message: error.to_string(),
            step_index: None,
            exit_code: None,
            raw_output: None,
        }
    }

    /// Marks a cell that was never executed.
    pub fn not_run(message: impl Into<String>) -> Self {
        Self {
            phase: VariantPhase::Pending,
            kind: FailureKind::NotRun,
            message: message.into(),
            step_index: None,
            exit_code: None,
            raw_output: None,
        }
    }
}

/// Stdout followed by stderr, separated by a line break.
fn combined_output(stdout: &str, stderr: &str) -> String {
    let mut output = stdout.to_string();
    if !stderr.is_empty() {
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(stderr);
    }
    output
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Keeps the tail of `output`, where failures usually report themselves.
fn truncate_output(output: &str) -> String {
    if output.len() <= MAX_RAW_OUTPUT {
        return output.to_string();
    }
    let mut start = output.len() - MAX_RAW_OUTPUT;
    while !output.is_char_boundary(start) {
        start += 1;
    }
    output[start..].to_string()
}

/// Outcome of one (sequence, variant) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Cell {
    Value(SummaryValue),
    Failed(CellFailure),
}

impl Cell {
    /// Returns the summary, if the cell succeeded.
    pub fn value(&self) -> Option<&SummaryValue> {
        match self {
            Cell::Value(value) => Some(value),
            Cell::Failed(_) => None,
        }
    }

    /// Returns the failure record, if the cell failed.
    pub fn failure(&self) -> Option<&CellFailure> {
        match self {
            Cell::Value(_) => None,
            Cell::Failed(failure) => Some(failure),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Cell::Failed(_))
    }
}

/// Summary values of one experiment keyed by (sequence, variant).
///
/// Built incrementally by the orchestrator and read-only afterwards.
///
/// # Example
///
/// ```
/// use benchforge_core::{Cell, CellFailure, ResultsTable, SummaryValue};
///
/// let mut table = ResultsTable::new("Counting", ["1"], ["lf-cpp-1", "lf-cpp-4"]);
/// table.record("1", "lf-cpp-1", Cell::Value(SummaryValue::new(100.0, 3)));
/// table.record("1", "lf-cpp-4", Cell::Failed(CellFailure::not_run("skipped")));
///
/// assert_eq!(table.value("1", "lf-cpp-1").map(|v| v.value), Some(100.0));
/// assert!(table.value("1", "lf-cpp-4").is_none());
/// assert_eq!(table.failed_count(), 1);
/// assert!(table.is_complete());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsTable {
    experiment: String,
    sequences: Vec<String>,
    variants: Vec<String>,
    cells: BTreeMap<(String, String), Cell>,
}

impl ResultsTable {
    /// Creates an empty table for the declared sequences and variants.
    pub fn new<S, V>(
        experiment: impl Into<String>,
        sequences: impl IntoIterator<Item = S>,
        variants: impl IntoIterator<Item = V>,
    ) -> Self
    where
        S: Into<String>,
        V: Into<String>,
    {
        Self {
            experiment: experiment.into(),
            sequences: sequences.into_iter().map(Into::into).collect(),
            variants: variants.into_iter().map(Into::into).collect(),
            cells: BTreeMap::new(),
        }
    }

    /// Records the outcome of one cell, returning any previous outcome.
    pub fn record(
        &mut self,
        sequence: impl Into<String>,
        variant: impl Into<String>,
        cell: Cell,
    ) -> Option<Cell> {
        let sequence = sequence.into();
        let variant = variant.into();
        if !self.sequences.contains(&sequence) {
            self.sequences.push(sequence.clone());
        }
        if !self.variants.contains(&variant) {
            self.variants.push(variant.clone());
        }
        self.cells.insert((sequence, variant), cell)
    }

    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Returns sequence ids in declaration order.
    pub fn sequences(&self) -> &[String] {
        &self.sequences
    }

    /// Returns variant names in declaration order.
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Returns the recorded cell, if any.
    pub fn get(&self, sequence: &str, variant: &str) -> Option<&Cell> {
        self.cells.get(&(sequence.to_string(), variant.to_string()))
    }

    /// Returns the summary of a successful cell.
    pub fn value(&self, sequence: &str, variant: &str) -> Option<&SummaryValue> {
        self.get(sequence, variant).and_then(Cell::value)
    }

    /// Iterates all declared cells in (sequence, variant) declaration order.
    ///
    /// Unrecorded cells are yielded as `None`.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str, Option<&Cell>)> + '_ {
        self.sequences.iter().flat_map(move |sequence| {
            self.variants.iter().map(move |variant| {
                (
                    sequence.as_str(),
                    variant.as_str(),
                    self.get(sequence, variant),
                )
            })
        })
    }

    /// Iterates failed cells.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str, &CellFailure)> + '_ {
        self.cells.iter().filter_map(|((sequence, variant), cell)| {
            cell.failure()
                .map(|failure| (sequence.as_str(), variant.as_str(), failure))
        })
    }

    /// Returns the number of recorded cells.
    pub fn recorded_count(&self) -> usize {
        self.cells.len()
    }

    /// Returns the number of failed cells.
    pub fn failed_count(&self) -> usize {
        self.cells.values().filter(|cell| cell.is_failed()).count()
    }

    /// Returns true if every declared cell has been recorded.
    pub fn is_complete(&self) -> bool {
        self.cells.len() == self.sequences.len() * self.variants.len()
    }
}
