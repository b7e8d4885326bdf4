//! Tabular exports of results tables.

use std::fmt::{self, Write as _};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use benchforge_core::{Cell, ResultsTable};

/// CSV exporter for results tables.
///
/// One row per (sequence, variant) cell in declaration order. Failed and
/// unrecorded cells keep their row with an empty value.
///
/// # Example
///
/// ```
/// use benchforge_core::{Cell, ResultsTable, SummaryValue};
/// use benchforge_report::CsvExporter;
///
/// let mut table = ResultsTable::new("Counting", ["1"], ["lf-cpp-1"]);
/// table.record("1", "lf-cpp-1", Cell::Value(SummaryValue::new(100.0, 3)));
///
/// let csv = CsvExporter::to_string(&table);
/// assert!(csv.starts_with("experiment,sequence,variant,status"));
/// assert!(csv.contains("Counting,1,lf-cpp-1,ok,100,,,3,,"));
/// ```
pub struct CsvExporter;

impl CsvExporter {
    const HEADER: &'static str =
        "experiment,sequence,variant,status,value,low,high,samples_used,failure_kind,message";

    /// Exports a results table to a CSV string.
    pub fn to_string(table: &ResultsTable) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail.
        let _ = Self::render(table, &mut output);
        output
    }

    /// Exports a results table to a CSV file.
    pub fn to_file(table: &ResultsTable, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, Self::to_string(table))
    }

    /// Writes a results table as CSV to a writer.
    pub fn write<W: Write>(table: &ResultsTable, mut writer: W) -> io::Result<()> {
        writer.write_all(Self::to_string(table).as_bytes())
    }

    fn render(table: &ResultsTable, output: &mut String) -> fmt::Result {
        writeln!(output, "{}", Self::HEADER)?;
        for (sequence, variant, cell) in table.rows() {
            write!(
                output,
                "{},{},{},",
                csv_field(table.experiment()),
                csv_field(sequence),
                csv_field(variant)
            )?;
            match cell {
                Some(Cell::Value(summary)) => {
                    let (low, high) = match summary.spread {
                        Some(spread) => (spread.low.to_string(), spread.high.to_string()),
                        None => (String::new(), String::new()),
                    };
                    writeln!(
                        output,
                        "ok,{},{},{},{},,",
                        summary.value, low, high, summary.samples_used
                    )?;
                }
                Some(Cell::Failed(failure)) => {
                    writeln!(
                        output,
                        "failed,,,,,{},{}",
                        failure.kind,
                        csv_field(&failure.message)
                    )?;
                }
                None => writeln!(output, "missing,,,,,,")?,
            }
        }
        Ok(())
    }
}

/// Quotes a field when it contains a separator, quote, or line break.
fn csv_field(text: &str) -> String {
    if text.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// Markdown report generator.
///
/// Renders a results table as a sequence-by-variant grid followed by the
/// diagnostics of every failed cell.
///
/// # Example
///
/// ```
/// use benchforge_core::{Cell, CellFailure, ResultsTable, SummaryValue};
/// use benchforge_report::MarkdownReport;
///
/// let mut table = ResultsTable::new("Counting", ["1"], ["lf-cpp-1", "lf-cpp-4"]);
/// table.record("1", "lf-cpp-1", Cell::Value(SummaryValue::new(100.0, 3)));
/// table.record("1", "lf-cpp-4", Cell::Failed(CellFailure::not_run("build failed")));
///
/// let md = MarkdownReport::to_string(&table);
/// assert!(md.contains("# Experiment: Counting"));
/// assert!(md.contains("| 1 | 100.00 | failed |"));
/// assert!(md.contains("## Failures"));
/// ```
pub struct MarkdownReport;

impl MarkdownReport {
    /// Generates a Markdown report string.
    pub fn to_string(table: &ResultsTable) -> String {
        let mut output = String::new();
        let _ = Self::render(table, &mut output);
        output
    }

    /// Writes a Markdown report to a file.
    pub fn to_file(table: &ResultsTable, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, Self::to_string(table))
    }

    /// Writes a Markdown report to a writer.
    pub fn write<W: Write>(table: &ResultsTable, mut writer: W) -> io::Result<()> {
        writer.write_all(Self::to_string(table).as_bytes())
    }

    /// Generates an overview of several experiments.
    ///
    /// # Example
    ///
    /// ```
    /// use benchforge_core::ResultsTable;
    /// use benchforge_report::MarkdownReport;
    ///
    /// let counting = ResultsTable::new("Counting", ["1"], ["lf-cpp-1"]);
    /// let overview = MarkdownReport::comparison(&[&counting]);
    /// assert!(overview.contains("## Comparison"));
    /// assert!(overview.contains("| Counting | 1 | 1 | 0 | 1 |"));
    /// ```
    pub fn comparison(tables: &[&ResultsTable]) -> String {
        let mut output = String::new();
        let _ = Self::render_comparison(tables, &mut output);
        output
    }

    fn render(table: &ResultsTable, output: &mut String) -> fmt::Result {
        writeln!(output, "# Experiment: {}", table.experiment())?;
        writeln!(output)?;
        writeln!(output, "- **Sequences**: {}", table.sequences().len())?;
        writeln!(output, "- **Variants**: {}", table.variants().len())?;
        writeln!(
            output,
            "- **Recorded**: {} ({} failed)",
            table.recorded_count(),
            table.failed_count()
        )?;
        writeln!(output)?;

        writeln!(output, "## Results")?;
        writeln!(output)?;
        if table.variants().is_empty() {
            writeln!(output, "*No variants.*")?;
        } else {
            write!(output, "| Sequence |")?;
            for variant in table.variants() {
                write!(output, " {} |", variant)?;
            }
            writeln!(output)?;
            write!(output, "|----------|")?;
            for _ in table.variants() {
                write!(output, "------|")?;
            }
            writeln!(output)?;

            for sequence in table.sequences() {
                write!(output, "| {} |", sequence)?;
                for variant in table.variants() {
                    match table.get(sequence, variant) {
                        Some(Cell::Value(summary)) => write!(output, " {:.2} |", summary.value)?,
                        Some(Cell::Failed(_)) => write!(output, " failed |")?,
                        None => write!(output, " - |")?,
                    }
                }
                writeln!(output)?;
            }
        }

        let mut failures = table.failures().peekable();
        if failures.peek().is_some() {
            writeln!(output)?;
            writeln!(output, "## Failures")?;
            writeln!(output)?;
            for (sequence, variant, failure) in failures {
                writeln!(
                    output,
                    "- **{} / {}** ({}, after {}): {}",
                    sequence, variant, failure.kind, failure.phase, failure.message
                )?;
                if let Some(raw) = &failure.raw_output {
                    writeln!(output)?;
                    writeln!(output, "  ```")?;
                    for line in raw.lines() {
                        writeln!(output, "  {}", line)?;
                    }
                    writeln!(output, "  ```")?;
                }
            }
        }
        Ok(())
    }

    fn render_comparison(tables: &[&ResultsTable], output: &mut String) -> fmt::Result {
        writeln!(output, "## Comparison")?;
        writeln!(output)?;
        writeln!(output, "| Experiment | Sequences | Variants | Failed | Missing |")?;
        writeln!(output, "|------------|-----------|----------|--------|---------|")?;
        for table in tables {
            let declared = table.sequences().len() * table.variants().len();
            writeln!(
                output,
                "| {} | {} | {} | {} | {} |",
                table.experiment(),
                table.sequences().len(),
                table.variants().len(),
                table.failed_count(),
                declared.saturating_sub(table.recorded_count()),
            )?;
        }
        Ok(())
    }
}
