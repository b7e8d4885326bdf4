//! Artifact output.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use benchforge_core::experiment::SUMMARY_ARTIFACT;
use benchforge_core::{CommandExecutor, Experiment, GlobalPlot, PipelineStep, ResultsTable};
use tracing::{debug, info, warn};

use crate::builder::ReportBuilder;
use crate::error::ReportError;
use crate::export::{CsvExporter, MarkdownReport};
use crate::gnuplot;
use crate::plot::PlotDescription;

/// Time budget of one plotting command.
pub const PLOT_TIMEOUT: Duration = Duration::from_secs(300);

/// Paths written for one chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub name: String,
    /// Plot description (`.json`).
    pub description: PathBuf,
    /// Gnuplot data (`.dat`).
    pub data: PathBuf,
    /// Gnuplot script (`.gp`).
    pub script: PathBuf,
    /// Rendered chart the script produces (`.pdf`).
    pub chart: PathBuf,
    /// Results exports, for experiment charts only.
    pub csv: Option<PathBuf>,
    pub markdown: Option<PathBuf>,
}

/// Writes report artifacts into a results directory.
///
/// # Example
///
/// ```
/// use benchforge_core::{Cell, ResultsTable, SummaryValue};
/// use benchforge_report::ReportWriter;
/// use benchforge_test::counting_experiment;
///
/// let dir = tempfile::tempdir().unwrap();
/// let mut table = ResultsTable::new("Counting", ["1"], ["lf-cpp-1", "lf-cpp-4"]);
/// table.record("1", "lf-cpp-1", Cell::Value(SummaryValue::new(100.0, 3)));
///
/// let writer = ReportWriter::new(dir.path());
/// let artifacts = writer.write_experiment(&counting_experiment(), &table).unwrap();
///
/// assert!(artifacts.description.ends_with("Counting.json"));
/// assert!(artifacts.script.exists());
/// ```
#[derive(Debug, Clone)]
pub struct ReportWriter {
    results_dir: PathBuf,
    plot_command: Option<PipelineStep>,
}

impl ReportWriter {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            plot_command: None,
        }
    }

    /// Sets the plotting command, e.g. `gnuplot`. Each run appends the
    /// script's file name to its arguments.
    pub fn with_plot_command(mut self, command: PipelineStep) -> Self {
        self.plot_command = Some(command);
        self
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn plot_command(&self) -> Option<&PipelineStep> {
        self.plot_command.as_ref()
    }

    /// Writes the description, data, and script of one chart.
    pub fn write_plot(&self, plot: &PlotDescription) -> Result<Artifacts, ReportError> {
        self.ensure_dir()?;

        let description = self.path(&plot.name, "json");
        let data = self.path(&plot.name, "dat");
        let script = self.path(&plot.name, "gp");
        let chart = self.path(&plot.name, "pdf");

        let json = plot.to_json().map_err(|source| ReportError::Json {
            name: plot.name.clone(),
            source,
        })?;
        write_file(&description, json)?;
        write_file(&data, gnuplot::render_data(plot))?;
        write_file(
            &script,
            gnuplot::render_script(plot, &file_name(&data), &file_name(&chart)),
        )?;

        debug!(
            event = "artifact_written",
            chart = %plot.name,
            present = plot.present_count(),
            absent = plot.absent_count(),
        );
        Ok(Artifacts {
            name: plot.name.clone(),
            description,
            data,
            script,
            chart,
            csv: None,
            markdown: None,
        })
    }

    /// Builds and writes the chart and exports of one experiment.
    ///
    /// Fails without writing if the id cannot serve as a file stem or would
    /// collide with the overview artifacts.
    pub fn write_experiment(
        &self,
        experiment: &Experiment,
        table: &ResultsTable,
    ) -> Result<Artifacts, ReportError> {
        experiment.validate_id()?;
        let plot = ReportBuilder::build(experiment, table);
        let mut artifacts = self.write_plot(&plot)?;

        let csv = self.path(experiment.id(), "csv");
        CsvExporter::to_file(table, &csv).map_err(ReportError::io(&csv))?;
        let markdown = self.path(experiment.id(), "md");
        MarkdownReport::to_file(table, &markdown).map_err(ReportError::io(&markdown))?;

        artifacts.csv = Some(csv);
        artifacts.markdown = Some(markdown);
        Ok(artifacts)
    }

    /// Writes every experiment, the overview chart, and a comparison of all
    /// tables.
    ///
    /// The overview comes last in the returned list.
    pub fn write_all(
        &self,
        runs: &[(&Experiment, &ResultsTable)],
        global: &GlobalPlot,
    ) -> Result<Vec<Artifacts>, ReportError> {
        for (experiment, _) in runs {
            experiment.validate_id()?;
        }
        let mut written = Vec::with_capacity(runs.len() + 1);
        for (experiment, table) in runs {
            written.push(self.write_experiment(experiment, table)?);
        }

        let mut overview = self.write_plot(&ReportBuilder::build_global(runs, global))?;
        let tables: Vec<&ResultsTable> = runs.iter().map(|(_, table)| *table).collect();
        let summary = self.path(SUMMARY_ARTIFACT, "md");
        write_file(&summary, MarkdownReport::comparison(&tables))?;
        overview.markdown = Some(summary);
        written.push(overview);

        info!(
            event = "artifacts_written",
            charts = written.len(),
            results_dir = %self.results_dir.display(),
        );
        Ok(written)
    }

    /// Runs the plotting command on each script.
    ///
    /// Plotting is best effort: failures are logged and skipped. Returns how
    /// many charts rendered. Without a plotting command nothing runs.
    pub fn render<E: CommandExecutor>(&self, executor: &E, artifacts: &[Artifacts]) -> usize {
        let Some(command) = &self.plot_command else {
            return 0;
        };

        let mut rendered = 0;
        for artifact in artifacts {
            let step = command.clone().arg(file_name(&artifact.script));
            match executor.execute(&step, Some(&self.results_dir), PLOT_TIMEOUT) {
                Ok(result) if result.success() => {
                    debug!(event = "plot_rendered", chart = %artifact.name, command = %step);
                    rendered += 1;
                }
                Ok(result) => warn!(
                    event = "plot_failed",
                    chart = %artifact.name,
                    command = %step,
                    exit_code = ?result.exit_code,
                    stderr = %result.stderr.trim_end(),
                ),
                Err(error) => warn!(
                    event = "plot_failed",
                    chart = %artifact.name,
                    command = %step,
                    error = %error,
                ),
            }
        }
        rendered
    }

    fn ensure_dir(&self) -> Result<(), ReportError> {
        fs::create_dir_all(&self.results_dir).map_err(ReportError::io(&self.results_dir))
    }

    fn path(&self, stem: &str, extension: &str) -> PathBuf {
        self.results_dir.join(format!("{}.{}", stem, extension))
    }
}

fn write_file(path: &Path, contents: String) -> Result<(), ReportError> {
    fs::write(path, contents).map_err(ReportError::io(path))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use benchforge_core::{Cell, CellFailure, SummaryValue};
    use benchforge_test::{counting_experiment, counting_experiment_named, Reply, ScriptedExecutor};

    use super::*;

    fn counting_table() -> ResultsTable {
        let mut table = ResultsTable::new("Counting", ["1"], ["lf-cpp-1", "lf-cpp-4"]);
        table.record("1", "lf-cpp-1", Cell::Value(SummaryValue::new(100.0, 3)));
        table.record(
            "1",
            "lf-cpp-4",
            Cell::Failed(CellFailure::not_run("build failed")),
        );
        table
    }

    #[test]
    fn test_write_experiment_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("results"));

        let artifacts = writer
            .write_experiment(&counting_experiment(), &counting_table())
            .unwrap();

        for path in [
            &artifacts.description,
            &artifacts.data,
            &artifacts.script,
        ] {
            assert!(path.exists(), "{} missing", path.display());
        }
        assert!(artifacts.csv.as_ref().unwrap().exists());
        assert!(artifacts.markdown.as_ref().unwrap().exists());
        assert!(!artifacts.chart.exists());

        let script = fs::read_to_string(&artifacts.script).unwrap();
        assert!(script.contains("plot \"Counting.dat\""));
        assert!(script.contains("set output \"Counting.pdf\""));
    }

    #[test]
    fn test_write_all_adds_overview() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path());
        let experiment = counting_experiment();
        let table = counting_table();

        let written = writer
            .write_all(&[(&experiment, &table)], &GlobalPlot::default())
            .unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(written[1].name, crate::GLOBAL_NAME);
        assert!(dir.path().join("global.json").exists());
        assert!(dir.path().join("summary.md").exists());
    }

    #[test]
    fn test_render_without_command_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path());
        let artifacts = writer
            .write_experiment(&counting_experiment(), &counting_table())
            .unwrap();
        let executor = ScriptedExecutor::new();

        assert_eq!(writer.render(&executor, &[artifacts]), 0);
        assert_eq!(executor.call_count(), 0);
    }

    #[test]
    fn test_render_invokes_command_per_script() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path())
            .with_plot_command(PipelineStep::new("gnuplot").arg("-c"));
        let experiment = counting_experiment();
        let table = counting_table();
        let written = writer
            .write_all(&[(&experiment, &table)], &GlobalPlot::default())
            .unwrap();
        let executor = ScriptedExecutor::new()
            .on_command(&["gnuplot", "-c", "global.gp"], Reply::exit(1));

        let rendered = writer.render(&executor, &written);

        assert_eq!(rendered, 1);
        let calls = executor.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].args, vec!["-c", "Counting.gp"]);
    }

    #[test]
    fn test_plot_program_path_keeps_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path())
            .with_plot_command(PipelineStep::new("/opt/my tools/gnuplot"));
        let artifacts = writer
            .write_experiment(&counting_experiment(), &counting_table())
            .unwrap();
        let executor = ScriptedExecutor::new();

        assert_eq!(writer.render(&executor, &[artifacts]), 1);
        let calls = executor.calls();
        assert_eq!(calls[0].program, "/opt/my tools/gnuplot");
        assert_eq!(calls[0].args, vec!["Counting.gp"]);
    }

    #[test]
    fn test_reserved_experiment_id_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path());
        let experiment = counting_experiment_named("global");
        let table = counting_table();

        let err = writer
            .write_all(&[(&experiment, &table)], &GlobalPlot::default())
            .unwrap_err();

        assert!(matches!(err, ReportError::Definition(_)));
        assert!(!dir.path().join("global.json").exists());
    }

    #[test]
    fn test_experiment_id_cannot_escape_results_dir() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("results"));
        let experiment = counting_experiment_named("../Counting");

        let err = writer
            .write_experiment(&experiment, &counting_table())
            .unwrap_err();

        assert!(matches!(err, ReportError::Definition(_)));
        assert!(!dir.path().join("Counting.json").exists());
    }

    #[test]
    fn test_unwritable_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("results");
        fs::write(&blocker, "not a directory").unwrap();
        let writer = ReportWriter::new(&blocker);

        let err = writer
            .write_experiment(&counting_experiment(), &counting_table())
            .unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }
}
