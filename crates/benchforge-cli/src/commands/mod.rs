//! Subcommand implementations.
//!
//! Each command writes its human-readable output to `out`; logging goes
//! through `tracing`.

use std::io::Write;

use benchforge_config::ResolvedConfig;
use benchforge_core::{CommandExecutor, Experiment, PipelineStep, ResultsTable};
use benchforge_report::ReportWriter;
use benchforge_runner::{missing_programs, ExecutionMode, Orchestrator};
use tracing::info;

use crate::cli::{CheckArgs, ConfigArgs, RunArgs};
use crate::error::CliError;

/// Runs the selected experiments and writes every artifact.
///
/// Returns the results tables in configuration order.
pub fn run<E: CommandExecutor>(
    args: &RunArgs,
    executor: E,
    out: &mut impl Write,
) -> Result<Vec<ResultsTable>, CliError> {
    let mut config = ResolvedConfig::load(&args.config.config)?.select(&args.experiments)?;
    if let Some(dir) = &args.results_dir {
        config.results_dir = dir.clone();
    }
    if args.preflight {
        let missing = missing_programs(&config.experiments);
        if !missing.is_empty() {
            return Err(CliError::MissingPrograms(missing));
        }
    }

    let mode = ExecutionMode::from_jobs(args.jobs);
    info!(
        event = "batch_selected",
        experiments = config.experiments.len(),
        mode = ?mode,
    );
    let orchestrator = Orchestrator::new(executor);
    let tables = orchestrator.run_experiments(&config.experiments, mode)?;

    let mut writer = ReportWriter::new(&config.results_dir);
    if let Some(command) = config.plot_command.clone().filter(|_| !args.no_plot) {
        writer = writer.with_plot_command(command);
    }
    let runs: Vec<(&Experiment, &ResultsTable)> = config.experiments.iter().zip(&tables).collect();
    let written = writer.write_all(&runs, &config.global_plot)?;
    writer.render(orchestrator.executor(), &written);

    for (experiment, table) in &runs {
        writeln!(
            out,
            "{:<24} {} cells, {} failed",
            experiment.id(),
            table.recorded_count(),
            table.failed_count()
        )?;
        for (sequence, variant, failure) in table.failures() {
            writeln!(out, "  {} / {}: {}", sequence, variant, failure.message)?;
        }
    }
    writeln!(out, "results written to {}", config.results_dir.display())?;
    Ok(tables)
}

/// Validates the configuration and prints what `run` would execute.
///
/// Programs named without a path are looked up on `PATH`; missing ones are
/// listed, and fail the check under `--preflight`.
pub fn check(args: &CheckArgs, out: &mut impl Write) -> Result<(), CliError> {
    let config = ResolvedConfig::load(&args.config.config)?;

    for experiment in &config.experiments {
        writeln!(
            out,
            "{}: {} iterations ({} warm-up), timeout {}s{}",
            experiment.id(),
            experiment.iterations(),
            experiment.warmup(),
            experiment.timeout().as_secs(),
            if experiment.repeat_run_step() {
                ", run step repeated"
            } else {
                ""
            },
        )?;
        for variant in experiment.variants() {
            writeln!(
                out,
                "  variant {}: parser {}, summarizer {}, {} iterations",
                variant.name,
                variant.parser,
                variant.summarizer,
                experiment.iterations_for(variant),
            )?;
        }
        for sequence in experiment.sequences() {
            writeln!(out, "  sequence {}", sequence.id())?;
            for (variant, steps) in sequence.pipelines() {
                writeln!(out, "    {}: {}", variant, describe_pipeline(steps))?;
            }
        }
    }
    let missing = missing_programs(&config.experiments);
    for program in &missing {
        writeln!(out, "missing: {}", program)?;
    }
    if args.preflight && !missing.is_empty() {
        return Err(CliError::MissingPrograms(missing));
    }
    writeln!(
        out,
        "{} experiment(s) valid; results go to {}",
        config.experiments.len(),
        config.results_dir.display()
    )?;
    Ok(())
}

/// Lists experiment ids with their variants, one experiment per line.
pub fn list(args: &ConfigArgs, out: &mut impl Write) -> Result<(), CliError> {
    let config = ResolvedConfig::load(&args.config)?;
    for experiment in &config.experiments {
        let variants: Vec<&str> = experiment.variants().iter().map(|v| v.name.as_str()).collect();
        writeln!(out, "{}\t{}", experiment.id(), variants.join(", "))?;
    }
    Ok(())
}

fn describe_pipeline(steps: &[PipelineStep]) -> String {
    steps
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
