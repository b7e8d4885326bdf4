//! Resolution of a document into validated experiments.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use benchforge_core::experiment::{DEFAULT_ITERATIONS, DEFAULT_TIMEOUT, DEFAULT_WARMUP};
use benchforge_core::{
    Experiment, GlobalPlot, ParserKind, PipelineStep, PlotDisplay, PlotterKind, Sequence,
    SummarizerKind, UnknownStrategy, VariantSpec,
};
use tracing::{debug, info};

use crate::{
    BenchConfig, ConfigError, ExperimentConfig, ExperimentDefaults, GlobalPlotConfig, StepConfig,
};

const DEFAULT_RESULTS_DIR: &str = "results";

/// A fully resolved configuration, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Validated experiments in document order.
    pub experiments: Vec<Experiment>,
    /// The overview chart.
    pub global_plot: GlobalPlot,
    /// Absolute or base-relative artifact directory.
    pub results_dir: PathBuf,
    /// External plotting command, if any.
    pub plot_command: Option<PipelineStep>,
}

impl ResolvedConfig {
    /// Loads and resolves a document relative to its own directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        BenchConfig::load(path)?.resolve(base_dir)
    }

    /// Keeps only the named experiments, in document order.
    ///
    /// An empty selection keeps everything.
    pub fn select<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self, ConfigError> {
        if names.is_empty() {
            return Ok(self);
        }
        let wanted: BTreeSet<&str> = names.iter().map(AsRef::as_ref).collect();
        for name in &wanted {
            if !self.experiments.iter().any(|e| e.id() == *name) {
                return Err(ConfigError::UnknownExperiment(name.to_string()));
            }
        }
        self.experiments.retain(|e| wanted.contains(e.id()));
        Ok(self)
    }

    /// Looks up an experiment by id.
    pub fn experiment(&self, id: &str) -> Option<&Experiment> {
        self.experiments.iter().find(|e| e.id() == id)
    }
}

pub(crate) fn resolve(config: &BenchConfig, base_dir: &Path) -> Result<ResolvedConfig, ConfigError> {
    let mut seen = BTreeSet::new();
    let mut experiments = Vec::with_capacity(config.experiments.len());
    for experiment in &config.experiments {
        if !seen.insert(experiment.id.as_str()) {
            return Err(ConfigError::DuplicateExperiment(experiment.id.clone()));
        }
        let resolved = resolve_experiment(experiment, &config.defaults, config, base_dir)?;
        resolved.validate()?;
        experiments.push(resolved);
    }

    let plot_command = match &config.plot_command {
        Some(command) => {
            let step = to_step(command);
            if step.program.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "plot_command names no program".to_string(),
                ));
            }
            Some(step)
        }
        None => None,
    };
    let global_plot = resolve_global_plot(&config.global_plot, &config.defaults)?;
    let results_dir = base_dir.join(
        config
            .results_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_DIR)),
    );

    info!(
        event = "config_resolved",
        experiments = experiments.len(),
        results_dir = %results_dir.display(),
    );
    Ok(ResolvedConfig {
        experiments,
        global_plot,
        results_dir,
        plot_command,
    })
}

/// Merges `experiment` over `defaults` and builds the core definition.
fn resolve_experiment(
    experiment: &ExperimentConfig,
    defaults: &ExperimentDefaults,
    config: &BenchConfig,
    base_dir: &Path,
) -> Result<Experiment, ConfigError> {
    let id = experiment.id.as_str();
    let settings = experiment.overrides.merged_over(defaults);
    let strategy_error = |source: UnknownStrategy| ConfigError::UnknownStrategy {
        experiment: id.to_string(),
        source,
    };

    if settings.timeout_secs == Some(0) {
        return Err(ConfigError::Invalid(format!(
            "experiment `{id}` has a zero timeout"
        )));
    }

    let mut resolved = Experiment::new(id)
        .with_iterations(settings.iterations.unwrap_or(DEFAULT_ITERATIONS))
        .with_warmup(settings.warmup.unwrap_or(DEFAULT_WARMUP))
        .with_timeout(
            settings
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        )
        .with_repeat_run_step(settings.repeat_run_step.unwrap_or(false));
    if let Some(description) = &experiment.description {
        resolved = resolved.with_description(description.clone());
    }
    // Pipelines run from the document's directory unless told otherwise.
    resolved = match settings.working_dir.as_ref().or(config.working_dir.as_ref()) {
        Some(dir) => resolved.with_working_dir(base_dir.join(dir)),
        None => resolved.with_working_dir(base_dir),
    };
    if let Some(sequence) = &experiment.global_sequence {
        resolved = resolved.with_global_sequence(sequence.clone());
    }
    if let Some(label) = &experiment.global_x_label {
        resolved = resolved.with_global_x_label(label.clone());
    }

    let mut used = BTreeSet::new();
    for sequence in &experiment.sequences {
        let mut resolved_sequence = Sequence::new(sequence.id.clone());
        for (variant, steps) in &sequence.variants {
            used.insert(variant.as_str());
            resolved_sequence =
                resolved_sequence.with_pipeline(variant.clone(), steps.iter().map(to_step).collect());
        }
        resolved = resolved.with_sequence(resolved_sequence);
    }

    for name in &used {
        let variant = settings.variants.get(*name).cloned().unwrap_or_default();
        let parser = variant
            .parser
            .as_deref()
            .ok_or_else(|| missing(id, name, "parser"))?
            .parse::<ParserKind>()
            .map_err(strategy_error)?;
        let summarizer = variant
            .summarizer
            .as_deref()
            .or(settings.summarizer.as_deref())
            .ok_or_else(|| missing(id, name, "summarizer"))?
            .parse::<SummarizerKind>()
            .map_err(strategy_error)?;

        let mut spec = VariantSpec::new(*name, parser).with_summarizer(summarizer);
        if let Some(iterations) = variant.iterations {
            spec = spec.with_iterations(iterations);
        }
        if let Some(color) = variant.color {
            spec = spec.with_color(color);
        }
        if let Some(display_name) = variant.name {
            spec = spec.with_display_name(display_name);
        }
        resolved = resolved.with_variant(spec);
    }

    let plotter = match settings.plotter.as_deref() {
        Some(name) => name.parse::<PlotterKind>().map_err(strategy_error)?,
        None => PlotterKind::default(),
    };
    let arrangement = settings
        .arrangement
        .unwrap_or_default()
        .into_iter()
        .filter(|name| {
            let keep = used.contains(name.as_str());
            if !keep {
                debug!(event = "arrangement_skip", experiment = id, variant = %name);
            }
            keep
        })
        .collect();

    Ok(resolved.with_display(PlotDisplay {
        title: experiment.title.clone().unwrap_or_else(|| id.to_string()),
        x_axis_label: settings.x_axis_label.unwrap_or_default(),
        y_axis_label: settings.y_axis_label.unwrap_or_default(),
        gnuplot_header: settings.gnuplot_header.unwrap_or_default(),
        arrangement,
        plotter,
    }))
}

fn resolve_global_plot(
    global: &GlobalPlotConfig,
    defaults: &ExperimentDefaults,
) -> Result<GlobalPlot, ConfigError> {
    let strategy_error = |source: UnknownStrategy| ConfigError::UnknownStrategy {
        experiment: "global".to_string(),
        source,
    };
    let plotter = match global.plotter.as_deref().or(defaults.plotter.as_deref()) {
        Some(name) => name.parse::<PlotterKind>().map_err(strategy_error)?,
        None => PlotterKind::default(),
    };

    let mut colors = BTreeMap::new();
    let mut names = BTreeMap::new();
    for (variant, settings) in &defaults.variants {
        if let Some(color) = &settings.color {
            colors.insert(variant.clone(), color.clone());
        }
        if let Some(name) = &settings.name {
            names.insert(variant.clone(), name.clone());
        }
    }

    Ok(GlobalPlot {
        display: PlotDisplay {
            title: global.title.clone().unwrap_or_default(),
            x_axis_label: global.x_axis_label.clone().unwrap_or_default(),
            y_axis_label: global
                .y_axis_label
                .clone()
                .or_else(|| defaults.y_axis_label.clone())
                .unwrap_or_default(),
            gnuplot_header: global.gnuplot_header.clone().unwrap_or_default(),
            arrangement: global
                .arrangement
                .clone()
                .or_else(|| defaults.arrangement.clone())
                .unwrap_or_default(),
            plotter,
        },
        colors,
        names,
    })
}

fn to_step(step: &StepConfig) -> PipelineStep {
    match step {
        StepConfig::Argv(argv) => {
            // An empty argv becomes a step without a program, which
            // validation rejects with its position.
            PipelineStep::from_argv(argv.iter().cloned()).unwrap_or_else(|| PipelineStep::new(""))
        }
        StepConfig::Command { program, args } => {
            PipelineStep::new(program.clone()).args(args.iter().cloned())
        }
    }
}

fn missing(experiment: &str, variant: &str, role: &'static str) -> ConfigError {
    ConfigError::MissingStrategy {
        experiment: experiment.to_string(),
        variant: variant.to_string(),
        role,
    }
}
