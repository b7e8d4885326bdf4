//! Configuration documents for BenchForge.
//!
//! A configuration document declares shared defaults, the global overview
//! plot, and a list of experiments. Loading is two-staged: the document is
//! deserialized into the plain structs of this crate, then
//! [`BenchConfig::resolve`] merges defaults, resolves strategy names, and
//! validates everything into immutable
//! [`Experiment`](benchforge_core::Experiment)s. Every error surfaces
//! before a single benchmark process starts.
//!
//! # Examples
//!
//! ```
//! use benchforge_config::BenchConfig;
//!
//! let config = BenchConfig::from_toml_str(r#"
//!     [defaults]
//!     iterations = 4
//!     warmup = 1
//!     summarizer = "median_warmup"
//!
//!     [defaults.variants.lf-cpp-1]
//!     parser = "lf_cpp"
//!
//!     [[experiments]]
//!     id = "Counting"
//!
//!     [[experiments.sequences]]
//!     id = "1"
//!     [experiments.sequences.variants]
//!     "lf-cpp-1" = [["bin/CountingBenchmark", "--fast", "--numIterations", "4"]]
//! "#).unwrap();
//!
//! let resolved = config.resolve(".").unwrap();
//! assert_eq!(resolved.experiments.len(), 1);
//! assert_eq!(resolved.experiments[0].iterations(), 4);
//! ```
//!
//! YAML is accepted as well; [`BenchConfig::load`] picks the format from
//! the file extension.

mod resolve;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use benchforge_core::{DefinitionError, UnknownStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use resolve::ResolvedConfig;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("experiment `{experiment}`: {source}")]
    UnknownStrategy {
        experiment: String,
        #[source]
        source: UnknownStrategy,
    },

    #[error("variant `{variant}` of experiment `{experiment}` has no {role}")]
    MissingStrategy {
        experiment: String,
        variant: String,
        role: &'static str,
    },

    #[error("experiment `{0}` is declared twice")]
    DuplicateExperiment(String),

    #[error("no experiment named `{0}`")]
    UnknownExperiment(String),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A complete configuration document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BenchConfig {
    /// Directory for plot artifacts, relative to the document.
    #[serde(default)]
    pub results_dir: Option<PathBuf>,

    /// Default working directory for pipelines, relative to the document.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// External plotting command, run with each generated script appended
    /// to its arguments.
    #[serde(default)]
    pub plot_command: Option<StepConfig>,

    /// Settings shared by every experiment.
    #[serde(default)]
    pub defaults: ExperimentDefaults,

    /// The cross-experiment overview chart.
    #[serde(default)]
    pub global_plot: GlobalPlotConfig,

    /// Experiments in run order.
    #[serde(default)]
    pub experiments: Vec<ExperimentConfig>,
}

impl BenchConfig {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a document, choosing YAML for `.yaml`/`.yml` files and TOML
    /// otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        if yaml {
            Self::from_yaml_file(path)
        } else {
            Self::from_toml_file(path)
        }
    }

    /// Loads a document from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses a document from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads a document from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses a document from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the results directory.
    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = Some(dir.into());
        self
    }

    /// Sets the plotting command.
    pub fn with_plot_command(mut self, command: StepConfig) -> Self {
        self.plot_command = Some(command);
        self
    }

    /// Sets the shared defaults.
    pub fn with_defaults(mut self, defaults: ExperimentDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Appends an experiment.
    pub fn with_experiment(mut self, experiment: ExperimentConfig) -> Self {
        self.experiments.push(experiment);
        self
    }

    /// Resolves the document into validated experiments.
    ///
    /// Relative paths are interpreted against `base_dir`, normally the
    /// directory containing the document.
    pub fn resolve(&self, base_dir: impl AsRef<Path>) -> Result<ResolvedConfig, ConfigError> {
        resolve::resolve(self, base_dir.as_ref())
    }
}

/// Settings shared by every experiment.
///
/// The same table appears inside each experiment, where any field set
/// overrides the `[defaults]` value. Variant tables are merged per field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ExperimentDefaults {
    #[serde(default)]
    pub iterations: Option<usize>,

    #[serde(default)]
    pub warmup: Option<usize>,

    /// Per-step timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Run the final step once per iteration instead of once.
    #[serde(default)]
    pub repeat_run_step: Option<bool>,

    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Summarizer for variants that do not name one.
    #[serde(default)]
    pub summarizer: Option<String>,

    #[serde(default)]
    pub plotter: Option<String>,

    #[serde(default)]
    pub x_axis_label: Option<String>,

    #[serde(default)]
    pub y_axis_label: Option<String>,

    /// Extra gnuplot commands.
    #[serde(default)]
    pub gnuplot_header: Option<String>,

    /// Preferred variant order in charts.
    #[serde(default)]
    pub arrangement: Option<Vec<String>>,

    #[serde(default)]
    pub variants: BTreeMap<String, VariantSettings>,
}

impl ExperimentDefaults {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = Some(iterations);
        self
    }

    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = Some(warmup);
        self
    }

    pub fn with_summarizer(mut self, summarizer: impl Into<String>) -> Self {
        self.summarizer = Some(summarizer.into());
        self
    }

    /// Adds (or replaces) the settings of one variant.
    pub fn with_variant(mut self, name: impl Into<String>, settings: VariantSettings) -> Self {
        self.variants.insert(name.into(), settings);
        self
    }

    /// Returns `self` with every unset field taken from `base`.
    pub fn merged_over(&self, base: &ExperimentDefaults) -> ExperimentDefaults {
        let mut variants = base.variants.clone();
        for (name, settings) in &self.variants {
            let merged = match variants.get(name) {
                Some(inherited) => settings.merged_over(inherited),
                None => settings.clone(),
            };
            variants.insert(name.clone(), merged);
        }
        ExperimentDefaults {
            iterations: self.iterations.or(base.iterations),
            warmup: self.warmup.or(base.warmup),
            timeout_secs: self.timeout_secs.or(base.timeout_secs),
            repeat_run_step: self.repeat_run_step.or(base.repeat_run_step),
            working_dir: self.working_dir.clone().or_else(|| base.working_dir.clone()),
            summarizer: self.summarizer.clone().or_else(|| base.summarizer.clone()),
            plotter: self.plotter.clone().or_else(|| base.plotter.clone()),
            x_axis_label: self.x_axis_label.clone().or_else(|| base.x_axis_label.clone()),
            y_axis_label: self.y_axis_label.clone().or_else(|| base.y_axis_label.clone()),
            gnuplot_header: self
                .gnuplot_header
                .clone()
                .or_else(|| base.gnuplot_header.clone()),
            arrangement: self.arrangement.clone().or_else(|| base.arrangement.clone()),
            variants,
        }
    }
}

/// Strategy and display settings of one variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct VariantSettings {
    #[serde(default)]
    pub parser: Option<String>,

    #[serde(default)]
    pub summarizer: Option<String>,

    /// Iteration count override.
    #[serde(default)]
    pub iterations: Option<usize>,

    /// Plot color token.
    #[serde(default)]
    pub color: Option<String>,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

impl VariantSettings {
    /// Creates settings with only a parser.
    pub fn parser(parser: impl Into<String>) -> Self {
        Self {
            parser: Some(parser.into()),
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns `self` with every unset field taken from `base`.
    pub fn merged_over(&self, base: &VariantSettings) -> VariantSettings {
        VariantSettings {
            parser: self.parser.clone().or_else(|| base.parser.clone()),
            summarizer: self.summarizer.clone().or_else(|| base.summarizer.clone()),
            iterations: self.iterations.or(base.iterations),
            color: self.color.clone().or_else(|| base.color.clone()),
            name: self.name.clone().or_else(|| base.name.clone()),
        }
    }
}

/// One experiment of the document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ExperimentConfig {
    pub id: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Chart title; defaults to the id.
    #[serde(default)]
    pub title: Option<String>,

    /// Sequence feeding the overview chart; defaults to the first.
    #[serde(default)]
    pub global_sequence: Option<String>,

    /// Label on the overview's x axis; defaults to the id.
    #[serde(default)]
    pub global_x_label: Option<String>,

    /// Overrides of the shared defaults.
    #[serde(flatten)]
    pub overrides: ExperimentDefaults,

    #[serde(default)]
    pub sequences: Vec<SequenceConfig>,
}

impl ExperimentConfig {
    /// Creates an experiment with no sequences.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_overrides(mut self, overrides: ExperimentDefaults) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_sequence(mut self, sequence: SequenceConfig) -> Self {
        self.sequences.push(sequence);
        self
    }
}

/// One sequence: the pipeline of every variant at one parameter value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SequenceConfig {
    pub id: String,

    #[serde(default)]
    pub variants: BTreeMap<String, Vec<StepConfig>>,
}

impl SequenceConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            variants: BTreeMap::new(),
        }
    }

    pub fn with_variant(mut self, name: impl Into<String>, steps: Vec<StepConfig>) -> Self {
        self.variants.insert(name.into(), steps);
        self
    }
}

/// A pipeline step, written either as an argv array or as a table.
///
/// ```toml
/// steps = [
///     ["lfc", "Savina/count/CountingBenchmark.lf"],
///     { program = "bin/CountingBenchmark", args = ["--fast"] },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StepConfig {
    Argv(Vec<String>),
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl StepConfig {
    /// Creates an argv-form step.
    pub fn argv<I, T>(argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        StepConfig::Argv(argv.into_iter().map(Into::into).collect())
    }
}

/// Display settings of the overview chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GlobalPlotConfig {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub x_axis_label: Option<String>,

    #[serde(default)]
    pub y_axis_label: Option<String>,

    #[serde(default)]
    pub gnuplot_header: Option<String>,

    /// Falls back to the default plotter.
    #[serde(default)]
    pub plotter: Option<String>,

    /// Falls back to the default arrangement.
    #[serde(default)]
    pub arrangement: Option<Vec<String>>,
}

#[cfg(test)]
mod tests;
