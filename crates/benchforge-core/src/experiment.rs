//! Experiment definitions.
//!
//! An [`Experiment`] is immutable for the duration of a run. It is built
//! either from a configuration document (see `benchforge-config`) or
//! programmatically with the `with_*` builder methods, and must pass
//! [`Experiment::validate`] before the orchestrator accepts it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::DefinitionError;
use crate::step::PipelineStep;
use crate::strategy::{ParserKind, PlotterKind, SummarizerKind};

/// Default number of measured iterations per variant.
pub const DEFAULT_ITERATIONS: usize = 4;

/// Default number of warm-up iterations discarded before summarizing.
pub const DEFAULT_WARMUP: usize = 1;

/// Default per-step timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);

/// Artifact stem of the cross-experiment overview chart.
pub const GLOBAL_ARTIFACT: &str = "global";

/// Artifact stem of the cross-experiment comparison.
pub const SUMMARY_ARTIFACT: &str = "summary";

/// One point along an experiment's swept parameter.
///
/// Maps each variant name to the ordered steps that build and run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    id: String,
    pipelines: BTreeMap<String, Vec<PipelineStep>>,
}

impl Sequence {
    /// Creates an empty sequence.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pipelines: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) the pipeline of one variant.
    pub fn with_pipeline(mut self, variant: impl Into<String>, steps: Vec<PipelineStep>) -> Self {
        self.pipelines.insert(variant.into(), steps);
        self
    }

    /// Returns the sequence identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the pipeline of `variant`, if this sequence runs it.
    pub fn pipeline(&self, variant: &str) -> Option<&[PipelineStep]> {
        self.pipelines.get(variant).map(Vec::as_slice)
    }

    /// Returns variant names in sorted order.
    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.pipelines.keys().map(String::as_str)
    }

    /// Returns all (variant, pipeline) pairs in sorted variant order.
    pub fn pipelines(&self) -> impl Iterator<Item = (&str, &[PipelineStep])> {
        self.pipelines
            .iter()
            .map(|(name, steps)| (name.as_str(), steps.as_slice()))
    }
}

/// How one variant is parsed, summarized, and displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSpec {
    /// Variant name as used in sequences.
    pub name: String,
    /// Parser for the variant's output.
    pub parser: ParserKind,
    /// Summarizer for the variant's samples.
    pub summarizer: SummarizerKind,
    /// Iteration count override.
    pub iterations: Option<usize>,
    /// Plot color token (gnuplot line color index or `#rrggbb`).
    pub color: Option<String>,
    /// Human-readable display name.
    pub display_name: Option<String>,
}

impl VariantSpec {
    /// Creates a variant with the default summarizer and no display metadata.
    pub fn new(name: impl Into<String>, parser: ParserKind) -> Self {
        Self {
            name: name.into(),
            parser,
            summarizer: SummarizerKind::default(),
            iterations: None,
            color: None,
            display_name: None,
        }
    }

    /// Sets the summarizer.
    pub fn with_summarizer(mut self, summarizer: SummarizerKind) -> Self {
        self.summarizer = summarizer;
        self
    }

    /// Overrides the experiment's iteration count for this variant.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// Sets the plot color token.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Display metadata for one chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlotDisplay {
    pub title: String,
    pub x_axis_label: String,
    pub y_axis_label: String,
    /// Extra gnuplot commands inserted after the generated header.
    pub gnuplot_header: String,
    /// Preferred variant order; unlisted variants follow alphabetically.
    pub arrangement: Vec<String>,
    pub plotter: PlotterKind,
}

/// Display metadata for the cross-experiment overview chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalPlot {
    pub display: PlotDisplay,
    /// Variant colors shared by all experiments.
    pub colors: BTreeMap<String, String>,
    /// Variant display names shared by all experiments.
    pub names: BTreeMap<String, String>,
}

/// A named benchmark comparison producing one chart.
///
/// # Example
///
/// ```
/// use benchforge_core::{Experiment, ParserKind, PipelineStep, Sequence, VariantSpec};
///
/// let experiment = Experiment::new("Counting")
///     .with_iterations(4)
///     .with_warmup(1)
///     .with_variant(VariantSpec::new("lf-cpp-1", ParserKind::LfCpp))
///     .with_sequence(Sequence::new("1").with_pipeline(
///         "lf-cpp-1",
///         vec![PipelineStep::new("bin/CountingBenchmark").arg("--threads").arg("1")],
///     ));
///
/// assert!(experiment.validate().is_ok());
/// assert_eq!(experiment.global_sequence(), Some("1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Experiment {
    id: String,
    description: String,
    sequences: Vec<Sequence>,
    variants: Vec<VariantSpec>,
    iterations: usize,
    warmup: usize,
    timeout: Duration,
    working_dir: Option<PathBuf>,
    repeat_run_step: bool,
    display: PlotDisplay,
    global_sequence: Option<String>,
    global_x_label: Option<String>,
}

impl Experiment {
    /// Creates an experiment with default iteration, warm-up, and timeout settings.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display: PlotDisplay {
                title: id.clone(),
                ..PlotDisplay::default()
            },
            id,
            description: String::new(),
            sequences: Vec::new(),
            variants: Vec::new(),
            iterations: DEFAULT_ITERATIONS,
            warmup: DEFAULT_WARMUP,
            timeout: DEFAULT_TIMEOUT,
            working_dir: None,
            repeat_run_step: false,
            global_sequence: None,
            global_x_label: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_sequence(mut self, sequence: Sequence) -> Self {
        self.sequences.push(sequence);
        self
    }

    /// Adds a variant definition; variants are kept sorted by name.
    pub fn with_variant(mut self, variant: VariantSpec) -> Self {
        let at = self
            .variants
            .partition_point(|existing| existing.name <= variant.name);
        self.variants.insert(at, variant);
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Runs the final pipeline step once per iteration instead of once.
    pub fn with_repeat_run_step(mut self, repeat: bool) -> Self {
        self.repeat_run_step = repeat;
        self
    }

    pub fn with_display(mut self, display: PlotDisplay) -> Self {
        self.display = display;
        self
    }

    pub fn with_global_sequence(mut self, sequence: impl Into<String>) -> Self {
        self.global_sequence = Some(sequence.into());
        self
    }

    pub fn with_global_x_label(mut self, label: impl Into<String>) -> Self {
        self.global_x_label = Some(label.into());
        self
    }

    /// Returns the experiment identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns sequences in declaration order.
    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    /// Returns variant definitions sorted by name.
    pub fn variants(&self) -> &[VariantSpec] {
        &self.variants
    }

    /// Looks up a variant definition by name.
    pub fn variant(&self, name: &str) -> Option<&VariantSpec> {
        self.variants
            .binary_search_by(|v| v.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.variants[i])
    }

    /// Returns the default iteration count.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Returns the iteration count of `variant`, honoring its override.
    pub fn iterations_for(&self, variant: &VariantSpec) -> usize {
        variant.iterations.unwrap_or(self.iterations)
    }

    pub fn warmup(&self) -> usize {
        self.warmup
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn repeat_run_step(&self) -> bool {
        self.repeat_run_step
    }

    pub fn display(&self) -> &PlotDisplay {
        &self.display
    }

    /// Returns the sequence feeding the global overview.
    ///
    /// Falls back to the first declared sequence.
    pub fn global_sequence(&self) -> Option<&str> {
        self.global_sequence
            .as_deref()
            .or_else(|| self.sequences.first().map(Sequence::id))
    }

    /// Returns this experiment's label on the overview's x axis.
    pub fn global_x_label(&self) -> &str {
        self.global_x_label.as_deref().unwrap_or(&self.id)
    }

    /// Checks the definition invariants.
    ///
    /// - the id names a file inside the results directory and is not taken
    ///   by the overview artifacts
    /// - at least one sequence, with unique ids
    /// - every sequence runs the same, non-empty set of variants
    /// - every pipeline has at least one step and no step has an empty program
    /// - every variant run has exactly one definition, and every definition is run
    /// - every variant runs at least one iteration beyond warm-up
    /// - the global sequence exists and the arrangement has no duplicates
    pub fn validate(&self) -> Result<(), DefinitionError> {
        self.validate_id()?;
        let experiment = || self.id.clone();

        let Some(first) = self.sequences.first() else {
            return Err(DefinitionError::NoSequences {
                experiment: experiment(),
            });
        };
        let expected: Vec<String> = first.variant_names().map(str::to_string).collect();

        let mut seen_sequences = BTreeSet::new();
        for sequence in &self.sequences {
            if !seen_sequences.insert(sequence.id()) {
                return Err(DefinitionError::DuplicateSequence {
                    experiment: experiment(),
                    sequence: sequence.id().to_string(),
                });
            }
            if sequence.pipelines.is_empty() {
                return Err(DefinitionError::EmptySequence {
                    experiment: experiment(),
                    sequence: sequence.id().to_string(),
                });
            }

            let found: Vec<String> = sequence.variant_names().map(str::to_string).collect();
            if found != expected {
                return Err(DefinitionError::AsymmetricVariants {
                    experiment: experiment(),
                    sequence: sequence.id().to_string(),
                    expected,
                    found,
                });
            }

            for (variant, steps) in sequence.pipelines() {
                if steps.is_empty() {
                    return Err(DefinitionError::EmptyPipeline {
                        experiment: experiment(),
                        sequence: sequence.id().to_string(),
                        variant: variant.to_string(),
                    });
                }
                if let Some(index) = steps.iter().position(|s| s.program.trim().is_empty()) {
                    return Err(DefinitionError::EmptyProgram {
                        experiment: experiment(),
                        sequence: sequence.id().to_string(),
                        variant: variant.to_string(),
                        step: index + 1,
                    });
                }
            }
        }

        for pair in self.variants.windows(2) {
            if pair[0].name == pair[1].name {
                return Err(DefinitionError::DuplicateVariant {
                    experiment: experiment(),
                    variant: pair[0].name.clone(),
                });
            }
        }
        for name in &expected {
            if self.variant(name).is_none() {
                return Err(DefinitionError::UnknownVariant {
                    experiment: experiment(),
                    variant: name.clone(),
                });
            }
        }
        for variant in &self.variants {
            if !expected.contains(&variant.name) {
                return Err(DefinitionError::UnusedVariant {
                    experiment: experiment(),
                    variant: variant.name.clone(),
                });
            }
            let iterations = self.iterations_for(variant);
            if iterations == 0 {
                return Err(DefinitionError::ZeroIterations {
                    experiment: experiment(),
                    variant: variant.name.clone(),
                });
            }
            if self.warmup >= iterations {
                return Err(DefinitionError::WarmupTooLarge {
                    experiment: experiment(),
                    variant: variant.name.clone(),
                    warmup: self.warmup,
                    iterations,
                });
            }
        }

        if let Some(global) = &self.global_sequence {
            if !seen_sequences.contains(global.as_str()) {
                return Err(DefinitionError::UnknownGlobalSequence {
                    experiment: experiment(),
                    sequence: global.clone(),
                });
            }
        }

        let mut arranged = BTreeSet::new();
        for name in &self.display.arrangement {
            if !arranged.insert(name.as_str()) {
                return Err(DefinitionError::DuplicateArrangement {
                    experiment: experiment(),
                    variant: name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Checks that the id can name this experiment's artifact files.
    pub fn validate_id(&self) -> Result<(), DefinitionError> {
        match id_problem(&self.id) {
            Some(reason) => Err(DefinitionError::InvalidId {
                experiment: self.id.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// Experiment ids double as artifact file stems.
fn id_problem(id: &str) -> Option<&'static str> {
    if id.trim().is_empty() {
        return Some("is empty");
    }
    if id.contains(['/', '\\', '\0']) {
        return Some("contains a path separator");
    }
    if id == "." || id == ".." {
        return Some("is a relative path component");
    }
    // Case-insensitive file systems would still collide.
    if [GLOBAL_ARTIFACT, SUMMARY_ARTIFACT]
        .iter()
        .any(|reserved| id.eq_ignore_ascii_case(reserved))
    {
        return Some("is reserved for the overview artifacts");
    }
    None
}
