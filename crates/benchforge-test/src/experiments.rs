//! Ready-made experiment definitions.

use benchforge_core::{
    Experiment, ParserKind, PipelineStep, PlotDisplay, Sequence, SummarizerKind, VariantSpec,
};

/// Compile step shared by the Counting variants.
pub const COUNTING_BUILD: &[&str] = &["lfc", "Savina/count/CountingBenchmark.lf"];

/// Run step of a Counting variant with `threads` worker threads.
pub fn counting_run(threads: usize) -> PipelineStep {
    PipelineStep::new("bin/CountingBenchmark")
        .args(["--fast", "--numIterations", "4", "--threads"])
        .arg(threads.to_string())
        .args(["--countTo", "20000000"])
}

/// The Counting experiment: one sequence, variants `lf-cpp-1` and `lf-cpp-4`,
/// four iterations with one warm-up.
///
/// Both variants compile the same source with `lfc` before running.
pub fn counting_experiment() -> Experiment {
    counting_experiment_named("Counting")
}

/// The Counting experiment under another id.
pub fn counting_experiment_named(id: &str) -> Experiment {
    let build = || PipelineStep::from_argv(COUNTING_BUILD.iter().copied()).unwrap();
    Experiment::new(id)
        .with_description("Counting benchmark from the Savina suite.")
        .with_iterations(4)
        .with_warmup(1)
        .with_display(PlotDisplay {
            title: "Counting".to_string(),
            x_axis_label: "no value".to_string(),
            y_axis_label: "Execution time in ms (median)".to_string(),
            arrangement: vec!["lf-cpp-4".to_string(), "lf-cpp-1".to_string()],
            ..PlotDisplay::default()
        })
        .with_variant(
            VariantSpec::new("lf-cpp-1", ParserKind::LfCpp)
                .with_summarizer(SummarizerKind::MedianWarmup)
                .with_color("2")
                .with_display_name("LF C++ (1 thread)"),
        )
        .with_variant(
            VariantSpec::new("lf-cpp-4", ParserKind::LfCpp)
                .with_summarizer(SummarizerKind::MedianWarmup)
                .with_color("4")
                .with_display_name("LF C++ (4 threads)"),
        )
        .with_sequence(
            Sequence::new("1")
                .with_pipeline("lf-cpp-1", vec![build(), counting_run(1)])
                .with_pipeline("lf-cpp-4", vec![build(), counting_run(4)]),
        )
}

/// A configuration document with two experiments sharing one defaults block.
pub const COUNTING_TOML: &str = r#"
results_dir = "results"

[defaults]
iterations = 4
warmup = 1
timeout_secs = 600
plotter = "box"
summarizer = "median_warmup"
y_axis_label = "Execution time in ms (median)"
arrangement = ["lf-cpp-4", "lf-cpp-1", "savina-akka-default"]

[defaults.variants.lf-cpp-1]
parser = "lf_cpp"
color = "2"
name = "LF C++ (1 thread)"

[defaults.variants.lf-cpp-4]
parser = "lf_cpp"
color = "4"
name = "LF C++ (4 threads)"

[defaults.variants.savina-akka-default]
parser = "savina"
color = "1"
name = "Akka (default config)"

[global_plot]
title = "Overview for all benchmarks"
y_axis_label = "Execution time in ms (median)"

[[experiments]]
id = "Counting"
description = "Counting benchmark from the Savina suite."
title = "Counting"
x_axis_label = "no value"

[[experiments.sequences]]
id = "1"

[experiments.sequences.variants]
"lf-cpp-1" = [
    ["lfc", "Savina/count/CountingBenchmark.lf"],
    ["bin/CountingBenchmark", "--fast", "--numIterations", "4", "--threads", "1", "--countTo", "20000000"],
]
"lf-cpp-4" = [
    ["lfc", "Savina/count/CountingBenchmark.lf"],
    { program = "bin/CountingBenchmark", args = ["--fast", "--numIterations", "4", "--threads", "4", "--countTo", "20000000"] },
]

[[experiments]]
id = "PingPong"
description = "Ping Pong from the Savina suite with 6000000 pings."
title = "Ping Pong"
global_x_label = "Ping Pong"

[experiments.variants.savina-akka-default]
iterations = 5

[[experiments.sequences]]
id = "1"

[experiments.sequences.variants]
"lf-cpp-1" = [
    ["lfc", "Savina/pingpong/PingPongBenchmark.lf"],
    ["bin/PingPongBenchmark", "--fast", "--numIterations", "4", "--threads", "1", "--count", "6000000"],
]
"savina-akka-default" = [
    ["java", "-classpath", "savina.jar", "edu.rice.habanero.benchmarks.pingpong.PingPongAkkaActorBenchmark", "-iter", "5", "-n", "6000000"],
]
"#;
