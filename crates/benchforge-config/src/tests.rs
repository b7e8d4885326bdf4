//! Tests for configuration loading and resolution.

use std::path::Path;
use std::time::Duration;

use benchforge_core::{DefinitionError, ParserKind, PlotterKind, SummarizerKind};
use benchforge_test::COUNTING_TOML;

use super::*;

fn resolved() -> ResolvedConfig {
    BenchConfig::from_toml_str(COUNTING_TOML)
        .unwrap()
        .resolve("/bench")
        .unwrap()
}

#[test]
fn test_toml_parsing() {
    let config = BenchConfig::from_toml_str(COUNTING_TOML).unwrap();

    assert_eq!(config.results_dir.as_deref(), Some(Path::new("results")));
    assert_eq!(config.defaults.iterations, Some(4));
    assert_eq!(config.defaults.variants.len(), 3);
    assert_eq!(config.experiments.len(), 2);

    let counting = &config.experiments[0];
    assert_eq!(counting.id, "Counting");
    assert_eq!(counting.overrides.x_axis_label.as_deref(), Some("no value"));
    let steps = &counting.sequences[0].variants["lf-cpp-4"];
    assert_eq!(steps[0], StepConfig::argv(["lfc", "Savina/count/CountingBenchmark.lf"]));
    assert!(matches!(&steps[1], StepConfig::Command { program, args }
        if program == "bin/CountingBenchmark" && args.len() == 8));
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        defaults:
          iterations: 3
          warmup: 1
          summarizer: min_warmup
          variants:
            lf-c-1:
              parser: lf_c
        experiments:
          - id: PingPong
            timeout_secs: 30
            sequences:
              - id: "1000"
                variants:
                  lf-c-1:
                    - [bin/PingPong, --count, "1000"]
    "#;

    let resolved = BenchConfig::from_yaml_str(yaml).unwrap().resolve(".").unwrap();
    let experiment = &resolved.experiments[0];

    assert_eq!(experiment.iterations(), 3);
    assert_eq!(experiment.timeout(), Duration::from_secs(30));
    let variant = experiment.variant("lf-c-1").unwrap();
    assert_eq!(variant.parser, ParserKind::LfC);
    assert_eq!(variant.summarizer, SummarizerKind::MinWarmup);
    let steps = experiment.sequences()[0].pipeline("lf-c-1").unwrap();
    assert_eq!(steps[0].args, vec!["--count", "1000"]);
}

#[test]
fn test_defaults_and_overrides_merge() {
    let resolved = resolved();

    let counting = resolved.experiment("Counting").unwrap();
    assert_eq!(counting.iterations(), 4);
    assert_eq!(counting.warmup(), 1);
    assert_eq!(counting.timeout(), Duration::from_secs(600));
    assert_eq!(counting.display().title, "Counting");
    assert_eq!(counting.display().x_axis_label, "no value");
    assert_eq!(counting.display().y_axis_label, "Execution time in ms (median)");
    assert_eq!(counting.display().plotter, PlotterKind::Box);
    let lf4 = counting.variant("lf-cpp-4").unwrap();
    assert_eq!(lf4.color.as_deref(), Some("4"));
    assert_eq!(lf4.display_name.as_deref(), Some("LF C++ (4 threads)"));

    let ping_pong = resolved.experiment("PingPong").unwrap();
    let akka = ping_pong.variant("savina-akka-default").unwrap();
    assert_eq!(akka.parser, ParserKind::Savina);
    assert_eq!(akka.iterations, Some(5));
    assert_eq!(akka.color.as_deref(), Some("1"));
    assert_eq!(ping_pong.iterations_for(akka), 5);
    assert_eq!(ping_pong.global_x_label(), "Ping Pong");
}

#[test]
fn test_arrangement_drops_unused_variants() {
    let resolved = resolved();

    assert_eq!(
        resolved.experiment("Counting").unwrap().display().arrangement,
        vec!["lf-cpp-4", "lf-cpp-1"]
    );
    assert_eq!(
        resolved.experiment("PingPong").unwrap().display().arrangement,
        vec!["lf-cpp-1", "savina-akka-default"]
    );
}

#[test]
fn test_global_plot_collects_shared_display_maps() {
    let global = resolved().global_plot;

    assert_eq!(global.display.title, "Overview for all benchmarks");
    assert_eq!(global.display.arrangement.len(), 3);
    assert_eq!(global.colors.get("lf-cpp-1").map(String::as_str), Some("2"));
    assert_eq!(
        global.names.get("savina-akka-default").map(String::as_str),
        Some("Akka (default config)")
    );
}

#[test]
fn test_relative_paths_resolve_against_base() {
    let mut config = BenchConfig::from_toml_str(COUNTING_TOML)
        .unwrap()
        .with_results_dir("out");
    config.working_dir = Some("benchmarks".into());

    let resolved = config.resolve("/bench").unwrap();

    assert_eq!(resolved.results_dir, Path::new("/bench/out"));
    assert_eq!(
        resolved.experiments[0].working_dir(),
        Some(Path::new("/bench/benchmarks"))
    );
}

#[test]
fn test_unknown_strategy_is_fatal() {
    let toml = COUNTING_TOML.replace("parser = \"savina\"", "parser = \"parserRust\"");
    let err = BenchConfig::from_toml_str(&toml).unwrap().resolve(".").unwrap_err();

    match err {
        ConfigError::UnknownStrategy { experiment, source } => {
            assert_eq!(experiment, "PingPong");
            assert_eq!(source.role, "parser");
            assert_eq!(source.name, "parserRust");
        }
        other => panic!("expected unknown strategy, got {other:?}"),
    }
}

#[test]
fn test_variant_without_parser_is_fatal() {
    let config = BenchConfig::new().with_experiment(
        ExperimentConfig::new("Counting").with_sequence(
            SequenceConfig::new("1").with_variant("lf-cpp-1", vec![StepConfig::argv(["bin/Run"])]),
        ),
    );

    let err = config.resolve(".").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingStrategy { role: "parser", .. }
    ));
}

#[test]
fn test_variant_without_summarizer_is_fatal() {
    let config = BenchConfig::new()
        .with_defaults(
            ExperimentDefaults::default().with_variant("lf-cpp-1", VariantSettings::parser("lf_cpp")),
        )
        .with_experiment(ExperimentConfig::new("Counting").with_sequence(
            SequenceConfig::new("1").with_variant("lf-cpp-1", vec![StepConfig::argv(["bin/Run"])]),
        ));

    let err = config.resolve(".").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingStrategy {
            role: "summarizer",
            ..
        }
    ));
}

fn single_variant(steps: Vec<StepConfig>) -> BenchConfig {
    BenchConfig::new()
        .with_defaults(
            ExperimentDefaults::default()
                .with_summarizer("median_warmup")
                .with_variant("lf-cpp-1", VariantSettings::parser("lf_cpp")),
        )
        .with_experiment(
            ExperimentConfig::new("Counting")
                .with_sequence(SequenceConfig::new("1").with_variant("lf-cpp-1", steps)),
        )
}

#[test]
fn test_empty_pipeline_is_fatal() {
    let err = single_variant(vec![]).resolve(".").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Definition(DefinitionError::EmptyPipeline { .. })
    ));
}

#[test]
fn test_empty_argv_is_fatal() {
    let err = single_variant(vec![StepConfig::argv(["lfc"]), StepConfig::Argv(vec![])])
        .resolve(".")
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Definition(DefinitionError::EmptyProgram { step: 2, .. })
    ));
}

#[test]
fn test_warmup_must_leave_samples() {
    let mut config = single_variant(vec![StepConfig::argv(["bin/Run"])]);
    config.defaults = config.defaults.with_iterations(2).with_warmup(2);

    let err = config.resolve(".").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Definition(DefinitionError::WarmupTooLarge { .. })
    ));
}

#[test]
fn test_asymmetric_sequences_are_fatal() {
    let toml = COUNTING_TOML.replacen(
        "[[experiments]]\nid = \"PingPong\"",
        "[[experiments.sequences]]\nid = \"2\"\n[experiments.sequences.variants]\n\"lf-cpp-1\" = [[\"bin/CountingBenchmark\"]]\n\n[[experiments]]\nid = \"PingPong\"",
        1,
    );
    let err = BenchConfig::from_toml_str(&toml).unwrap().resolve(".").unwrap_err();

    assert!(matches!(
        err,
        ConfigError::Definition(DefinitionError::AsymmetricVariants { .. })
    ));
}

#[test]
fn test_duplicate_experiment_is_fatal() {
    let config = single_variant(vec![StepConfig::argv(["bin/Run"])]);
    let duplicate = config.experiments[0].clone();
    let err = config.with_experiment(duplicate).resolve(".").unwrap_err();

    assert!(matches!(err, ConfigError::DuplicateExperiment(id) if id == "Counting"));
}

#[test]
fn test_reserved_experiment_id_is_fatal() {
    let mut config = single_variant(vec![StepConfig::argv(["bin/Run"])]);
    config.experiments[0].id = "summary".to_string();

    let err = config.resolve(".").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Definition(DefinitionError::InvalidId { .. })
    ));
}

#[test]
fn test_experiment_id_with_separator_is_fatal() {
    let mut config = single_variant(vec![StepConfig::argv(["bin/Run"])]);
    config.experiments[0].id = "../escape".to_string();

    let err = config.resolve(".").unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Definition(DefinitionError::InvalidId { .. })
    ));
}

#[test]
fn test_plot_command_is_an_argv() {
    let toml = format!(
        "plot_command = [\"/opt/my tools/gnuplot\", \"-c\"]\n{}",
        COUNTING_TOML
    );
    let resolved = BenchConfig::from_toml_str(&toml)
        .unwrap()
        .resolve("/bench")
        .unwrap();

    let command = resolved.plot_command.unwrap();
    assert_eq!(command.program, "/opt/my tools/gnuplot");
    assert_eq!(command.args, vec!["-c"]);
}

#[test]
fn test_plot_command_table_form() {
    let config = single_variant(vec![StepConfig::argv(["bin/Run"])]).with_plot_command(
        StepConfig::Command {
            program: "gnuplot".to_string(),
            args: vec![],
        },
    );

    let resolved = config.resolve(".").unwrap();
    assert_eq!(resolved.plot_command.unwrap().program, "gnuplot");
}

#[test]
fn test_empty_plot_command_is_fatal() {
    let config =
        single_variant(vec![StepConfig::argv(["bin/Run"])]).with_plot_command(StepConfig::Argv(vec![]));

    assert!(matches!(
        config.resolve(".").unwrap_err(),
        ConfigError::Invalid(_)
    ));
}

#[test]
fn test_select_experiments() {
    let selected = resolved().select(&["PingPong"]).unwrap();
    assert_eq!(selected.experiments.len(), 1);
    assert_eq!(selected.experiments[0].id(), "PingPong");

    assert_eq!(resolved().select::<&str>(&[]).unwrap().experiments.len(), 2);

    let err = resolved().select(&["Fibonacci"]).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownExperiment(name) if name == "Fibonacci"));
}

#[test]
fn test_load_picks_format_from_extension() {
    let dir = tempfile::tempdir().unwrap();
    let toml_path = dir.path().join("bench.toml");
    std::fs::write(&toml_path, COUNTING_TOML).unwrap();
    let yaml_path = dir.path().join("bench.yml");
    std::fs::write(
        &yaml_path,
        "results_dir: plots\nexperiments: []\n",
    )
    .unwrap();

    let from_toml = ResolvedConfig::load(&toml_path).unwrap();
    assert_eq!(from_toml.experiments.len(), 2);
    assert_eq!(from_toml.results_dir, dir.path().join("results"));
    assert_eq!(from_toml.experiments[0].working_dir(), Some(dir.path()));

    let from_yaml = ResolvedConfig::load(&yaml_path).unwrap();
    assert!(from_yaml.experiments.is_empty());
    assert_eq!(from_yaml.results_dir, dir.path().join("plots"));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = BenchConfig::load("/nonexistent/benchforge.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
