//! Tests for the experiment orchestrator.

use benchforge_core::{FailureKind, ParserKind, SummarizerKind};
use benchforge_test::{counting_experiment, lf_c_output, lf_cpp_output, Reply, ScriptedExecutor};

use super::*;

const COUNTING_RUN: &str = "bin/CountingBenchmark";

fn two_sequence_experiment() -> Experiment {
    let run = |threads: &str| {
        vec![PipelineStep::new("bin/PingPong").args(["--threads", threads])]
    };
    Experiment::new("PingPong")
        .with_iterations(3)
        .with_warmup(1)
        .with_variant(VariantSpec::new("lf-c-1", ParserKind::LfC))
        .with_variant(
            VariantSpec::new("lf-c-2", ParserKind::LfC).with_summarizer(SummarizerKind::MinWarmup),
        )
        .with_sequence(
            Sequence::new("1000")
                .with_pipeline("lf-c-1", run("1"))
                .with_pipeline("lf-c-2", run("2")),
        )
        .with_sequence(
            Sequence::new("2000")
                .with_pipeline("lf-c-1", run("1"))
                .with_pipeline("lf-c-2", run("2")),
        )
}

#[test]
fn test_every_cell_is_recorded() {
    let executor = ScriptedExecutor::new()
        .on_program("bin/PingPong", Reply::stdout(lf_c_output(&[9.0, 4.0, 6.0])));
    let orchestrator = Orchestrator::new(executor);

    let table = orchestrator.run_experiment(&two_sequence_experiment()).unwrap();

    assert!(table.is_complete());
    assert_eq!(table.recorded_count(), 4);
    assert_eq!(table.failed_count(), 0);
    assert_eq!(table.value("1000", "lf-c-1").map(|v| v.value), Some(5.0));
    assert_eq!(table.value("2000", "lf-c-2").map(|v| v.value), Some(4.0));
    assert_eq!(orchestrator.executor().call_count(), 4);
}

#[test]
fn test_build_failure_is_recorded_and_run_continues() {
    let executor = ScriptedExecutor::new()
        .on_command_replies(
            &["lfc", "Savina/count/CountingBenchmark.lf"],
            vec![Reply::success(), Reply::exit(1).with_stderr("lfc: error")],
        )
        .on_program(COUNTING_RUN, Reply::stdout(lf_cpp_output(&[120.0, 100.0, 98.0, 101.0])));
    let orchestrator = Orchestrator::new(executor);

    let table = orchestrator.run_experiment(&counting_experiment()).unwrap();

    assert_eq!(table.value("1", "lf-cpp-1").map(|v| v.value), Some(100.0));
    let failure = table.get("1", "lf-cpp-4").and_then(Cell::failure).unwrap();
    assert_eq!(failure.kind, FailureKind::PipelineFailed);
    assert_eq!(failure.phase, VariantPhase::Running);
    assert_eq!(failure.step_index, Some(1));
    assert_eq!(failure.exit_code, Some(1));
    assert_eq!(failure.raw_output.as_deref(), Some("lfc: error"));
    assert_eq!(orchestrator.executor().calls_to(COUNTING_RUN), 1);
}

#[test]
fn test_parse_failure_keeps_raw_output() {
    let executor = ScriptedExecutor::new().on_program(
        COUNTING_RUN,
        Reply::stdout(lf_cpp_output(&[120.0, 100.0]))
            .with_stderr("Fatal: scheduler stalled after 2 iterations"),
    );
    let orchestrator = Orchestrator::new(executor);

    let table = orchestrator.run_experiment(&counting_experiment()).unwrap();

    assert_eq!(table.failed_count(), 2);
    let failure = table.get("1", "lf-cpp-1").and_then(Cell::failure).unwrap();
    assert_eq!(failure.kind, FailureKind::Parse);
    assert!(failure.message.contains("found only 2"));
    let raw = failure.raw_output.as_deref().unwrap();
    assert!(raw.contains("Duration: 120 msec"));
    assert!(raw.ends_with("Fatal: scheduler stalled after 2 iterations"));
}

#[test]
fn test_launch_and_timeout_failures_are_classified() {
    let executor = ScriptedExecutor::new()
        .on_command(
            &["bin/PingPong", "--threads", "1"],
            Reply::LaunchFailure,
        )
        .on_command(
            &["bin/PingPong", "--threads", "2"],
            Reply::Timeout {
                stdout: "Iteration 1 - 9 ms\n".to_string(),
            },
        );
    let orchestrator = Orchestrator::new(executor);

    let table = orchestrator.run_experiment(&two_sequence_experiment()).unwrap();

    assert_eq!(table.failed_count(), 4);
    let launch = table.get("1000", "lf-c-1").and_then(Cell::failure).unwrap();
    assert_eq!(launch.kind, FailureKind::Launch);
    let timeout = table.get("2000", "lf-c-2").and_then(Cell::failure).unwrap();
    assert_eq!(timeout.kind, FailureKind::Timeout);
    assert_eq!(timeout.raw_output.as_deref(), Some("Iteration 1 - 9 ms\n"));
}

#[test]
fn test_repeat_run_step_runs_final_step_per_iteration() {
    let experiment = counting_experiment().with_repeat_run_step(true);
    let executor = ScriptedExecutor::new().on_program_replies(
        COUNTING_RUN,
        vec![
            Reply::stdout("Iteration: 1\t Duration: 120 msec\n"),
            Reply::stdout("Iteration: 1\t Duration: 100 msec\n"),
            Reply::stdout("Iteration: 1\t Duration: 98 msec\n"),
            Reply::stdout("Iteration: 1\t Duration: 101 msec\n"),
        ],
    );
    let orchestrator = Orchestrator::new(executor);

    let table = orchestrator.run_experiment(&experiment).unwrap();

    assert_eq!(table.value("1", "lf-cpp-1").map(|v| v.value), Some(100.0));
    assert_eq!(orchestrator.executor().calls_to("lfc"), 2);
    assert_eq!(orchestrator.executor().calls_to(COUNTING_RUN), 8);
}

#[test]
fn test_variant_iteration_override_drives_parser() {
    let experiment = Experiment::new("Big")
        .with_iterations(3)
        .with_warmup(1)
        .with_variant(VariantSpec::new("lf-c-1", ParserKind::LfC).with_iterations(5))
        .with_sequence(
            Sequence::new("1").with_pipeline("lf-c-1", vec![PipelineStep::new("bin/Big")]),
        );
    let executor = ScriptedExecutor::new()
        .on_program("bin/Big", Reply::stdout(lf_c_output(&[50.0, 1.0, 2.0, 3.0, 4.0])));

    let table = Orchestrator::new(executor).run_experiment(&experiment).unwrap();

    let summary = table.value("1", "lf-c-1").unwrap();
    assert_eq!(summary.value, 2.5);
    assert_eq!(summary.samples_used, 4);
}

#[test]
fn test_invalid_definition_runs_nothing() {
    let experiment = counting_experiment().with_warmup(4);
    let orchestrator = Orchestrator::new(ScriptedExecutor::new());

    let err = orchestrator.run_experiment(&experiment).unwrap_err();

    assert!(matches!(err, DefinitionError::WarmupTooLarge { .. }));
    assert_eq!(orchestrator.executor().call_count(), 0);
}
