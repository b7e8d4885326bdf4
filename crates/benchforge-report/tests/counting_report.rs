//! Counting experiment from execution to artifacts.

use std::fs;

use benchforge_core::{GlobalPlot, PipelineStep};
use benchforge_report::{PlotValue, ReportBuilder, ReportWriter};
use benchforge_runner::Orchestrator;
use benchforge_test::{counting_experiment, lf_cpp_output, Reply, ScriptedExecutor};

fn failing_build_executor() -> ScriptedExecutor {
    ScriptedExecutor::new()
        .on_command_replies(
            &["lfc", "Savina/count/CountingBenchmark.lf"],
            vec![
                Reply::success(),
                Reply::exit(1).with_stderr("lfc: error: unresolved reactor"),
            ],
        )
        .on_program(
            "bin/CountingBenchmark",
            Reply::stdout(lf_cpp_output(&[120.0, 100.0, 98.0, 101.0])),
        )
}

#[test]
fn failed_variant_is_flagged_absent() {
    let experiment = counting_experiment();
    let table = Orchestrator::new(failing_build_executor())
        .run_experiment(&experiment)
        .unwrap();

    let plot = ReportBuilder::build(&experiment, &table);

    assert_eq!(plot.entries.len(), 2);
    assert_eq!(plot.present_count(), 1);
    assert_eq!(plot.absent_count(), 1);
    assert_eq!(plot.entry("1", "lf-cpp-1").unwrap().value.value(), Some(100.0));
    match &plot.entry("1", "lf-cpp-4").unwrap().value {
        PlotValue::Absent { reason } => assert!(reason.contains("step 1"), "{reason}"),
        other => panic!("expected absent entry, got {other:?}"),
    }
}

#[test]
fn artifacts_and_plot_command() {
    let dir = tempfile::tempdir().unwrap();
    let experiment = counting_experiment();
    let executor = failing_build_executor();
    let table = Orchestrator::new(&executor)
        .run_experiment(&experiment)
        .unwrap();

    let writer = ReportWriter::new(dir.path()).with_plot_command(PipelineStep::new("gnuplot"));
    let written = writer
        .write_all(&[(&experiment, &table)], &GlobalPlot::default())
        .unwrap();
    let rendered = writer.render(&executor, &written);

    assert_eq!(rendered, 2);
    assert_eq!(executor.calls_to("gnuplot"), 2);

    let data = fs::read_to_string(dir.path().join("Counting.dat")).unwrap();
    assert!(data.contains("\"1\"\tNaN\t100"));
    let csv = fs::read_to_string(dir.path().join("Counting.csv")).unwrap();
    assert!(csv.contains("Counting,1,lf-cpp-4,failed,,,,,pipeline_failed,"));
    let json = fs::read_to_string(dir.path().join("global.json")).unwrap();
    assert!(json.contains("\"x_labels\": [\n    \"Counting\"\n  ]"));
}
