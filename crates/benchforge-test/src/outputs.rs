//! Canned benchmark output, one builder per toolchain convention.

use std::fmt::Write as _;

/// Output of a Lingua Franca C++ benchmark binary.
///
/// Includes the trailing summary block, whose lines must not be mistaken
/// for iteration samples.
pub fn lf_cpp_output(durations_ms: &[f64]) -> String {
    let mut out = String::from("Benchmark: CountingBenchmark\nSystem information\nO/S Name: Linux\n");
    for (i, ms) in durations_ms.iter().enumerate() {
        writeln!(out, "Iteration: {}\t Duration: {} msec", i + 1, ms).unwrap();
    }
    out.push_str("Exec summary\n");
    if let Some(best) = durations_ms.iter().copied().reduce(f64::min) {
        writeln!(out, "Best Time: {} msec", best).unwrap();
    }
    out
}

/// Output of a Lingua Franca C benchmark binary.
pub fn lf_c_output(durations_ms: &[f64]) -> String {
    let mut out = String::from("---- Start execution at time Thu Jan  1 00:00:00 1970\n");
    for (i, ms) in durations_ms.iter().enumerate() {
        writeln!(out, "Iteration {} - {:.6} ms", i + 1, ms).unwrap();
    }
    out.push_str("---- Elapsed logical time (in nsec): 0\n");
    out
}

/// Output of the Savina/Akka benchmark harness.
///
/// The report lists one `Iteration-<i>` line per execution and declares the
/// total in its summary block.
pub fn savina_output(durations_ms: &[f64]) -> String {
    let mut out = String::from(
        "Runtime: Java HotSpot(TM) 64-Bit Server VM\nBenchmark: CountingAkkaActorBenchmark\nArgs: \n",
    );
    for (i, ms) in durations_ms.iter().enumerate() {
        writeln!(out, "           Iteration-{}: {:>10.3} ms", i, ms).unwrap();
    }
    out.push_str("Execution - Summary: \n");
    writeln!(out, "   Total executions  = {}", durations_ms.len()).unwrap();
    if let Some(first) = durations_ms.first() {
        writeln!(out, "   First execution   = {:.3} ms", first).unwrap();
    }
    out
}
