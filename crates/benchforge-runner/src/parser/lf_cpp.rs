//! Lingua Franca C++ runtime output.

use benchforge_core::{ParseError, SampleSet};

use super::{exact_count, parse_measurement, SampleParser};

const MARKER: &str = "Duration:";

/// Parses `Iteration: <n>\t Duration: <value> <unit>` lines.
///
/// Only lines that start with `Iteration` and carry the `Duration:` marker
/// count; the trailing `Best Time` summary is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LfCppParser;

impl SampleParser for LfCppParser {
    fn parse(&self, output: &str, iterations: usize) -> Result<SampleSet, ParseError> {
        let mut samples = Vec::with_capacity(iterations);
        for (index, line) in output.lines().enumerate() {
            let line = line.trim_start();
            if !line.starts_with("Iteration") {
                continue;
            }
            if let Some(at) = line.find(MARKER) {
                samples.push(parse_measurement(index + 1, &line[at + MARKER.len()..])?);
            }
        }
        exact_count(samples, iterations)
    }
}
