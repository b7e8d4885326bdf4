//! Lingua Franca C runtime output.

use benchforge_core::{ParseError, SampleSet};

use super::{exact_count, parse_measurement, SampleParser};

/// Parses `Iteration <n> - <value> <unit>` lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LfCParser;

impl SampleParser for LfCParser {
    fn parse(&self, output: &str, iterations: usize) -> Result<SampleSet, ParseError> {
        let mut samples = Vec::with_capacity(iterations);
        for (index, line) in output.lines().enumerate() {
            let Some(rest) = line.trim_start().strip_prefix("Iteration ") else {
                continue;
            };
            let Some((counter, measurement)) = rest.split_once(" - ") else {
                continue;
            };
            if counter.trim().parse::<u64>().is_err() {
                continue;
            }
            samples.push(parse_measurement(index + 1, measurement)?);
        }
        exact_count(samples, iterations)
    }
}
