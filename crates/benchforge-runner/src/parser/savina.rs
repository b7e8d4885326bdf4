//! Savina/Akka benchmark harness report.

use benchforge_core::{ParseError, SampleSet};

use super::{exact_count, parse_measurement, SampleParser};

const COUNT_PREFIX: &str = "Total executions";

/// Parses `Iteration-<i>: <value> <unit>` lines and cross-checks them against
/// the report's `Total executions = <N>` line.
///
/// The declared total is checked before the configured iteration count, so
/// a truncated report is reported as [`ParseError::CountMismatch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SavinaParser;

impl SampleParser for SavinaParser {
    fn parse(&self, output: &str, iterations: usize) -> Result<SampleSet, ParseError> {
        let mut samples = Vec::with_capacity(iterations);
        let mut declared = None;

        for (index, line) in output.lines().enumerate() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("Iteration-") {
                let Some((_, measurement)) = rest.split_once(':') else {
                    continue;
                };
                samples.push(parse_measurement(index + 1, measurement)?);
            } else if let Some(rest) = line.strip_prefix(COUNT_PREFIX) {
                let count = rest.trim_start().trim_start_matches('=').trim();
                declared = Some(count.parse::<usize>().map_err(|_| {
                    ParseError::MalformedSample {
                        line: index + 1,
                        text: line.to_string(),
                    }
                })?);
            }
        }

        match declared {
            None => Err(ParseError::MissingCount),
            Some(declared) if declared != samples.len() => Err(ParseError::CountMismatch {
                declared,
                found: samples.len(),
            }),
            Some(_) => exact_count(samples, iterations),
        }
    }
}
