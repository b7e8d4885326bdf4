//! Sample parsers.
//!
//! Each toolchain prints its per-iteration timings in its own format. A
//! [`SampleParser`] scans captured output for that format and returns exactly
//! the configured number of samples, in milliseconds.
//!
//! Runtime dispatch goes through [`ParserStrategy`], a closed enum resolved
//! from [`ParserKind`], so the orchestrator never looks parsers up by name.

mod lf_c;
mod lf_cpp;
mod savina;

use std::fmt::Debug;

use benchforge_core::{ParseError, ParserKind, SampleSet};

pub use lf_c::LfCParser;
pub use lf_cpp::LfCppParser;
pub use savina::SavinaParser;

/// Extracts timing samples from a program's captured output.
///
/// Parsing is pure text scanning: the same input always yields the same
/// result.
pub trait SampleParser: Send + Sync + Debug {
    /// Parses exactly `iterations` samples from `output`.
    fn parse(&self, output: &str, iterations: usize) -> Result<SampleSet, ParseError>;
}

/// Parser selected by a [`ParserKind`].
///
/// # Example
///
/// ```
/// use benchforge_core::ParserKind;
/// use benchforge_runner::{ParserStrategy, SampleParser};
///
/// let parser = ParserStrategy::from(ParserKind::LfCpp);
/// let output = "Iteration: 1\t Duration: 120 msec\nIteration: 2\t Duration: 0.1 sec\n";
/// let samples = parser.parse(output, 2).unwrap();
///
/// assert_eq!(samples.as_slice(), &[120.0, 100.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserStrategy {
    LfCpp(LfCppParser),
    LfC(LfCParser),
    Savina(SavinaParser),
}

impl ParserStrategy {
    /// Returns the identifier this strategy was built from.
    pub fn kind(&self) -> ParserKind {
        match self {
            Self::LfCpp(_) => ParserKind::LfCpp,
            Self::LfC(_) => ParserKind::LfC,
            Self::Savina(_) => ParserKind::Savina,
        }
    }
}

impl From<ParserKind> for ParserStrategy {
    fn from(kind: ParserKind) -> Self {
        match kind {
            ParserKind::LfCpp => Self::LfCpp(LfCppParser),
            ParserKind::LfC => Self::LfC(LfCParser),
            ParserKind::Savina => Self::Savina(SavinaParser),
        }
    }
}

impl SampleParser for ParserStrategy {
    fn parse(&self, output: &str, iterations: usize) -> Result<SampleSet, ParseError> {
        match self {
            Self::LfCpp(p) => p.parse(output, iterations),
            Self::LfC(p) => p.parse(output, iterations),
            Self::Savina(p) => p.parse(output, iterations),
        }
    }
}

/// Parses `<value> [unit]` into milliseconds.
///
/// Durations are non-negative. `line` is the 1-based line number used in
/// error reports.
pub(crate) fn parse_measurement(line: usize, text: &str) -> Result<f64, ParseError> {
    let malformed = || ParseError::MalformedSample {
        line,
        text: text.trim().to_string(),
    };

    let trimmed = text.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let value: f64 = number.parse().map_err(|_| malformed())?;
    if !value.is_finite() || value < 0.0 {
        return Err(malformed());
    }

    match unit.trim() {
        "" | "ms" | "msec" => Ok(value),
        "ns" | "nsec" => Ok(value / 1e6),
        "us" | "usec" | "µs" => Ok(value / 1e3),
        "s" | "sec" => Ok(value * 1e3),
        _ => Err(malformed()),
    }
}

/// Checks the sample count against the configured iteration count.
pub(crate) fn exact_count(samples: Vec<f64>, expected: usize) -> Result<SampleSet, ParseError> {
    let found = samples.len();
    if found < expected {
        Err(ParseError::IncompleteSamples { expected, found })
    } else if found > expected {
        Err(ParseError::ExcessSamples { expected, found })
    } else {
        Ok(SampleSet::new(samples))
    }
}
