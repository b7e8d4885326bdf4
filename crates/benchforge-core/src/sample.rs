//! Timing samples and their summaries.

use serde::Serialize;

/// Ordered timings in milliseconds, one per iteration.
///
/// Immutable once produced by a parser.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SampleSet {
    samples: Vec<f64>,
}

impl SampleSet {
    /// Creates a sample set from millisecond timings in iteration order.
    ///
    /// # Example
    ///
    /// ```
    /// use benchforge_core::SampleSet;
    ///
    /// let samples = SampleSet::new(vec![120.0, 100.0, 98.0, 101.0]);
    /// assert_eq!(samples.len(), 4);
    /// assert_eq!(samples.after_warmup(1), &[100.0, 98.0, 101.0]);
    /// ```
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    /// Returns all samples in iteration order.
    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    /// Returns the samples left after discarding the first `warmup`.
    pub fn after_warmup(&self, warmup: usize) -> &[f64] {
        self.samples.get(warmup..).unwrap_or(&[])
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<Vec<f64>> for SampleSet {
    fn from(samples: Vec<f64>) -> Self {
        Self::new(samples)
    }
}

/// Lower and upper bound of a spread statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spread {
    pub low: f64,
    pub high: f64,
}

/// A single comparable statistic derived from a [`SampleSet`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryValue {
    /// The summary statistic in milliseconds.
    pub value: f64,
    /// Optional spread around `value`.
    pub spread: Option<Spread>,
    /// Number of samples that contributed after warm-up discard.
    pub samples_used: usize,
}

impl SummaryValue {
    /// Creates a summary without a spread statistic.
    pub fn new(value: f64, samples_used: usize) -> Self {
        Self {
            value,
            spread: None,
            samples_used,
        }
    }

    /// Attaches a spread statistic.
    pub fn with_spread(mut self, low: f64, high: f64) -> Self {
        self.spread = Some(Spread { low, high });
        self
    }
}
