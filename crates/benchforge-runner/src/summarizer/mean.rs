//! Mean-based summarizers.

use benchforge_core::{SampleSet, SummaryError, SummaryValue};

use super::{mean_of, retained_sorted, Summarizer};

/// Arithmetic mean with `mean ± stddev` as spread.
///
/// The standard deviation is the population deviation of the retained
/// samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeanSummarizer;

impl Summarizer for MeanSummarizer {
    fn summarize(&self, samples: &SampleSet, warmup: usize) -> Result<SummaryValue, SummaryError> {
        let sorted = retained_sorted(samples, warmup)?;
        let mean = mean_of(&sorted);
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / sorted.len() as f64;
        let stddev = variance.sqrt();
        Ok(SummaryValue::new(mean, sorted.len()).with_spread(mean - stddev, mean + stddev))
    }
}

/// Mean after dropping `percent`% of the retained samples at each end.
///
/// The trim count rounds down, so short runs are not trimmed at all. The
/// spread is `(min, max)` of the samples that survived trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimmedMeanSummarizer {
    percent: u8,
}

impl TrimmedMeanSummarizer {
    /// Creates a summarizer trimming `percent`% at each end (clamped below 50).
    pub fn new(percent: u8) -> Self {
        Self {
            percent: percent.min(49),
        }
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }
}

impl Default for TrimmedMeanSummarizer {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Summarizer for TrimmedMeanSummarizer {
    fn summarize(&self, samples: &SampleSet, warmup: usize) -> Result<SummaryValue, SummaryError> {
        let sorted = retained_sorted(samples, warmup)?;
        let trim = sorted.len() * usize::from(self.percent) / 100;
        let kept = &sorted[trim..sorted.len() - trim];
        Ok(SummaryValue::new(mean_of(kept), kept.len()).with_spread(kept[0], kept[kept.len() - 1]))
    }
}
