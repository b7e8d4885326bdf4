//! Median after warm-up.

use benchforge_core::{SampleSet, SummaryError, SummaryValue};

use super::{median_of, retained_sorted, Summarizer};

/// Median of the post-warm-up samples, with `(min, max)` as spread.
///
/// An even-length remainder yields the average of the two central values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MedianSummarizer;

impl Summarizer for MedianSummarizer {
    fn summarize(&self, samples: &SampleSet, warmup: usize) -> Result<SummaryValue, SummaryError> {
        let sorted = retained_sorted(samples, warmup)?;
        let (low, high) = (sorted[0], sorted[sorted.len() - 1]);
        Ok(SummaryValue::new(median_of(&sorted), sorted.len()).with_spread(low, high))
    }
}
