//! Best run after warm-up.

use benchforge_core::{SampleSet, SummaryError, SummaryValue};

use super::{retained_sorted, Summarizer};

/// Fastest post-warm-up sample. Reports no spread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinSummarizer;

impl Summarizer for MinSummarizer {
    fn summarize(&self, samples: &SampleSet, warmup: usize) -> Result<SummaryValue, SummaryError> {
        let sorted = retained_sorted(samples, warmup)?;
        Ok(SummaryValue::new(sorted[0], sorted.len()))
    }
}
