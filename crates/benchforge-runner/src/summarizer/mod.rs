//! Summarizers reduce a sample set to one comparable statistic.
//!
//! Every summarizer first discards the warm-up samples, then rejects an
//! empty remainder and non-finite values before computing its statistic.

mod mean;
mod median;
mod min;

use std::fmt::Debug;

use benchforge_core::{SampleSet, SummarizerKind, SummaryError, SummaryValue};

pub use mean::{MeanSummarizer, TrimmedMeanSummarizer};
pub use median::MedianSummarizer;
pub use min::MinSummarizer;

/// Reduces samples to a [`SummaryValue`].
pub trait Summarizer: Send + Sync + Debug {
    /// Summarizes `samples` after discarding the first `warmup`.
    fn summarize(&self, samples: &SampleSet, warmup: usize) -> Result<SummaryValue, SummaryError>;
}

/// Summarizer selected by a [`SummarizerKind`].
///
/// # Example
///
/// ```
/// use benchforge_core::{SampleSet, SummarizerKind};
/// use benchforge_runner::{Summarizer, SummarizerStrategy};
///
/// let summarizer = SummarizerStrategy::from(SummarizerKind::MedianWarmup);
/// let samples = SampleSet::new(vec![100.0, 50.0, 48.0, 50.0, 51.0]);
///
/// let summary = summarizer.summarize(&samples, 1).unwrap();
/// assert_eq!(summary.value, 50.0);
/// assert_eq!(summary.samples_used, 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarizerStrategy {
    Median(MedianSummarizer),
    Mean(MeanSummarizer),
    TrimmedMean(TrimmedMeanSummarizer),
    Min(MinSummarizer),
}

impl SummarizerStrategy {
    /// Returns the identifier this strategy was built from.
    pub fn kind(&self) -> SummarizerKind {
        match self {
            Self::Median(_) => SummarizerKind::MedianWarmup,
            Self::Mean(_) => SummarizerKind::MeanWarmup,
            Self::TrimmedMean(_) => SummarizerKind::TrimmedMeanWarmup,
            Self::Min(_) => SummarizerKind::MinWarmup,
        }
    }
}

impl Default for SummarizerStrategy {
    fn default() -> Self {
        SummarizerKind::default().into()
    }
}

impl From<SummarizerKind> for SummarizerStrategy {
    fn from(kind: SummarizerKind) -> Self {
        match kind {
            SummarizerKind::MedianWarmup => Self::Median(MedianSummarizer),
            SummarizerKind::MeanWarmup => Self::Mean(MeanSummarizer),
            SummarizerKind::TrimmedMeanWarmup => Self::TrimmedMean(TrimmedMeanSummarizer::default()),
            SummarizerKind::MinWarmup => Self::Min(MinSummarizer),
        }
    }
}

impl Summarizer for SummarizerStrategy {
    fn summarize(&self, samples: &SampleSet, warmup: usize) -> Result<SummaryValue, SummaryError> {
        match self {
            Self::Median(s) => s.summarize(samples, warmup),
            Self::Mean(s) => s.summarize(samples, warmup),
            Self::TrimmedMean(s) => s.summarize(samples, warmup),
            Self::Min(s) => s.summarize(samples, warmup),
        }
    }
}

/// Returns the post-warm-up samples sorted ascending.
pub(crate) fn retained_sorted(samples: &SampleSet, warmup: usize) -> Result<Vec<f64>, SummaryError> {
    let retained = samples.after_warmup(warmup);
    if retained.is_empty() {
        return Err(SummaryError::InsufficientSamples {
            available: samples.len(),
            warmup,
        });
    }
    if let Some(offset) = retained.iter().position(|v| !v.is_finite()) {
        return Err(SummaryError::NonFiniteSample {
            index: warmup + offset,
        });
    }
    let mut sorted = retained.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(sorted)
}

/// Median of a non-empty ascending slice.
pub(crate) fn median_of(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Mean of an ascending slice. Summing in sorted order keeps the result
/// independent of the original sample order.
pub(crate) fn mean_of(sorted: &[f64]) -> f64 {
    sorted.iter().sum::<f64>() / sorted.len() as f64
}

#[cfg(test)]
mod tests;
