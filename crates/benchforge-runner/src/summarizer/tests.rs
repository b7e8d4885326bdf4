//! Tests for summarizers.

use proptest::prelude::*;

use super::*;

fn summarize(kind: SummarizerKind, samples: &[f64], warmup: usize) -> Result<SummaryValue, SummaryError> {
    SummarizerStrategy::from(kind).summarize(&SampleSet::new(samples.to_vec()), warmup)
}

#[test]
fn test_median_even_length_averages_central_values() {
    let summary = summarize(SummarizerKind::MedianWarmup, &[10.0, 20.0, 30.0, 40.0], 0).unwrap();
    assert_eq!(summary.value, 25.0);
    assert_eq!(summary.samples_used, 4);
}

#[test]
fn test_median_discards_warmup() {
    let summary = summarize(SummarizerKind::MedianWarmup, &[100.0, 50.0, 48.0, 50.0, 51.0], 1).unwrap();
    assert_eq!(summary.value, 50.0);
    assert_eq!(summary.spread.map(|s| (s.low, s.high)), Some((48.0, 51.0)));
}

#[test]
fn test_median_of_counting_run() {
    let summary = summarize(SummarizerKind::MedianWarmup, &[120.0, 100.0, 98.0, 101.0], 1).unwrap();
    assert_eq!(summary.value, 100.0);
    assert_eq!(summary.samples_used, 3);
}

#[test]
fn test_warmup_consuming_everything_is_insufficient() {
    for kind in SummarizerKind::ALL {
        assert_eq!(
            summarize(*kind, &[1.0, 2.0], 2),
            Err(SummaryError::InsufficientSamples {
                available: 2,
                warmup: 2
            }),
            "{kind}"
        );
    }
}

#[test]
fn test_empty_samples_are_insufficient() {
    assert_eq!(
        summarize(SummarizerKind::MinWarmup, &[], 0),
        Err(SummaryError::InsufficientSamples {
            available: 0,
            warmup: 0
        })
    );
}

#[test]
fn test_non_finite_sample_is_rejected() {
    assert_eq!(
        summarize(SummarizerKind::MeanWarmup, &[1.0, 2.0, f64::NAN], 1),
        Err(SummaryError::NonFiniteSample { index: 2 })
    );
}

#[test]
fn test_non_finite_warmup_sample_is_ignored() {
    let summary = summarize(SummarizerKind::MedianWarmup, &[f64::INFINITY, 2.0], 1).unwrap();
    assert_eq!(summary.value, 2.0);
}

#[test]
fn test_mean_reports_stddev_spread() {
    let summary = summarize(SummarizerKind::MeanWarmup, &[0.0, 2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 1).unwrap();
    assert_eq!(summary.value, 5.0);
    let spread = summary.spread.unwrap();
    assert!((spread.low - 3.0).abs() < 1e-12);
    assert!((spread.high - 7.0).abs() < 1e-12);
}

#[test]
fn test_trimmed_mean_drops_outliers() {
    let mut samples = vec![1000.0];
    samples.extend([1.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 500.0]);

    let summary = summarize(SummarizerKind::TrimmedMeanWarmup, &samples, 1).unwrap();

    assert_eq!(summary.value, 10.0);
    assert_eq!(summary.samples_used, 8);
    assert_eq!(summary.spread.map(|s| (s.low, s.high)), Some((10.0, 10.0)));
}

#[test]
fn test_trimmed_mean_short_run_is_untrimmed() {
    let summary = summarize(SummarizerKind::TrimmedMeanWarmup, &[9.0, 1.0, 2.0, 6.0], 1).unwrap();
    assert_eq!(summary.value, 3.0);
    assert_eq!(summary.samples_used, 3);
}

#[test]
fn test_min_has_no_spread() {
    let summary = summarize(SummarizerKind::MinWarmup, &[1.0, 7.0, 3.0, 5.0], 1).unwrap();
    assert_eq!(summary.value, 3.0);
    assert_eq!(summary.spread, None);
}

#[test]
fn test_strategy_kind_round_trips() {
    for kind in SummarizerKind::ALL {
        assert_eq!(SummarizerStrategy::from(*kind).kind(), *kind);
    }
    assert_eq!(SummarizerStrategy::default().kind(), SummarizerKind::MedianWarmup);
}

fn kinds() -> impl Strategy<Value = SummarizerKind> {
    prop::sample::select(SummarizerKind::ALL.to_vec())
}

proptest! {
    /// Reordering the post-warm-up samples never changes the summary.
    #[test]
    fn prop_summary_is_order_invariant(
        kind in kinds(),
        warmup in prop::collection::vec(0.0f64..1e6, 0..3),
        retained in prop::collection::vec(0.0f64..1e6, 1..24),
        seed in any::<u64>(),
    ) {
        let mut shuffled = retained.clone();
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);
        if seed % 2 == 0 {
            shuffled.reverse();
        }

        let mut original = warmup.clone();
        original.extend(&retained);
        let mut reordered = warmup.clone();
        reordered.extend(&shuffled);

        let a = summarize(kind, &original, warmup.len()).unwrap();
        let b = summarize(kind, &reordered, warmup.len()).unwrap();
        prop_assert_eq!(a, b);
    }

    /// The summary value lies within the retained samples' range.
    #[test]
    fn prop_summary_within_sample_range(
        kind in kinds(),
        samples in prop::collection::vec(-1e6f64..1e6, 2..32),
    ) {
        let summary = summarize(kind, &samples, 1).unwrap();
        let retained = &samples[1..];
        let low = retained.iter().copied().fold(f64::INFINITY, f64::min);
        let high = retained.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(summary.value >= low - 1e-6 && summary.value <= high + 1e-6);
    }
}
