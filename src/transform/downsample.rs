use std::collections::BTreeSet;

use crate::config::ImportConfig;
use crate::model::TemperatureSample;

/// Reduce a sample series for storage.
///
/// A sample is retained when any of these holds:
/// - its position is a multiple of `N = max(1, total / target_cap)`
/// - its primary or secondary reading moved more than `significant_change`
///   from the last retained sample (a reading appearing or disappearing counts)
/// - its position is listed in `keep_always` (milestone samples)
///
/// Order is preserved and no sample is retained twice.
pub fn downsample(
    samples: &[TemperatureSample],
    keep_always: &[usize],
    config: &ImportConfig,
) -> Vec<TemperatureSample> {
    let stride = config.stride(samples.len());
    let pinned: BTreeSet<usize> = keep_always.iter().copied().collect();

    let mut retained: Vec<TemperatureSample> = Vec::with_capacity(samples.len() / stride + pinned.len());
    for (i, sample) in samples.iter().enumerate() {
        let keep = i % stride == 0
            || pinned.contains(&i)
            || retained.last().map_or(true, |last| {
                moved(last.primary, sample.primary, config.significant_change)
                    || moved(last.secondary, sample.secondary, config.significant_change)
            });
        if keep {
            retained.push(sample.clone());
        }
    }
    retained
}

fn moved(from: Option<f64>, to: Option<f64>, threshold: f64) -> bool {
    match (from, to) {
        (Some(a), Some(b)) => (b - a).abs() > threshold,
        (None, None) => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Provenance, RoastId};
    use proptest::prelude::*;

    fn series(primary: &[f64]) -> Vec<TemperatureSample> {
        let rid = RoastId::new("ds").unwrap();
        primary
            .iter()
            .enumerate()
            .map(|(i, p)| TemperatureSample::new(rid.clone(), i as f64, Some(*p), Some(200.0), Provenance::Imported))
            .collect()
    }

    fn times(samples: &[TemperatureSample]) -> Vec<f64> {
        samples.iter().map(|s| s.time_s).collect()
    }

    #[test]
    fn test_small_series_kept_whole() {
        let s = series(&[150.0; 50]);
        assert_eq!(downsample(&s, &[], &ImportConfig::default()).len(), 50);
    }

    #[test]
    fn test_stride_and_pinned() {
        let config = ImportConfig {
            target_cap: 10,
            ..ImportConfig::default()
        };
        let s = series(&[150.0; 40]);
        let kept = downsample(&s, &[5, 8, 8], &config);
        assert_eq!(times(&kept), vec![0.0, 4.0, 5.0, 8.0, 12.0, 16.0, 20.0, 24.0, 28.0, 32.0, 36.0]);
    }

    #[test]
    fn test_significant_change_against_last_retained() {
        let config = ImportConfig {
            target_cap: 1,
            ..ImportConfig::default()
        };
        // drift of 1.0 per sample: kept whenever 3 samples have passed
        let s = series(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0, 107.0]);
        let kept = downsample(&s, &[], &config);
        assert_eq!(times(&kept), vec![0.0, 3.0, 6.0]);
    }

    #[test]
    fn test_reading_appearing_is_significant() {
        let config = ImportConfig {
            target_cap: 1,
            ..ImportConfig::default()
        };
        let mut s = series(&[100.0; 4]);
        s[0].primary = None;
        let kept = downsample(&s, &[], &config);
        assert_eq!(times(&kept), vec![0.0, 1.0]);
    }

    proptest! {
        #[test]
        fn prop_first_and_pinned_always_retained(
            primary in proptest::collection::vec(20.0f64..250.0, 1..400),
            cap in 1usize..100,
            pins in proptest::collection::vec(0usize..400, 0..8),
        ) {
            let s = series(&primary);
            let pins: Vec<usize> = pins.into_iter().filter(|p| *p < s.len()).collect();
            let config = ImportConfig { target_cap: cap, ..ImportConfig::default() };
            let kept = downsample(&s, &pins, &config);

            let kept_times = times(&kept);
            prop_assert_eq!(kept_times[0], 0.0);
            for p in pins {
                prop_assert!(kept_times.contains(&(p as f64)));
            }
            prop_assert!(kept_times.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
