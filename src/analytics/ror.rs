use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::model::{MilestoneKind, MilestoneSet, TemperatureSample};

use super::smoothing::centered_mean;

/// One rate-of-rise value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RorPoint {
    /// Time of the later of the two differentiated points, seconds
    pub time_s: f64,
    /// Degrees per minute
    pub rate_per_min: f64,
}

/// Rate-of-rise curve of the primary temperature.
///
/// Pipeline:
/// 1. keep samples with a strictly positive primary temperature
/// 2. centered mean over `pre_window` points
/// 3. difference consecutive smoothed points (degrees per minute)
/// 4. admit rates inside `[charge, drop]`, strictly positive and at most the ceiling
/// 5. centered mean over `post_window` admitted rates
///
/// Returns an empty curve when fewer than `pre_window` rates are admitted.
pub fn rate_of_rise(
    samples: &[TemperatureSample],
    milestones: &MilestoneSet,
    config: &AnalyticsConfig,
) -> Vec<RorPoint> {
    let (times, temps): (Vec<f64>, Vec<f64>) = samples
        .iter()
        .filter_map(|s| s.primary.filter(|p| *p > 0.0).map(|p| (s.time_s, p)))
        .unzip();

    let smoothed = centered_mean(&temps, config.pre_window);

    let window_start = milestones.time_s(MilestoneKind::Charge).unwrap_or(f64::NEG_INFINITY);
    let window_end = milestones.time_s(MilestoneKind::Drop).unwrap_or(f64::INFINITY);

    let mut admitted_times = Vec::new();
    let mut admitted_rates = Vec::new();
    for k in 1..smoothed.len() {
        let elapsed_min = (times[k] - times[k - 1]) / 60.0;
        if elapsed_min <= 0.0 {
            continue;
        }
        let rate = (smoothed[k] - smoothed[k - 1]) / elapsed_min;
        let time = times[k];
        if time < window_start || time > window_end {
            continue;
        }
        if rate > 0.0 && rate <= config.ceiling_per_min {
            admitted_times.push(time);
            admitted_rates.push(rate);
        }
    }

    if admitted_rates.len() < config.pre_window {
        return Vec::new();
    }

    let rates = centered_mean(&admitted_rates, config.post_window);
    admitted_times
        .into_iter()
        .zip(rates)
        .map(|(time_s, rate_per_min)| RorPoint { time_s, rate_per_min })
        .collect()
}

/// Point estimate of the rate of rise at sample `index`, against the sample
/// `lookback` positions earlier.
///
/// `None` when there is not enough history, either reading is missing, the
/// elapsed time is not positive, or the rate exceeds the ceiling in magnitude.
pub fn rate_of_rise_at(
    samples: &[TemperatureSample],
    index: usize,
    config: &AnalyticsConfig,
) -> Option<f64> {
    let lookback = config.lookback.max(1);
    if index >= samples.len() || index < lookback {
        return None;
    }
    let earlier = &samples[index - lookback];
    let later = &samples[index];

    let elapsed_min = (later.time_s - earlier.time_s) / 60.0;
    if elapsed_min <= 0.0 {
        return None;
    }
    let rate = (later.primary? - earlier.primary?) / elapsed_min;
    (rate.abs() <= config.ceiling_per_min).then_some(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MilestoneMark, Provenance, RoastId};

    fn series(temps: &[f64], step_s: f64) -> Vec<TemperatureSample> {
        let rid = RoastId::new("ror").unwrap();
        temps
            .iter()
            .enumerate()
            .map(|(i, t)| {
                TemperatureSample::new(rid.clone(), i as f64 * step_s, Some(*t), None, Provenance::Live)
            })
            .collect()
    }

    #[test]
    fn test_steady_rise() {
        let temps: Vec<f64> = (0..120).map(|i| 100.0 + 0.1 * i as f64).collect();
        let ror = rate_of_rise(&series(&temps, 1.0), &MilestoneSet::new(), &AnalyticsConfig::default());
        assert_eq!(ror.len(), 119);
        // interior points see the full windows
        let mid = &ror[30..90];
        assert!(mid.iter().all(|p| (p.rate_per_min - 6.0).abs() < 1e-6));
        assert_eq!(ror[0].time_s, 1.0);
    }

    #[test]
    fn test_strictly_decreasing_is_empty() {
        let temps: Vec<f64> = (0..100).map(|i| 250.0 - i as f64).collect();
        let ror = rate_of_rise(&series(&temps, 2.0), &MilestoneSet::new(), &AnalyticsConfig::default());
        assert!(ror.is_empty());
    }

    #[test]
    fn test_ceiling_spike_removed_neighbors_kept() {
        let mut temps: Vec<f64> = (0..61).map(|i| 100.0 + 0.1 * i as f64).collect();
        temps[30] += 30.0;
        let ror = rate_of_rise(&series(&temps, 1.0), &MilestoneSet::new(), &AnalyticsConfig::default());

        // the spike enters the 15-point window at t=23 and leaves it at t=38
        assert_eq!(ror.len(), 58);
        assert!(!ror.iter().any(|p| p.time_s == 23.0 || p.time_s == 38.0));
        assert!(ror.iter().any(|p| p.time_s == 22.0));
        assert!(ror.iter().any(|p| p.time_s == 30.0));
        assert!(ror.iter().any(|p| p.time_s == 39.0));
        assert!(ror.iter().all(|p| p.rate_per_min > 0.0 && p.rate_per_min <= 50.0));
    }

    #[test]
    fn test_non_positive_temperatures_skipped() {
        let mut temps: Vec<f64> = (0..40).map(|i| 100.0 + 0.5 * i as f64).collect();
        temps[5] = 0.0;
        temps[6] = -1.0;
        let ror = rate_of_rise(&series(&temps, 1.0), &MilestoneSet::new(), &AnalyticsConfig::default());
        assert!(!ror.iter().any(|p| p.time_s == 5.0 || p.time_s == 6.0));
        assert!(!ror.is_empty());
    }

    #[test]
    fn test_charge_drop_window() {
        let temps: Vec<f64> = (0..200).map(|i| 100.0 + 0.1 * i as f64).collect();
        let mut m = MilestoneSet::new();
        m.set(MilestoneKind::Charge, MilestoneMark::at_seconds(50.0, None));
        m.set(MilestoneKind::Drop, MilestoneMark::at_seconds(150.0, None));
        let ror = rate_of_rise(&series(&temps, 1.0), &m, &AnalyticsConfig::default());
        assert_eq!(ror.len(), 101);
        assert_eq!(ror.first().map(|p| p.time_s), Some(50.0));
        assert_eq!(ror.last().map(|p| p.time_s), Some(150.0));
    }

    #[test]
    fn test_too_few_admitted_points() {
        let temps: Vec<f64> = (0..10).map(|i| 100.0 + i as f64 * 0.2).collect();
        let ror = rate_of_rise(&series(&temps, 1.0), &MilestoneSet::new(), &AnalyticsConfig::default());
        assert!(ror.is_empty());
    }

    #[test]
    fn test_point_estimate() {
        let config = AnalyticsConfig::default();
        let temps: Vec<f64> = (0..20).map(|i| 150.0 + 0.5 * i as f64).collect();
        let s = series(&temps, 2.0);
        // 2.5 degrees over 10 s
        assert!((rate_of_rise_at(&s, 10, &config).unwrap() - 15.0).abs() < 1e-9);
        assert_eq!(rate_of_rise_at(&s, 4, &config), None);
        assert_eq!(rate_of_rise_at(&s, 20, &config), None);

        let mut spiky = s.clone();
        spiky[10].primary = Some(300.0);
        assert_eq!(rate_of_rise_at(&spiky, 10, &config), None);

        let mut stalled = s;
        stalled[10].time_s = stalled[5].time_s;
        assert_eq!(rate_of_rise_at(&stalled, 10, &config), None);
    }
}
