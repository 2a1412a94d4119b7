use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::model::{Event, EventCategory, MilestoneKind, TemperatureSample};

/// Control channel resolved onto every chart point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlChannel {
    /// Airflow
    Fan,
    /// Burner / heater power
    Heat,
}

impl ControlChannel {
    /// Resolve a channel name, accepting the common aliases (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "fan" | "air" | "fan_speed" => Some(ControlChannel::Fan),
            "heat" | "burner" | "heater" | "power" | "gas" => Some(ControlChannel::Heat),
            _ => None,
        }
    }
}

/// One row of chart data: a temperature sample with control state and
/// milestone markers resolved at its time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Seconds since the start of recording
    pub time_s: f64,
    /// Primary (bean) temperature
    pub primary: Option<f64>,
    /// Secondary (environment) temperature
    pub secondary: Option<f64>,
    /// Fan setting in effect
    pub fan: f64,
    /// Heat setting in effect
    pub heat: f64,
    /// Charge within tolerance
    pub charge: bool,
    /// Dry end (or `maillard`) within tolerance
    pub dry_end: bool,
    /// First crack start within tolerance
    pub fc_start: bool,
    /// First crack end within tolerance
    pub fc_end: bool,
    /// Second crack start within tolerance
    pub sc_start: bool,
    /// Second crack end within tolerance
    pub sc_end: bool,
    /// Drop within tolerance
    pub drop: bool,
    /// Cool (or `end`) within tolerance
    pub cool: bool,
}

impl ChartPoint {
    fn flag(&mut self, kind: MilestoneKind) {
        let flag = match kind {
            MilestoneKind::Charge => &mut self.charge,
            MilestoneKind::DryEnd => &mut self.dry_end,
            MilestoneKind::FcStart => &mut self.fc_start,
            MilestoneKind::FcEnd => &mut self.fc_end,
            MilestoneKind::ScStart => &mut self.sc_start,
            MilestoneKind::ScEnd => &mut self.sc_end,
            MilestoneKind::Drop => &mut self.drop,
            MilestoneKind::Cool => &mut self.cool,
        };
        *flag = true;
    }

    /// Milestones flagged on this point, in slot order
    pub fn milestones(&self) -> Vec<MilestoneKind> {
        let flags = [
            self.charge,
            self.dry_end,
            self.fc_start,
            self.fc_end,
            self.sc_start,
            self.sc_end,
            self.drop,
            self.cool,
        ];
        MilestoneKind::ALL
            .iter()
            .zip(flags)
            .filter_map(|(kind, set)| set.then_some(*kind))
            .collect()
    }
}

/// Merge samples and events into one chart sequence ordered by sample time.
///
/// Fan and heat carry forward: each point takes the latest numeric control
/// value at or before its time, 0 before the first. A milestone event flags
/// every point within `milestone_tolerance_s` of it.
pub fn assemble_chart(
    samples: &[TemperatureSample],
    events: &[Event],
    config: &AnalyticsConfig,
) -> Vec<ChartPoint> {
    let mut ordered: Vec<&TemperatureSample> = samples.iter().collect();
    ordered.sort_by(|a, b| a.time_s.total_cmp(&b.time_s));

    let mut controls: Vec<(f64, ControlChannel, f64)> = events
        .iter()
        .filter(|e| e.category == EventCategory::Control)
        .filter_map(|e| Some((e.time_s, ControlChannel::from_name(&e.channel)?, e.numeric_value()?)))
        .collect();
    controls.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut milestones: Vec<(f64, MilestoneKind)> = events
        .iter()
        .filter_map(|e| Some((e.time_s, e.milestone_kind()?)))
        .collect();
    milestones.sort_by(|a, b| a.0.total_cmp(&b.0));

    let tolerance = config.milestone_tolerance_s;
    let mut fan = 0.0;
    let mut heat = 0.0;
    let mut next_control = 0;
    let mut first_milestone = 0;

    ordered
        .into_iter()
        .map(|sample| {
            let t = sample.time_s;
            while let Some((time, channel, value)) = controls.get(next_control) {
                if *time > t {
                    break;
                }
                match channel {
                    ControlChannel::Fan => fan = *value,
                    ControlChannel::Heat => heat = *value,
                }
                next_control += 1;
            }

            let mut point = ChartPoint {
                time_s: t,
                primary: sample.primary,
                secondary: sample.secondary,
                fan,
                heat,
                ..ChartPoint::default()
            };

            while milestones
                .get(first_milestone)
                .is_some_and(|(time, _)| *time < t - tolerance)
            {
                first_milestone += 1;
            }
            for (time, kind) in &milestones[first_milestone..] {
                if *time > t + tolerance {
                    break;
                }
                point.flag(*kind);
            }

            point
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Provenance, RoastId};

    fn rid() -> RoastId {
        RoastId::new("chart").unwrap()
    }

    fn sample(t: f64) -> TemperatureSample {
        TemperatureSample::new(rid(), t, Some(150.0), Some(200.0), Provenance::Live)
    }

    fn control(channel: &str, t: f64, v: f64) -> Event {
        Event::control(rid(), channel, t, 0, v, Provenance::Live)
    }

    #[test]
    fn test_carry_forward() {
        let samples = vec![sample(0.0), sample(30.0), sample(60.0)];
        let events = vec![control("fan", 0.0, 5.0), control("fan", 45.0, 8.0)];
        let chart = assemble_chart(&samples, &events, &AnalyticsConfig::default());
        let fan: Vec<f64> = chart.iter().map(|p| p.fan).collect();
        assert_eq!(fan, vec![5.0, 5.0, 8.0]);
        assert!(chart.iter().all(|p| p.heat == 0.0));
    }

    #[test]
    fn test_aliases_and_non_numeric_values() {
        let samples = vec![sample(0.0), sample(10.0), sample(20.0), sample(30.0)];
        let mut bad = control("Burner", 15.0, 0.0);
        bad.value = Some("max".to_string());
        let events = vec![
            control("Air", 5.0, 3.0),
            control("GAS", 5.0, 40.0),
            bad,
            control("drum", 25.0, 99.0),
            control("power", 25.0, 60.0),
        ];
        let chart = assemble_chart(&samples, &events, &AnalyticsConfig::default());
        let heat: Vec<f64> = chart.iter().map(|p| p.heat).collect();
        assert_eq!(heat, vec![0.0, 40.0, 40.0, 60.0]);
        assert_eq!(chart[3].fan, 3.0);
    }

    #[test]
    fn test_out_of_order_samples_are_sorted() {
        let samples = vec![sample(60.0), sample(0.0), sample(30.0)];
        let chart = assemble_chart(&samples, &[], &AnalyticsConfig::default());
        let times: Vec<f64> = chart.iter().map(|p| p.time_s).collect();
        assert_eq!(times, vec![0.0, 30.0, 60.0]);
    }

    #[test]
    fn test_milestone_flags_with_tolerance_and_synonyms() {
        let samples: Vec<_> = (0..10).map(|i| sample(i as f64 * 2.0)).collect();
        let mut maillard = Event::milestone(rid(), MilestoneKind::DryEnd, 7.5, Provenance::Live);
        maillard.channel = "maillard".to_string();
        let events = vec![
            Event::milestone(rid(), MilestoneKind::Charge, 0.0, Provenance::Live),
            maillard,
            Event::milestone(rid(), MilestoneKind::DryEnd, 8.0, Provenance::Live),
        ];
        let chart = assemble_chart(&samples, &events, &AnalyticsConfig::default());

        assert!(chart[0].charge);
        assert!(!chart[1].charge);
        let dry: Vec<f64> = chart.iter().filter(|p| p.dry_end).map(|p| p.time_s).collect();
        assert_eq!(dry, vec![8.0]);
        assert_eq!(chart[4].milestones(), vec![MilestoneKind::DryEnd]);
    }

    #[test]
    fn test_milestone_between_sparse_samples_flags_nothing() {
        let samples = vec![sample(0.0), sample(10.0)];
        let events = vec![Event::milestone(rid(), MilestoneKind::FcStart, 5.0, Provenance::Live)];
        let chart = assemble_chart(&samples, &events, &AnalyticsConfig::default());
        assert!(chart.iter().all(|p| !p.fc_start));
    }
}
