use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Event, EventCategory};

/// Axis scale a series should be drawn against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleClass {
    /// 0..=10 (damper positions, fan steps)
    Low,
    /// 0..=100
    Percentage,
    /// Anything else
    Custom,
}

impl ScaleClass {
    /// Classify a value range
    pub fn classify(min: f64, max: f64) -> Self {
        if min >= 0.0 && max <= 10.0 {
            ScaleClass::Low
        } else if min >= 0.0 && max <= 100.0 {
            ScaleClass::Percentage
        } else {
            ScaleClass::Custom
        }
    }
}

impl fmt::Display for ScaleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScaleClass::Low => "low",
            ScaleClass::Percentage => "percentage",
            ScaleClass::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// Numeric values of one control channel over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventValueSeries {
    /// Channel as stored
    pub channel: String,
    /// Channel name for display (`fan_speed` -> `Fan Speed`)
    pub display_name: String,
    /// `(time_s, value)` pairs in event order
    pub points: Vec<(f64, f64)>,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Scale class of `min..=max`
    pub scale: ScaleClass,
}

/// Group control events by channel into value series, ordered by channel name.
///
/// Events whose value does not parse as a number are skipped; a channel with
/// no numeric value at all produces no series.
pub fn build_value_series(events: &[Event]) -> Vec<EventValueSeries> {
    let mut groups: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
    for event in events.iter().filter(|e| e.category == EventCategory::Control) {
        let points = groups.entry(event.channel.as_str()).or_default();
        if let Some(value) = event.numeric_value() {
            points.push((event.time_s, value));
        }
    }

    groups
        .into_iter()
        .filter(|(_, points)| !points.is_empty())
        .map(|(channel, mut points)| {
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
            let min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
            let max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
            EventValueSeries {
                channel: channel.to_string(),
                display_name: title_case(channel),
                points,
                min,
                max,
                scale: ScaleClass::classify(min, max),
            }
        })
        .collect()
}

fn title_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
