use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::MilestoneKind;

/// Phase-duration breakdown of one roast.
///
/// Percentages are of the span between the start anchor (charge, else first
/// sample) and the end anchor (drop, else cool, else an "as of" time). A phase
/// whose boundaries are missing or out of order reports 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseMetrics {
    /// Drying phase share, percent
    pub drying_pct: f64,
    /// Maillard phase share, percent
    pub maillard_pct: f64,
    /// Development phase share, percent
    pub development_pct: f64,
    /// End anchor minus start anchor, seconds
    pub total_duration_s: f64,
    /// Start anchor, seconds since start of recording
    pub start_s: Option<f64>,
    /// End anchor, seconds since start of recording
    pub end_s: Option<f64>,
    /// Turning point (dry end) relative to the start anchor, seconds
    pub turning_point_s: Option<f64>,
    /// First crack start relative to the start anchor, seconds
    pub first_crack_s: Option<f64>,
    /// Every set milestone relative to the start anchor, seconds
    pub relative_times: BTreeMap<MilestoneKind, f64>,
}

impl PhaseMetrics {
    /// Development time after first crack, seconds
    pub fn development_time_s(&self) -> f64 {
        self.total_duration_s * self.development_pct / 100.0
    }
}
