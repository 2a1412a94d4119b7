//! # Roast Analytics
//!
//! Pure computations over stored samples and events:
//!
//! - **Milestone extraction**: milestone events -> [`MilestoneSet`]
//! - **Rate of rise**: smoothed first derivative of the primary temperature
//! - **Phase percentages**: drying / Maillard / development shares
//! - **Comparison**: the above summarized over many roasts
//!
//! Degenerate input never errors: too little data yields an empty curve, a
//! zeroed [`PhaseMetrics`] or `None`.
//!
//! ```rust
//! use roastline::analytics::analyze;
//! use roastline::config::AnalyticsConfig;
//! use roastline::model::{Event, MilestoneKind, Provenance, RoastId, TemperatureSample};
//!
//! let id = RoastId::new("demo")?;
//! let samples: Vec<_> = (0..300)
//!     .map(|i| TemperatureSample::new(id.clone(), i as f64, Some(100.0 + 0.2 * i as f64), None, Provenance::Live))
//!     .collect();
//! let events = vec![
//!     Event::milestone(id.clone(), MilestoneKind::Charge, 0.0, Provenance::Live),
//!     Event::milestone(id.clone(), MilestoneKind::Drop, 299.0, Provenance::Live),
//! ];
//!
//! let analysis = analyze(&samples, &events, &AnalyticsConfig::default());
//! assert_eq!(analysis.milestones.len(), 2);
//! assert!(!analysis.ror.is_empty());
//! # Ok::<(), roastline::model::ModelError>(())
//! ```

mod compare;
mod milestones;
mod phases;
mod ror;
mod smoothing;

pub use compare::{compare_roasts, RoastComparison, RoastRecords};
pub use milestones::{extract_milestones, nearest_primary};
pub use phases::phase_metrics;
pub use ror::{rate_of_rise, rate_of_rise_at, RorPoint};

use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::model::{Event, MilestoneSet, PhaseMetrics, TemperatureSample};

/// Everything derived from one roast's records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoastAnalysis {
    /// Resolved milestones
    pub milestones: MilestoneSet,
    /// Phase breakdown, ending at the last sample when no drop or cool is recorded
    pub metrics: PhaseMetrics,
    /// Smoothed rate-of-rise curve
    pub ror: Vec<RorPoint>,
}

/// Run milestone extraction, phase percentages and rate of rise.
///
/// `samples` and `events` must be sorted by time.
pub fn analyze(
    samples: &[TemperatureSample],
    events: &[Event],
    config: &AnalyticsConfig,
) -> RoastAnalysis {
    let milestones = extract_milestones(events, samples);
    let metrics = phase_metrics(
        &milestones,
        samples.first().map(|s| s.time_s),
        samples.last().map(|s| s.time_s),
    );
    let ror = rate_of_rise(samples, &milestones, config);
    RoastAnalysis {
        milestones,
        metrics,
        ror,
    }
}
