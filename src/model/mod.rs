//! # Canonical roast telemetry model
//!
//! Every source (live capture, bulk import, manual entry) ends up as two
//! append-friendly record kinds:
//!
//! - [`TemperatureSample`]: one row per sensor reading, temperatures in Celsius
//! - [`Event`]: one row per milestone, control change, or machine notification
//!
//! Everything else in this module ([`MilestoneSet`], [`PhaseMetrics`]) is
//! derived from those rows and can be recomputed at any time.

mod error;
mod event;
mod metadata;
mod metrics;
mod milestone;
mod sample;

pub use error::ModelError;
pub use event::{Event, EventCategory, AUX_CHANNEL_TYPE_BASE, MILESTONE_TYPE_BASE};
pub use metadata::{RoastMetadata, TemperatureUnit, WeightTriple};
pub use metrics::PhaseMetrics;
pub use milestone::{MilestoneKind, MilestoneMark, MilestoneSet};
pub use sample::{Provenance, RoastId, SampleQuality, TemperatureSample};

/// Round `value` to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
