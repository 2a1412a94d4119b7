//! # Record Transformation
//!
//! Turns a parsed, validated import document into canonical records:
//!
//! - temperatures normalized to Celsius at a fixed precision
//! - milestone index array resolved into a [`MilestoneSet`] and milestone events
//! - auxiliary device channels and special events turned into control events
//! - the sample series down-sampled for storage (milestone samples always kept)
//! - phase percentages computed over the full-resolution series
//!
//! Consistency problems the validator warned about are handled here by
//! truncating or dropping; each such action is recorded in
//! [`TransformedRoast::notes`].

mod downsample;
mod events;
mod metadata;
mod samples;

pub use downsample::downsample;
pub use events::{AUXILIARY_SUBCATEGORY, SPECIAL_EVENT_SUBCATEGORY};


use log::{debug, info};
use serde_json::Value;

use crate::analytics::phase_metrics;
use crate::config::ImportConfig;
use crate::document;
use crate::model::{
    Event, MilestoneSet, PhaseMetrics, Provenance, RoastId, RoastMetadata, TemperatureSample,
};

/// Error type for record transformation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// The document root is not an object
    #[error("Document root must be an object, found {0}")]
    NotAnObject(&'static str),

    /// Neither a charge milestone nor any sample to anchor the time axis
    #[error("No time anchor: the document has no charge milestone and no usable samples")]
    NoTimeAnchor,
}

/// Canonical records produced from one document
#[derive(Debug, Clone)]
pub struct TransformedRoast {
    /// Roast the records belong to
    pub roast_id: RoastId,
    /// Provenance stamped on every record
    pub provenance: Provenance,
    /// Down-sampled samples, ordered by time
    pub samples: Vec<TemperatureSample>,
    /// Milestone and control events, ordered by time
    pub events: Vec<Event>,
    /// Resolved milestones
    pub milestones: MilestoneSet,
    /// Phase breakdown over the full-resolution series
    pub metrics: PhaseMetrics,
    /// Descriptive metadata
    pub metadata: RoastMetadata,
    /// Samples in the document before down-sampling
    pub source_sample_count: usize,
    /// Truncations and drops applied while transforming
    pub notes: Vec<String>,
}

/// Transform a parsed document into canonical records.
pub fn transform_document(
    doc: &Value,
    roast_id: &RoastId,
    provenance: Provenance,
    config: &ImportConfig,
) -> Result<TransformedRoast, TransformError> {
    let fields = doc.as_object().ok_or(TransformError::NotAnObject(document::type_name(doc)))?;
    let mut notes = Vec::new();

    let (unit, unit_note) = samples::source_unit(fields);
    notes.extend(unit_note);
    let metadata = metadata::extract_metadata(fields, unit, config.precision);

    let timeline = samples::build_timeline(
        fields,
        roast_id,
        provenance,
        unit,
        config.precision,
        metadata.ambient_temperature,
        &mut notes,
    );
    if timeline.samples.is_empty() {
        return Err(TransformError::NoTimeAnchor);
    }

    let milestones = events::resolve_milestones(fields, &timeline, roast_id, provenance, &mut notes);
    let mut all_events = milestones.events;
    all_events.extend(events::auxiliary_events(fields, roast_id, provenance));
    all_events.extend(events::special_events(fields, &timeline, roast_id, provenance, &mut notes));
    all_events.sort_by(|a, b| a.time_s.total_cmp(&b.time_s));

    let metrics = phase_metrics(
        &milestones.set,
        timeline.samples.first().map(|s| s.time_s),
        timeline.samples.last().map(|s| s.time_s),
    );

    let source_sample_count = timeline.samples.len();
    let retained = downsample(&timeline.samples, &milestones.positions, config);

    for note in &notes {
        debug!("{}: {}", roast_id, note);
    }
    info!(
        "Transformed {}: {} of {} samples retained, {} events, {} milestones",
        roast_id,
        retained.len(),
        source_sample_count,
        all_events.len(),
        milestones.set.len()
    );

    Ok(TransformedRoast {
        roast_id: roast_id.clone(),
        provenance,
        samples: retained,
        events: all_events,
        milestones: milestones.set,
        metrics,
        metadata,
        source_sample_count,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventCategory, MilestoneKind};
    use serde_json::json;

    fn rid() -> RoastId {
        RoastId::new("batch-1").unwrap()
    }

    #[test]
    fn test_well_formed_document() {
        let doc = json!({
            "mode": "C",
            "title": "Test",
            "timex": [0.0, 180.0, 360.0, 540.0, 600.0],
            "temp2": [200.0, 150.0, 170.0, 205.0, 60.0],
            "temp1": [230.0, 220.0, 225.0, 235.0, 40.0],
            "timeindex": [0, 1, 2, 0, 0, 0, 3, 4],
            "extratimex": [[0.0, 300.0]],
            "extratemp1": [[5, 8]],
            "extratemp2": [[60, 60]],
            "extraname1": ["Fan"],
            "extraname2": ["Heat"],
        });
        let roast = transform_document(&doc, &rid(), Provenance::Imported, &ImportConfig::default()).unwrap();

        assert_eq!(roast.samples.len(), 5);
        assert_eq!(roast.source_sample_count, 5);
        assert_eq!(roast.milestones.len(), 4);
        assert_eq!(roast.metrics.drying_pct, 33.33);
        assert_eq!(roast.metadata.title.as_deref(), Some("Test"));

        let milestone_events = roast.events.iter().filter(|e| e.category == EventCategory::Milestone).count();
        assert_eq!(milestone_events, 4);
        let controls: Vec<_> = roast.events.iter().filter(|e| e.category == EventCategory::Control).collect();
        assert_eq!(controls.len(), 3);
        assert!(roast.events.windows(2).all(|w| w[0].time_s <= w[1].time_s));
        assert!(roast.notes.is_empty(), "{:?}", roast.notes);
    }

    #[test]
    fn test_charge_at_index_zero_is_unset() {
        let doc = json!({
            "timex": [0.0, 60.0, 120.0],
            "temp2": [180.0, 150.0, 160.0],
            "temp1": [200.0, 200.0, 200.0],
            "timeindex": [0, 0, 0, 0, 0, 0, 2, 0],
        });
        let roast = transform_document(&doc, &rid(), Provenance::Imported, &ImportConfig::default()).unwrap();
        assert_eq!(roast.milestones.charge, None);
        assert_eq!(roast.metrics.start_s, Some(0.0));
        assert_eq!(roast.milestones.time_s(MilestoneKind::Drop), Some(120.0));
    }

    #[test]
    fn test_no_usable_samples() {
        let doc = json!({"timex": [-1.0], "temp2": [1.0], "temp1": [1.0]});
        let err = transform_document(&doc, &rid(), Provenance::Imported, &ImportConfig::default()).unwrap_err();
        assert_eq!(err, TransformError::NoTimeAnchor);
    }

    #[test]
    fn test_not_an_object() {
        let err = transform_document(&json!([1]), &rid(), Provenance::Imported, &ImportConfig::default()).unwrap_err();
        assert_eq!(err, TransformError::NotAnObject("array"));
    }

    #[test]
    fn test_milestone_samples_survive_downsampling() {
        let n = 3000;
        let doc = json!({
            "timex": (0..n).map(|i| i as f64).collect::<Vec<_>>(),
            "temp2": vec![150.0; n],
            "temp1": vec![200.0; n],
            "timeindex": [0, 1001, 2003, 0, 0, 0, 2999, 0],
        });
        let roast = transform_document(&doc, &rid(), Provenance::Imported, &ImportConfig::default()).unwrap();
        // stride 5 plus three off-stride milestones
        assert_eq!(roast.samples.len(), 603);
        for t in [1001.0, 2003.0, 2999.0] {
            assert!(roast.samples.iter().any(|s| s.time_s == t));
        }
        assert_eq!(roast.source_sample_count, n);
    }
}
