//! # Roast View
//!
//! Everything a chart or report needs for one roast, read from a store in
//! one go. The independent reads (samples, milestone events, control events,
//! cached summary) run concurrently on scoped threads and are joined before
//! any derived value is computed.

use std::panic;
use std::thread;

use log::debug;
use serde::Serialize;

use crate::analytics::{analyze, extract_milestones, phase_metrics, RoastAnalysis};
use crate::chart::{assemble_chart, build_value_series, ChartPoint, EventValueSeries};
use crate::config::AnalyticsConfig;
use crate::model::{Event, EventCategory, RoastId, TemperatureSample};
use crate::store::{EventFilter, RoastSummary, StoreError, TelemetryStore};

/// Stored records of one roast
#[derive(Debug, Clone, Serialize)]
pub struct RoastView {
    /// Roast the records belong to
    pub roast_id: RoastId,
    /// Samples by ascending time
    pub samples: Vec<TemperatureSample>,
    /// Milestone events by ascending time
    pub milestone_events: Vec<Event>,
    /// Control events by ascending time
    pub control_events: Vec<Event>,
    /// Cached summary, if one was computed
    pub summary: Option<RoastSummary>,
}

impl RoastView {
    /// Read a roast's records concurrently
    pub fn load<S: TelemetryStore + ?Sized>(store: &S, roast_id: &RoastId) -> Result<Self, StoreError> {
        let view = thread::scope(|scope| -> Result<Self, StoreError> {
            let samples = scope.spawn(|| store.samples(roast_id));
            let milestones =
                scope.spawn(|| store.events(roast_id, EventFilter::category(EventCategory::Milestone)));
            let controls =
                scope.spawn(|| store.events(roast_id, EventFilter::category(EventCategory::Control)));
            let summary = store.summary(roast_id);

            Ok(Self {
                roast_id: roast_id.clone(),
                samples: join(samples)?,
                milestone_events: join(milestones)?,
                control_events: join(controls)?,
                summary: summary?,
            })
        })?;

        debug!(
            "Loaded {}: {} samples, {} milestone events, {} control events",
            roast_id,
            view.samples.len(),
            view.milestone_events.len(),
            view.control_events.len()
        );
        Ok(view)
    }

    /// Milestone and control events merged by ascending time
    pub fn events(&self) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .milestone_events
            .iter()
            .chain(&self.control_events)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.time_s.total_cmp(&b.time_s));
        events
    }

    /// Cached summary, unless records were added or removed since it was written
    pub fn current_summary(&self) -> Option<&RoastSummary> {
        let events = self.milestone_events.len() + self.control_events.len();
        self.summary
            .as_ref()
            .filter(|summary| summary.is_current(self.samples.len(), events))
    }

    /// Recompute the summary from every stored record of the roast
    pub fn summarize(&self) -> RoastSummary {
        let milestones = extract_milestones(&self.milestone_events, &self.samples);
        let metrics = phase_metrics(
            &milestones,
            self.samples.first().map(|s| s.time_s),
            self.samples.last().map(|s| s.time_s),
        );
        RoastSummary {
            roast_id: self.roast_id.clone(),
            milestones,
            metrics,
            sample_count: self.samples.len(),
            event_count: self.milestone_events.len() + self.control_events.len(),
            computed_at: chrono::Utc::now(),
        }
    }

    /// Milestones, phase breakdown and rate of rise
    pub fn analysis(&self, config: &AnalyticsConfig) -> RoastAnalysis {
        analyze(&self.samples, &self.milestone_events, config)
    }

    /// One chart point per sample with carried-forward control values
    pub fn chart(&self, config: &AnalyticsConfig) -> Vec<ChartPoint> {
        assemble_chart(&self.samples, &self.events(), config)
    }

    /// Control channel value series
    pub fn value_series(&self) -> Vec<EventValueSeries> {
        build_value_series(&self.control_events)
    }
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, Result<T, StoreError>>) -> Result<T, StoreError> {
    handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MilestoneKind, Provenance};
    use crate::store::MemoryStore;

    #[test]
    fn test_load_splits_events_and_derives_views() {
        let store = MemoryStore::new();
        let id = RoastId::new("view-1").unwrap();
        let samples: Vec<_> = (0..=60)
            .map(|i| TemperatureSample::new(id.clone(), i as f64, Some(150.0 + i as f64), None, Provenance::Live))
            .collect();
        store.insert_samples(&samples).unwrap();
        store
            .insert_events(&[
                Event::milestone(id.clone(), MilestoneKind::Charge, 0.0, Provenance::Live),
                Event::control(id.clone(), "fan", 0.0, 200, 5.0, Provenance::Live),
                Event::control(id.clone(), "fan", 45.0, 200, 8.0, Provenance::Live),
                Event::milestone(id.clone(), MilestoneKind::Drop, 60.0, Provenance::Live),
            ])
            .unwrap();

        let view = RoastView::load(&store, &id).unwrap();
        assert_eq!(view.samples.len(), 61);
        assert_eq!(view.milestone_events.len(), 2);
        assert_eq!(view.control_events.len(), 2);
        assert_eq!(view.summary, None);

        let chart = view.chart(&AnalyticsConfig::default());
        assert_eq!(chart[30].fan, 5.0);
        assert_eq!(chart[60].fan, 8.0);
        assert!(chart[0].charge && chart[60].drop);

        let analysis = view.analysis(&AnalyticsConfig::default());
        assert_eq!(analysis.milestones.len(), 2);
        assert_eq!(analysis.metrics.total_duration_s, 60.0);
        assert_eq!(view.value_series().len(), 1);
    }

    #[test]
    fn test_summary_goes_stale_after_live_append() {
        let store = MemoryStore::new();
        let id = RoastId::new("view-2").unwrap();
        let sample = |t: f64| TemperatureSample::new(id.clone(), t, Some(150.0 + t), None, Provenance::Live);
        store.insert_samples(&[sample(0.0), sample(1.0)]).unwrap();
        store
            .insert_events(&[Event::milestone(id.clone(), MilestoneKind::Charge, 0.0, Provenance::Live)])
            .unwrap();

        let summary = RoastView::load(&store, &id).unwrap().summarize();
        assert_eq!(summary.sample_count, 2);
        assert_eq!(summary.event_count, 1);
        assert_eq!(summary.milestones.len(), 1);
        store.upsert_summary(&summary).unwrap();
        assert!(RoastView::load(&store, &id).unwrap().current_summary().is_some());

        store.insert_samples(&[sample(2.0)]).unwrap();
        let view = RoastView::load(&store, &id).unwrap();
        assert!(view.summary.is_some());
        assert_eq!(view.current_summary(), None);
        assert_eq!(view.summarize().metrics.total_duration_s, 2.0);
    }

    #[test]
    fn test_unknown_roast_is_empty() {
        let store = MemoryStore::new();
        let view = RoastView::load(&store, &RoastId::new("nope").unwrap()).unwrap();
        assert!(view.samples.is_empty());
        assert!(view.chart(&AnalyticsConfig::default()).is_empty());
        assert!(view.analysis(&AnalyticsConfig::default()).ror.is_empty());
    }
}
