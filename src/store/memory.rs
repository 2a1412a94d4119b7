use std::collections::BTreeMap;
use std::sync::Mutex;

use log::debug;

use crate::model::{Event, Provenance, RoastId, TemperatureSample};

use super::{
    sort_by_time, DeletedRows, EventFilter, ImportAuditEntry, RoastSummary, StoreError,
    TelemetryStore,
};

#[derive(Debug, Default)]
struct Tables {
    samples: BTreeMap<RoastId, Vec<TemperatureSample>>,
    events: BTreeMap<RoastId, Vec<Event>>,
    summaries: BTreeMap<RoastId, RoastSummary>,
    audit: Vec<ImportAuditEntry>,
}

/// In-memory store adapter
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl TelemetryStore for MemoryStore {
    fn insert_samples(&self, samples: &[TemperatureSample]) -> Result<usize, StoreError> {
        let mut tables = self.tables.lock()?;
        for sample in samples {
            tables
                .samples
                .entry(sample.roast_id.clone())
                .or_default()
                .push(sample.clone());
        }
        Ok(samples.len())
    }

    fn insert_events(&self, events: &[Event]) -> Result<usize, StoreError> {
        let mut tables = self.tables.lock()?;
        for event in events {
            tables
                .events
                .entry(event.roast_id.clone())
                .or_default()
                .push(event.clone());
        }
        Ok(events.len())
    }

    fn delete_by_provenance(
        &self,
        roast_id: &RoastId,
        provenance: Provenance,
    ) -> Result<DeletedRows, StoreError> {
        let mut tables = self.tables.lock()?;
        let mut deleted = DeletedRows::default();

        if let Some(samples) = tables.samples.get_mut(roast_id) {
            let before = samples.len();
            samples.retain(|s| s.provenance != provenance);
            deleted.samples = before - samples.len();
        }
        if let Some(events) = tables.events.get_mut(roast_id) {
            let before = events.len();
            events.retain(|e| e.provenance != provenance);
            deleted.events = before - events.len();
        }

        debug!(
            "Deleted {} samples and {} events of {} with provenance {}",
            deleted.samples, deleted.events, roast_id, provenance
        );
        Ok(deleted)
    }

    fn samples(&self, roast_id: &RoastId) -> Result<Vec<TemperatureSample>, StoreError> {
        let tables = self.tables.lock()?;
        let mut samples = tables.samples.get(roast_id).cloned().unwrap_or_default();
        sort_by_time(&mut samples, |s| s.time_s);
        Ok(samples)
    }

    fn events(&self, roast_id: &RoastId, filter: EventFilter) -> Result<Vec<Event>, StoreError> {
        let tables = self.tables.lock()?;
        let mut events: Vec<Event> = tables
            .events
            .get(roast_id)
            .map(|events| events.iter().filter(|e| filter.matches(e)).cloned().collect())
            .unwrap_or_default();
        sort_by_time(&mut events, |e| e.time_s);
        Ok(events)
    }

    fn upsert_summary(&self, summary: &RoastSummary) -> Result<(), StoreError> {
        let mut tables = self.tables.lock()?;
        tables.summaries.insert(summary.roast_id.clone(), summary.clone());
        Ok(())
    }

    fn summary(&self, roast_id: &RoastId) -> Result<Option<RoastSummary>, StoreError> {
        Ok(self.tables.lock()?.summaries.get(roast_id).cloned())
    }

    fn append_audit(&self, entry: &ImportAuditEntry) -> Result<(), StoreError> {
        self.tables.lock()?.audit.push(entry.clone());
        Ok(())
    }

    fn audit_log(&self, roast_id: Option<&RoastId>) -> Result<Vec<ImportAuditEntry>, StoreError> {
        let tables = self.tables.lock()?;
        Ok(tables
            .audit
            .iter()
            .filter(|entry| roast_id.map_or(true, |id| &entry.roast_id == id))
            .cloned()
            .collect())
    }

    fn roast_ids(&self) -> Result<Vec<RoastId>, StoreError> {
        let tables = self.tables.lock()?;
        let mut ids: Vec<RoastId> = tables
            .samples
            .iter()
            .filter(|(_, rows)| !rows.is_empty())
            .map(|(id, _)| id.clone())
            .chain(
                tables
                    .events
                    .iter()
                    .filter(|(_, rows)| !rows.is_empty())
                    .map(|(id, _)| id.clone()),
            )
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}
