//! # Import Orchestration
//!
//! Runs one third-party roast log through the whole pipeline and writes the
//! result:
//!
//! 1. parse with the tolerant [`literal`](crate::literal) parser
//! 2. validate; any failed check rejects the document with every reason listed
//! 3. transform into canonical samples and events
//! 4. delete all records of the roast carrying the same provenance tag
//! 5. insert samples, then events, in fixed-size sequential batches
//! 6. upsert the derived summary
//! 7. append an audit entry (also for failed imports)
//!
//! There is no cross-batch atomicity. A failure part-way through leaves the
//! roast partially written under the import's tag; re-running the import
//! replaces those rows.
//!
//! ```rust
//! use roastline::config::ImportConfig;
//! use roastline::import::Importer;
//! use roastline::model::{Provenance, RoastId};
//! use roastline::store::{MemoryStore, TelemetryStore};
//!
//! let store = MemoryStore::new();
//! let importer = Importer::new(&store, ImportConfig::default());
//! let text = "{'timex': [0, 60, 120], 'temp2': [200, 150, 170], 'temp1': [230, 220, 225],
//!              'timeindex': [1, 0, 0, 0, 0, 0, 2, 0]}";
//! let id = RoastId::new("batch-12")?;
//!
//! let outcome = importer.import(text, &id, Provenance::Imported, Some("batch-12.alog"))?;
//! assert_eq!(outcome.samples_written, 3);
//! assert_eq!(outcome.milestones.len(), 2);
//! assert_eq!(store.audit_log(Some(&id))?.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;

pub use error::ImportError;

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::config::ImportConfig;
use crate::document::{self, ROASTER_TYPE, TITLE};
use crate::literal::parse_document;
use crate::model::{MilestoneSet, PhaseMetrics, Provenance, RoastId, RoastMetadata};
use crate::store::{DeletedRows, ImportAuditEntry, ImportStatus, SourceDescriptor, TelemetryStore};
use crate::transform::{transform_document, TransformedRoast};
use crate::validator::validate_document;
use crate::view::RoastView;

/// What a successful import wrote
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    /// Audit batch id
    pub batch_id: Uuid,
    /// Target roast
    pub roast_id: RoastId,
    /// Provenance tag written under
    pub provenance: Provenance,
    /// Rows removed by replace-by-provenance
    pub replaced: DeletedRows,
    /// Samples written
    pub samples_written: usize,
    /// Events written
    pub events_written: usize,
    /// Samples in the document before down-sampling
    pub source_sample_count: usize,
    /// Resolved milestones
    pub milestones: MilestoneSet,
    /// Phase breakdown
    pub metrics: PhaseMetrics,
    /// Document metadata
    pub metadata: RoastMetadata,
    /// Parse repairs, validation warnings and transform notes
    pub warnings: Vec<String>,
}

/// Import pipeline bound to one store
pub struct Importer<'a, S: TelemetryStore + ?Sized> {
    store: &'a S,
    config: ImportConfig,
}

impl<'a, S: TelemetryStore + ?Sized> Importer<'a, S> {
    /// Create an importer writing to `store`
    pub fn new(store: &'a S, config: ImportConfig) -> Self {
        Self { store, config }
    }

    /// Import one document into `roast_id` under `provenance`.
    ///
    /// `label` names the source in the audit log and validation report.
    pub fn import(
        &self,
        text: &str,
        roast_id: &RoastId,
        provenance: Provenance,
        label: Option<&str>,
    ) -> Result<ImportOutcome, ImportError> {
        let source = SourceDescriptor {
            label: label.map(str::to_string),
            ..SourceDescriptor::default()
        };
        let mut audit = ImportAuditEntry::begin(roast_id.clone(), provenance, source);
        info!("Importing {} into {} ({})", label.unwrap_or("<document>"), roast_id, provenance);

        let result = self.run(text, roast_id, provenance, label, &mut audit);

        let entry = match &result {
            Ok(_) => audit.finish(ImportStatus::Succeeded),
            Err(e) => {
                warn!("Import into {} failed: {}", roast_id, e);
                audit.reasons = e.reasons();
                audit.finish(ImportStatus::Failed)
            }
        };
        if let Err(e) = self.store.append_audit(&entry) {
            warn!("Could not record import audit entry for {}: {}", roast_id, e);
        }

        result
    }

    fn run(
        &self,
        text: &str,
        roast_id: &RoastId,
        provenance: Provenance,
        label: Option<&str>,
        audit: &mut ImportAuditEntry,
    ) -> Result<ImportOutcome, ImportError> {
        let parsed = parse_document(text)?;
        audit.warnings.extend(parsed.warnings.iter().map(ToString::to_string));
        describe_source(&parsed.value, &mut audit.source);

        let report = validate_document(&parsed.value, label.unwrap_or(roast_id.as_str()));
        audit.warnings.extend(report.warnings());
        if !report.is_valid() {
            return Err(ImportError::Validation {
                reasons: report.reasons(),
                warnings: audit.warnings.clone(),
            });
        }

        let roast = transform_document(&parsed.value, roast_id, provenance, &self.config)?;
        audit.warnings.extend(roast.notes.iter().cloned());

        let replaced = self.store.delete_by_provenance(roast_id, provenance)?;
        if replaced.samples + replaced.events > 0 {
            info!(
                "Replaced {} samples and {} events of {} tagged {}",
                replaced.samples, replaced.events, roast_id, provenance
            );
        }

        let batch_size = self.config.batch_size.max(1);
        for batch in roast.samples.chunks(batch_size) {
            audit.samples_written += self.store.insert_samples(batch)?;
        }
        for batch in roast.events.chunks(batch_size) {
            audit.events_written += self.store.insert_events(batch)?;
        }
        debug!(
            "Wrote {} samples and {} events in batches of {}",
            audit.samples_written, audit.events_written, batch_size
        );

        // The roast may also hold records under other provenance tags
        let stored = RoastView::load(self.store, roast_id)?;
        self.store.upsert_summary(&stored.summarize())?;

        let TransformedRoast {
            milestones,
            metrics,
            metadata,
            source_sample_count,
            ..
        } = roast;
        Ok(ImportOutcome {
            batch_id: audit.batch_id,
            roast_id: roast_id.clone(),
            provenance,
            replaced,
            samples_written: audit.samples_written,
            events_written: audit.events_written,
            source_sample_count,
            milestones,
            metrics,
            metadata,
            warnings: audit.warnings.clone(),
        })
    }
}

fn describe_source(doc: &Value, source: &mut SourceDescriptor) {
    if let Some(fields) = doc.as_object() {
        source.title = document::text(fields, TITLE);
        source.device = document::text(fields, ROASTER_TYPE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Event, TemperatureSample};
    use crate::store::{EventFilter, MemoryStore, RoastSummary, StoreError};

    const DOC: &str = r#"{
        'title': 'Colombia Huila',
        'roastertype': 'Probat P12',
        'mode': 'C',
        'timex': [0.0, 180.0, 360.0, 540.0],
        'temp2': [200.0, 150.0, 170.0, 205.0],
        'temp1': [230.0, 220.0, 225.0, 235.0],
        'timeindex': [0, 1, 2, 0, 0, 0, 3, 0],
    }"#;

    fn id() -> RoastId {
        RoastId::new("imp-1").unwrap()
    }

    #[test]
    fn test_import_writes_records_summary_and_audit() {
        let store = MemoryStore::new();
        let importer = Importer::new(&store, ImportConfig::default());
        let outcome = importer.import(DOC, &id(), Provenance::Imported, Some("huila.alog")).unwrap();

        assert_eq!(outcome.samples_written, 4);
        assert_eq!(outcome.milestones.len(), 3);
        assert_eq!(outcome.metrics.maillard_pct, 33.33);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("trailing comma"));

        let summary = store.summary(&id()).unwrap().unwrap();
        assert_eq!(summary.sample_count, 4);
        assert_eq!(summary.milestones, outcome.milestones);

        let audit = store.audit_log(Some(&id())).unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].status, ImportStatus::Succeeded);
        assert_eq!(audit[0].source.title.as_deref(), Some("Colombia Huila"));
        assert_eq!(audit[0].source.device.as_deref(), Some("Probat P12"));
        assert_eq!(audit[0].batch_id, outcome.batch_id);
    }

    #[test]
    fn test_reimport_replaces_same_provenance_only() {
        let store = MemoryStore::new();
        store
            .insert_samples(&[TemperatureSample::new(id(), 1000.0, Some(20.0), None, Provenance::Live)])
            .unwrap();
        let importer = Importer::new(&store, ImportConfig::default());

        importer.import(DOC, &id(), Provenance::Imported, None).unwrap();
        let second = importer.import(DOC, &id(), Provenance::Imported, None).unwrap();

        assert_eq!(second.replaced.samples, 4);
        assert_eq!(store.samples(&id()).unwrap().len(), 5);
        assert_eq!(store.events(&id(), EventFilter::all()).unwrap().len(), 3);
    }

    #[test]
    fn test_validation_failure_lists_every_reason_and_is_audited() {
        let store = MemoryStore::new();
        let importer = Importer::new(&store, ImportConfig::default());
        let err = importer
            .import("{'timex': [0, 'x'], 'temp2': [], 'temp1': [1, 2]}", &id(), Provenance::Imported, None)
            .unwrap_err();

        assert!(matches!(err, ImportError::Validation { .. }));
        let reasons = err.reasons();
        assert_eq!(reasons.len(), 2);
        assert!(reasons[0].contains("temp2") && reasons[0].contains("empty"));
        assert!(reasons[1].contains("timex") && reasons[1].contains("non-numeric"));
        assert!(store.samples(&id()).unwrap().is_empty());

        let audit = store.audit_log(None).unwrap();
        assert_eq!(audit[0].status, ImportStatus::Failed);
        assert_eq!(audit[0].reasons, err.reasons());
    }

    #[test]
    fn test_format_failure_exposes_context() {
        let store = MemoryStore::new();
        let importer = Importer::new(&store, ImportConfig::default());
        let err = importer
            .import("{'timex': [0, 1], 'title': @@@}", &id(), Provenance::Imported, None)
            .unwrap_err();

        assert!(matches!(err, ImportError::Format(_)));
        assert!(err.context_window().is_some_and(|c| c.contains("@@@")));
        assert_eq!(store.audit_log(None).unwrap()[0].status, ImportStatus::Failed);
    }

    #[test]
    fn test_summary_covers_every_provenance() {
        let store = MemoryStore::new();
        let importer = Importer::new(&store, ImportConfig::default());
        let first = importer.import(DOC, &id(), Provenance::Imported, None).unwrap();
        assert_eq!(first.milestones.len(), 3);

        let manual = "{'timex': [30.0, 90.0], 'temp2': [190.0, 180.0], 'temp1': [220.0, 221.0]}";
        let second = importer.import(manual, &id(), Provenance::Manual, None).unwrap();
        assert!(second.milestones.is_empty());

        let summary = store.summary(&id()).unwrap().unwrap();
        assert_eq!(summary.milestones, first.milestones);
        assert_eq!(summary.sample_count, 6);
        assert_eq!(summary.event_count, 3);
        assert!(RoastView::load(&store, &id()).unwrap().current_summary().is_some());
    }

    #[test]
    fn test_recoverable_defects_reach_outcome_warnings() {
        let store = MemoryStore::new();
        let importer = Importer::new(&store, ImportConfig::default());
        let text = "{'timex': [0, 60, 120, 180], 'temp2': [200, 150, 170, 190], 'temp1': [230, 220, 225],
                     'timeindex': [1, 2, 0, 0, 0, 0, 3, 0]}";
        let outcome = importer.import(text, &id(), Provenance::Imported, None).unwrap();

        assert_eq!(outcome.samples_written, 3);
        assert_eq!(outcome.milestones.len(), 2);
        assert!(outcome.warnings.iter().any(|w| w.contains("truncated to 3")));
        assert!(outcome.warnings.iter().any(|w| w.contains("drop (index 3)")));
    }

    #[test]
    fn test_unterminated_quote_in_required_array_is_fatal() {
        let store = MemoryStore::new();
        let importer = Importer::new(&store, ImportConfig::default());
        let text = "{'timex': [0, 1, 2], 'temp2': [150, 'x, 160], 'temp1': [200, 201, 202]}";
        let err = importer.import(text, &id(), Provenance::Imported, None).unwrap_err();

        let ImportError::Validation { reasons, warnings } = &err else {
            panic!("expected a validation error, got {:?}", err);
        };
        assert_eq!(reasons.len(), 1);
        assert!(reasons[0].contains("temp2") && reasons[0].contains("empty"));
        assert!(!warnings.is_empty());
        assert!(store.samples(&id()).unwrap().is_empty());

        let audit = store.audit_log(Some(&id())).unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].status, ImportStatus::Failed);
        assert_eq!(&audit[0].reasons, reasons);
    }

    /// Store whose event inserts always fail
    struct BrokenEvents(MemoryStore);

    impl TelemetryStore for BrokenEvents {
        fn insert_samples(&self, samples: &[TemperatureSample]) -> Result<usize, StoreError> {
            self.0.insert_samples(samples)
        }
        fn insert_events(&self, _: &[Event]) -> Result<usize, StoreError> {
            Err(StoreError::InvalidFormat("disk full".to_string()))
        }
        fn delete_by_provenance(&self, id: &RoastId, p: Provenance) -> Result<DeletedRows, StoreError> {
            self.0.delete_by_provenance(id, p)
        }
        fn samples(&self, id: &RoastId) -> Result<Vec<TemperatureSample>, StoreError> {
            self.0.samples(id)
        }
        fn events(&self, id: &RoastId, filter: EventFilter) -> Result<Vec<Event>, StoreError> {
            self.0.events(id, filter)
        }
        fn upsert_summary(&self, summary: &RoastSummary) -> Result<(), StoreError> {
            self.0.upsert_summary(summary)
        }
        fn summary(&self, id: &RoastId) -> Result<Option<RoastSummary>, StoreError> {
            self.0.summary(id)
        }
        fn append_audit(&self, entry: &ImportAuditEntry) -> Result<(), StoreError> {
            self.0.append_audit(entry)
        }
        fn audit_log(&self, id: Option<&RoastId>) -> Result<Vec<ImportAuditEntry>, StoreError> {
            self.0.audit_log(id)
        }
        fn roast_ids(&self) -> Result<Vec<RoastId>, StoreError> {
            self.0.roast_ids()
        }
    }

    #[test]
    fn test_store_failure_leaves_partial_write_and_failed_audit() {
        let store = BrokenEvents(MemoryStore::new());
        let importer = Importer::new(&store, ImportConfig::default());
        let err = importer.import(DOC, &id(), Provenance::Imported, None).unwrap_err();

        assert!(matches!(err, ImportError::Store(_)));
        assert_eq!(store.samples(&id()).unwrap().len(), 4);
        assert_eq!(store.summary(&id()).unwrap(), None);

        let audit = store.audit_log(None).unwrap();
        assert_eq!(audit[0].status, ImportStatus::Failed);
        assert_eq!(audit[0].samples_written, 4);
    }
}
