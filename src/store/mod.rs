//! # Telemetry store adapters
//!
//! Durable storage of samples and events lives outside the core; the pipeline
//! reaches it through the [`TelemetryStore`] trait. Two adapters ship with the
//! crate:
//!
//! - [`MemoryStore`]: everything in a mutex-guarded map, for tests and embedding
//! - [`ParquetStore`]: a directory bundle of Parquet part files, replaced atomically on write
//!
//! ```text
//! store/
//! ├── imports.jsonl                 # import audit log, one JSON object per line
//! └── roasts/<roast_id>/
//!     ├── samples/part-000001.parquet
//!     ├── events/part-000001.parquet
//!     └── summary.json              # derived cache, safe to delete
//! ```
//!
//! Reads return records ordered by ascending time. Writers for live data go
//! through [`LiveCapture`], which rejects records that would break per-roast
//! time monotonicity.
//!
//! ```
//! use roastline::model::{Provenance, RoastId, TemperatureSample};
//! use roastline::store::{MemoryStore, TelemetryStore};
//!
//! let store = MemoryStore::new();
//! let id = RoastId::new("r-1")?;
//! let sample = TemperatureSample::new(id.clone(), 0.0, Some(21.0), None, Provenance::Manual);
//! store.insert_samples(&[sample])?;
//! assert_eq!(store.samples(&id)?.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod bundle;
mod error;
mod live;
mod memory;
mod schema;
mod types;

pub use bundle::ParquetStore;
pub use error::StoreError;
pub use live::LiveCapture;
pub use memory::MemoryStore;
pub use types::{
    DeletedRows, EventFilter, ImportAuditEntry, ImportStatus, RoastSummary, SourceDescriptor,
    StoreConfig,
};

use crate::model::{Event, Provenance, RoastId, TemperatureSample};

/// Storage seam between the pipeline and a datastore.
///
/// Implementations serialize their own writers; every method takes `&self`
/// so one store can be shared across threads.
pub trait TelemetryStore: Send + Sync {
    /// Append samples, returning the number written
    fn insert_samples(&self, samples: &[TemperatureSample]) -> Result<usize, StoreError>;

    /// Append events, returning the number written
    fn insert_events(&self, events: &[Event]) -> Result<usize, StoreError>;

    /// Remove every sample and event of `roast_id` carrying `provenance`
    fn delete_by_provenance(
        &self,
        roast_id: &RoastId,
        provenance: Provenance,
    ) -> Result<DeletedRows, StoreError>;

    /// Samples of a roast by ascending time
    fn samples(&self, roast_id: &RoastId) -> Result<Vec<TemperatureSample>, StoreError>;

    /// Events of a roast by ascending time
    fn events(&self, roast_id: &RoastId, filter: EventFilter) -> Result<Vec<Event>, StoreError>;

    /// Insert or replace the cached summary of a roast
    fn upsert_summary(&self, summary: &RoastSummary) -> Result<(), StoreError>;

    /// Cached summary of a roast, if one was computed
    fn summary(&self, roast_id: &RoastId) -> Result<Option<RoastSummary>, StoreError>;

    /// Append one import audit entry
    fn append_audit(&self, entry: &ImportAuditEntry) -> Result<(), StoreError>;

    /// Audit entries in append order, optionally for one roast
    fn audit_log(&self, roast_id: Option<&RoastId>) -> Result<Vec<ImportAuditEntry>, StoreError>;

    /// Every roast with stored records, sorted
    fn roast_ids(&self) -> Result<Vec<RoastId>, StoreError>;
}

/// Sort records by time keeping insertion order for ties
pub(crate) fn sort_by_time<T>(records: &mut [T], time: impl Fn(&T) -> f64) {
    records.sort_by(|a, b| time(a).total_cmp(&time(b)));
}
