use std::fmt;

use chrono::{DateTime, Utc};
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Event, EventCategory, MilestoneSet, PhaseMetrics, Provenance, RoastId};

/// Configuration for the Parquet store's part files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// ZSTD compression level
    pub compression_level: i32,

    /// Maximum rows per row group
    pub row_group_size: usize,

    /// Whether to write column chunk statistics
    pub write_statistics: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            compression_level: 3,
            row_group_size: 8192,
            write_statistics: true,
        }
    }
}

impl StoreConfig {
    /// Writer properties for a part file
    pub(crate) fn to_writer_properties(&self) -> WriterProperties {
        let compression = Compression::ZSTD(
            ZstdLevel::try_new(self.compression_level).unwrap_or_default(),
        );
        let statistics = if self.write_statistics {
            EnabledStatistics::Chunk
        } else {
            EnabledStatistics::None
        };

        WriterProperties::builder()
            .set_compression(compression)
            .set_statistics_enabled(statistics)
            .set_max_row_group_size(self.row_group_size.max(1))
            .build()
    }
}

/// Optional restriction on event reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Only events of this category
    pub category: Option<EventCategory>,
}

impl EventFilter {
    /// Every event
    pub fn all() -> Self {
        Self::default()
    }

    /// Events of one category
    pub fn category(category: EventCategory) -> Self {
        Self {
            category: Some(category),
        }
    }

    /// Whether `event` passes the filter
    pub fn matches(&self, event: &Event) -> bool {
        self.category.map_or(true, |c| event.category == c)
    }
}

/// Rows removed by a provenance-scoped delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedRows {
    /// Samples removed
    pub samples: usize,
    /// Events removed
    pub events: usize,
}

/// Cached derived analytics of one roast. Never authoritative: it can be
/// recomputed from the stored samples and events at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoastSummary {
    /// Roast the summary describes
    pub roast_id: RoastId,
    /// Resolved milestones
    pub milestones: MilestoneSet,
    /// Phase breakdown
    pub metrics: PhaseMetrics,
    /// Stored samples
    pub sample_count: usize,
    /// Stored events
    pub event_count: usize,
    /// When the summary was computed
    pub computed_at: DateTime<Utc>,
}

impl RoastSummary {
    /// Whether the summary was computed over the given record counts.
    ///
    /// Any append or delete since the summary was written changes a count.
    pub fn is_current(&self, sample_count: usize, event_count: usize) -> bool {
        self.sample_count == sample_count && self.event_count == event_count
    }
}

/// Outcome of one import attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    /// Records written
    Succeeded,
    /// Nothing (or only part) written
    Failed,
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStatus::Succeeded => f.write_str("succeeded"),
            ImportStatus::Failed => f.write_str("failed"),
        }
    }
}

/// Where an imported document came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Roast title from the document
    pub title: Option<String>,
    /// Roasting machine from the document
    pub device: Option<String>,
    /// File name or other label given by the caller
    pub label: Option<String>,
}

/// One entry of the import audit log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportAuditEntry {
    /// Batch identifier
    pub batch_id: Uuid,
    /// Target roast
    pub roast_id: RoastId,
    /// Provenance tag the import wrote under
    pub provenance: Provenance,
    /// Outcome
    pub status: ImportStatus,
    /// Samples written
    pub samples_written: usize,
    /// Events written
    pub events_written: usize,
    /// Warnings raised while parsing, validating and transforming
    pub warnings: Vec<String>,
    /// Failure reasons (empty on success)
    pub reasons: Vec<String>,
    /// Import start
    pub started_at: DateTime<Utc>,
    /// Import end
    pub finished_at: DateTime<Utc>,
    /// Source document descriptor
    pub source: SourceDescriptor,
}

impl ImportAuditEntry {
    /// New entry with a fresh batch id, started now and not yet finished
    pub fn begin(roast_id: RoastId, provenance: Provenance, source: SourceDescriptor) -> Self {
        let now = Utc::now();
        Self {
            batch_id: Uuid::new_v4(),
            roast_id,
            provenance,
            status: ImportStatus::Failed,
            samples_written: 0,
            events_written: 0,
            warnings: Vec::new(),
            reasons: Vec::new(),
            started_at: now,
            finished_at: now,
            source,
        }
    }

    /// Stamp the outcome and finish time
    pub fn finish(mut self, status: ImportStatus) -> Self {
        self.status = status;
        self.finished_at = Utc::now();
        self
    }
}
