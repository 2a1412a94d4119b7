//! # roastline - Roast Telemetry Import and Analytics
//!
//! `roastline` turns coffee-roast telemetry into a canonical time-series model
//! and the analytics built on it. Data arrives two ways:
//!
//! - **Live capture**: already-normalized samples and events appended as the
//!   roast runs, with per-roast time monotonicity enforced.
//! - **Bulk import**: third-party roast logs written in a permissive literal
//!   syntax (`True`/`None`, single quotes, trailing commas, truncated arrays),
//!   parsed with error recovery, validated, normalized to Celsius and
//!   down-sampled.
//!
//! From the stored records the crate derives named milestones, a smoothed
//! rate-of-rise curve, phase percentages (drying / Maillard / development) and
//! chart-ready sequences with carried-forward control settings.
//!
//! ## Quick Start
//!
//! ```rust
//! use roastline::prelude::*;
//!
//! let store = MemoryStore::new();
//! let importer = Importer::new(&store, ImportConfig::default());
//! let text = "{'timex': [0, 60, 240, 420, 600], 'temp2': [210, 200, 150, 180, 205],
//!              'temp1': [230, 230, 220, 225, 235], 'mode': 'C',
//!              'timeindex': [1, 2, 0, 3, 0, 0, 4, 0],}";
//! let id = RoastId::new("ethiopia-0412")?;
//! importer.import(text, &id, Provenance::Imported, None)?;
//!
//! let view = RoastView::load(&store, &id)?;
//! let analysis = view.analysis(&AnalyticsConfig::default());
//! assert_eq!(analysis.metrics.drying_pct, 33.33);
//! assert_eq!(view.chart(&AnalyticsConfig::default()).len(), 5);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`literal`]: tolerant literal-record parser with recovery passes
//! - [`validator`]: structural and semantic checks with enumerated reasons
//! - [`transform`]: unit conversion, milestone and event synthesis, down-sampling
//! - [`analytics`]: milestone extraction, rate of rise, phase percentages, comparison
//! - [`chart`]: carry-forward chart assembly and control value series
//! - [`store`]: the [`store::TelemetryStore`] seam with in-memory and Parquet adapters
//! - [`import`]: the parse -> validate -> transform -> write pipeline
//! - [`view`]: concurrent reads of one roast for charting and reports
//! - [`model`]: canonical samples, events, milestones and metrics
//! - [`config`]: explicit tunables for import and analytics
//!
//! ## Store Layout
//!
//! The Parquet adapter keeps one directory per roast:
//!
//! ```text
//! store/
//! ├── imports.jsonl
//! └── roasts/<roast_id>/
//!     ├── samples/part-000001.parquet
//!     ├── events/part-000001.parquet
//!     └── summary.json
//! ```
//!
//! The part files are plain Parquet and can be read with any Parquet tool.

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![allow(clippy::too_many_arguments)]

pub mod analytics;
pub mod chart;
pub mod config;
pub mod document;
pub mod import;
pub mod literal;
pub mod model;
pub mod store;
pub mod transform;
pub mod validator;
pub mod view;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::analytics::{
        analyze, compare_roasts, rate_of_rise, RoastAnalysis, RoastComparison, RoastRecords,
        RorPoint,
    };
    pub use crate::chart::{
        assemble_chart, build_value_series, ChartPoint, ControlChannel, EventValueSeries,
        ScaleClass,
    };
    pub use crate::config::{AnalyticsConfig, ConfigError, ImportConfig};
    pub use crate::import::{ImportError, ImportOutcome, Importer};
    pub use crate::literal::{parse_document, FormatError, ParseWarning};
    pub use crate::model::{
        Event, EventCategory, MilestoneKind, MilestoneMark, MilestoneSet, PhaseMetrics,
        Provenance, RoastId, RoastMetadata, TemperatureSample, TemperatureUnit,
    };
    pub use crate::store::{
        EventFilter, ImportAuditEntry, LiveCapture, MemoryStore, ParquetStore, RoastSummary,
        StoreConfig, StoreError, TelemetryStore,
    };
    pub use crate::transform::{transform_document, TransformError, TransformedRoast};
    pub use crate::validator::{validate_document, ValidationReport};
    pub use crate::view::RoastView;
}
