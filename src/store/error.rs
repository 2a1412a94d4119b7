use crate::model::ModelError;

/// Errors raised by telemetry store adapters
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// JSON error in the summary cache or audit log
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A stored value does not map back onto the model
    #[error("Invalid stored record: {0}")]
    Model(#[from] ModelError),

    /// Column missing from a stored part file
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Stored data does not have the expected shape
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Live record older than the last one written for the roast
    #[error("Non-monotonic {kind} for roast {roast_id}: {time_s}s after {last_s}s")]
    NonMonotonic {
        /// `sample` or `event`
        kind: &'static str,
        /// Roast the record belongs to
        roast_id: String,
        /// Offending time offset
        time_s: f64,
        /// Last accepted time offset
        last_s: f64,
    },

    /// A record for another roast was passed to a single-roast writer
    #[error("Record for roast {found} passed to a writer for roast {expected}")]
    RoastMismatch {
        /// Roast the writer was opened for
        expected: String,
        /// Roast on the record
        found: String,
    },

    /// A writer panicked while holding the store lock
    #[error("Store lock poisoned")]
    Poisoned,
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StoreError::Poisoned
    }
}
