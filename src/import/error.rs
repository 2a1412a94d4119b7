use crate::literal::FormatError;
use crate::store::StoreError;
use crate::transform::TransformError;

/// Error type for a failed import
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The document could not be parsed
    #[error("{0}")]
    Format(#[from] FormatError),

    /// The document parsed but failed one or more validation checks
    #[error("Document failed validation: {}", reasons.join("; "))]
    Validation {
        /// One entry per failed check
        reasons: Vec<String>,
        /// Warnings raised alongside the failures
        warnings: Vec<String>,
    },

    /// The validated document could not be turned into records
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// The store rejected a delete or write
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ImportError {
    /// Every distinct reason the import failed
    pub fn reasons(&self) -> Vec<String> {
        match self {
            ImportError::Validation { reasons, .. } => reasons.clone(),
            other => vec![other.to_string()],
        }
    }

    /// Text around the failure point of a format error
    pub fn context_window(&self) -> Option<&str> {
        match self {
            ImportError::Format(e) => Some(&e.context),
            _ => None,
        }
    }
}
