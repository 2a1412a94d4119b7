/// Errors raised when constructing model values from untrusted input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Roast identifier is empty, too long, or contains unsupported characters
    #[error("Invalid roast id '{0}': expected 1-128 characters of [A-Za-z0-9._-], not starting with '.'")]
    InvalidRoastId(String),

    /// Unknown provenance tag
    #[error("Unknown provenance tag '{0}' (expected live, imported or manual)")]
    UnknownProvenance(String),

    /// Unknown event category
    #[error("Unknown event category '{0}' (expected milestone, control or machine)")]
    UnknownCategory(String),

    /// Unknown sample quality tag
    #[error("Unknown sample quality '{0}'")]
    UnknownQuality(String),

    /// Unknown temperature unit indicator
    #[error("Unknown temperature unit '{0}' (expected C or F)")]
    UnknownUnit(String),
}
