use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ModelError;

/// Validated roast identifier.
///
/// Identifiers double as directory names in the Parquet store, so they are
/// restricted to a filesystem-safe alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoastId(String);

impl RoastId {
    /// Maximum accepted identifier length
    pub const MAX_LEN: usize = 128;

    /// Validate and wrap a roast identifier
    pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        let valid = !id.is_empty()
            && id.len() <= Self::MAX_LEN
            && !id.starts_with('.')
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if valid {
            Ok(Self(id))
        } else {
            Err(ModelError::InvalidRoastId(id))
        }
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoastId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RoastId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoastId> for String {
    fn from(id: RoastId) -> Self {
        id.0
    }
}

/// Origin of a batch of records. Re-imports replace every record sharing the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Streamed from a connected roaster during the roast
    Live,
    /// Bulk-imported from a third-party log document
    Imported,
    /// Entered by hand after the fact
    Manual,
}

impl Provenance {
    /// Tag as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Live => "live",
            Provenance::Imported => "imported",
            Provenance::Manual => "manual",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provenance {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Provenance::Live),
            "imported" | "import" => Ok(Provenance::Imported),
            "manual" => Ok(Provenance::Manual),
            other => Err(ModelError::UnknownProvenance(other.to_string())),
        }
    }
}

/// Quality tag attached to every sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleQuality {
    /// Reading taken as-is from the sensor or document
    #[default]
    Measured,
    /// Primary temperature outside the plausible physical band
    OutOfRange,
}

impl SampleQuality {
    /// Plausible primary temperature band in Celsius
    pub const PLAUSIBLE_RANGE: std::ops::RangeInclusive<f64> = -50.0..=400.0;

    /// Classify a canonical primary temperature
    pub fn classify(primary: Option<f64>) -> Self {
        match primary {
            Some(t) if !Self::PLAUSIBLE_RANGE.contains(&t) => SampleQuality::OutOfRange,
            _ => SampleQuality::Measured,
        }
    }

    /// Tag as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleQuality::Measured => "measured",
            SampleQuality::OutOfRange => "out_of_range",
        }
    }
}

impl FromStr for SampleQuality {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "measured" => Ok(SampleQuality::Measured),
            "out_of_range" => Ok(SampleQuality::OutOfRange),
            other => Err(ModelError::UnknownQuality(other.to_string())),
        }
    }
}

/// One temperature reading in canonical units (Celsius).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSample {
    /// Owning roast
    pub roast_id: RoastId,
    /// Seconds since the start of recording (non-negative, monotonic per roast)
    pub time_s: f64,
    /// Primary (bean) temperature
    pub primary: Option<f64>,
    /// Secondary (environment) temperature
    pub secondary: Option<f64>,
    /// Ambient temperature
    pub ambient: Option<f64>,
    /// Origin of this record
    pub provenance: Provenance,
    /// Quality tag
    pub quality: SampleQuality,
}

impl TemperatureSample {
    /// Create a sample, deriving the quality tag from the primary temperature
    pub fn new(
        roast_id: RoastId,
        time_s: f64,
        primary: Option<f64>,
        secondary: Option<f64>,
        provenance: Provenance,
    ) -> Self {
        Self {
            roast_id,
            time_s,
            primary,
            secondary,
            ambient: None,
            provenance,
            quality: SampleQuality::classify(primary),
        }
    }

    /// Set the ambient temperature
    pub fn with_ambient(mut self, ambient: Option<f64>) -> Self {
        self.ambient = ambient;
        self
    }
}
