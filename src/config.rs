//! Tunables for the import pipeline and the analytics engine.
//!
//! Both structs are plain values passed explicitly to the operations that use
//! them. They deserialize from the `[import]` and `[analytics]` tables of the
//! CLI config file, with any missing key falling back to its default.

use serde::{Deserialize, Serialize};

/// A tunable outside the range its operation can work with
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A count that must be at least one
    #[error("{field} must be at least 1")]
    ZeroCount {
        /// Offending key
        field: &'static str,
    },

    /// A threshold that must be a positive finite number
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive {
        /// Offending key
        field: &'static str,
        /// Value given
        value: f64,
    },

    /// Rounding precision beyond what an f64 carries
    #[error("precision must be at most {max} decimal places, got {value}")]
    Precision {
        /// Value given
        value: u32,
        /// Largest accepted value
        max: u32,
    },
}

const MAX_PRECISION: u32 = 10;

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn at_least_one(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::ZeroCount { field })
    } else {
        Ok(())
    }
}

/// Configuration for importing one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Down-sampling target: roughly this many regularly spaced samples are kept
    pub target_cap: usize,

    /// A sample whose primary or secondary temperature moved more than this
    /// (degrees Celsius) from the last retained sample is always kept
    pub significant_change: f64,

    /// Decimal places kept after unit conversion
    pub precision: u32,

    /// Rows per store insert call
    pub batch_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            target_cap: 600,
            significant_change: 2.0,
            precision: 1,
            batch_size: 100,
        }
    }
}

impl ImportConfig {
    /// Keep every sample (no down-sampling)
    pub fn full_resolution() -> Self {
        Self {
            target_cap: usize::MAX,
            ..Self::default()
        }
    }

    /// Reject values the pipeline cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        at_least_one("target_cap", self.target_cap)?;
        at_least_one("batch_size", self.batch_size)?;
        if !(self.significant_change.is_finite() && self.significant_change >= 0.0) {
            return Err(ConfigError::NotPositive {
                field: "significant_change",
                value: self.significant_change,
            });
        }
        if self.precision > MAX_PRECISION {
            return Err(ConfigError::Precision {
                value: self.precision,
                max: MAX_PRECISION,
            });
        }
        Ok(())
    }

    /// Every Nth sample kept by down-sampling `total` samples
    pub(crate) fn stride(&self, total: usize) -> usize {
        (total / self.target_cap.max(1)).max(1)
    }
}

/// Configuration for milestone, rate-of-rise and chart computations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Centered mean window applied to temperatures before differentiation
    pub pre_window: usize,

    /// Centered mean window applied to admitted rates
    pub post_window: usize,

    /// Largest admissible rate of rise, degrees per minute
    pub ceiling_per_min: f64,

    /// Sample distance used by the point-estimate rate of rise
    pub lookback: usize,

    /// A milestone flags a chart point within this many seconds
    pub milestone_tolerance_s: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            pre_window: 15,
            post_window: 10,
            ceiling_per_min: 50.0,
            lookback: 5,
            milestone_tolerance_s: 1.0,
        }
    }
}

impl AnalyticsConfig {
    /// Lighter smoothing for responsive live displays
    pub fn responsive() -> Self {
        Self {
            pre_window: 5,
            post_window: 3,
            ..Self::default()
        }
    }

    /// Reject windows and thresholds the analytics cannot use
    pub fn validate(&self) -> Result<(), ConfigError> {
        at_least_one("pre_window", self.pre_window)?;
        at_least_one("post_window", self.post_window)?;
        at_least_one("lookback", self.lookback)?;
        positive("ceiling_per_min", self.ceiling_per_min)?;
        if !(self.milestone_tolerance_s.is_finite() && self.milestone_tolerance_s >= 0.0) {
            return Err(ConfigError::NotPositive {
                field: "milestone_tolerance_s",
                value: self.milestone_tolerance_s,
            });
        }
        Ok(())
    }
}
