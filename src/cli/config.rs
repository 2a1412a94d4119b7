//! TOML configuration file support.
//!
//! Every table and key is optional; anything missing keeps its default, and
//! command-line flags override the file.
//!
//! ```toml
//! # roastline.toml
//! [import]
//! target_cap = 900
//! significant_change = 1.5
//! batch_size = 250
//!
//! [analytics]
//! pre_window = 9
//! ceiling_per_min = 40.0
//!
//! [store]
//! compression_level = 9
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use roastline::config::{AnalyticsConfig, ImportConfig};
use roastline::store::StoreConfig;

/// Root configuration structure for roastline.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Import pipeline settings.
    #[serde(default)]
    pub import: ImportConfig,

    /// Rate-of-rise and chart settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Parquet part file settings.
    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Reject out-of-range values before any command runs.
    pub fn validate(&self) -> Result<()> {
        self.import.validate().context("Invalid [import] settings")?;
        self.analytics.validate().context("Invalid [analytics] settings")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [import]
            target_cap = 900
            significant_change = 1.5
            precision = 2
            batch_size = 250

            [analytics]
            pre_window = 9
            post_window = 4
            ceiling_per_min = 40.0
            lookback = 3
            milestone_tolerance_s = 2.0

            [store]
            compression_level = 9
            row_group_size = 4096
            write_statistics = false
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.import.target_cap, 900);
        assert_eq!(config.import.significant_change, 1.5);
        assert_eq!(config.import.precision, 2);
        assert_eq!(config.import.batch_size, 250);
        assert_eq!(config.analytics.pre_window, 9);
        assert_eq!(config.analytics.post_window, 4);
        assert_eq!(config.analytics.ceiling_per_min, 40.0);
        assert_eq!(config.analytics.lookback, 3);
        assert_eq!(config.analytics.milestone_tolerance_s, 2.0);
        assert_eq!(config.store.compression_level, 9);
        assert_eq!(config.store.row_group_size, 4096);
        assert!(!config.store.write_statistics);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [analytics]
            ceiling_per_min = 45.0
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.analytics.ceiling_per_min, 45.0);
        assert_eq!(config.analytics.pre_window, 15);
        assert_eq!(config.import, ImportConfig::default());
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.import.target_cap, 600);
        assert_eq!(config.store.compression_level, 3);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = Config::from_str("[import]\nbatch_size = 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(format!("{:#}", err).contains("batch_size"));
    }
}
