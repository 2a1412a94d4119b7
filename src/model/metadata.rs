use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ModelError;

/// Temperature unit of a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemperatureUnit {
    /// Celsius (canonical)
    #[default]
    Celsius,
    /// Fahrenheit
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a reading in this unit to Celsius
    pub fn to_celsius(&self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => value,
            TemperatureUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        }
    }

    /// Convert a Celsius reading to this unit
    pub fn from_celsius(&self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => value,
            TemperatureUnit::Fahrenheit => value * 9.0 / 5.0 + 32.0,
        }
    }

    /// Single-letter indicator
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for TemperatureUnit {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "C" | "c" | "celsius" | "Celsius" => Ok(TemperatureUnit::Celsius),
            "F" | "f" | "fahrenheit" | "Fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            other => Err(ModelError::UnknownUnit(other.to_string())),
        }
    }
}

/// Green (in) and roasted (out) batch weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTriple {
    /// Green weight
    pub weight_in: f64,
    /// Roasted weight (0 when not yet weighed)
    pub weight_out: f64,
    /// Weight unit as written in the source (`g`, `kg`, `lb`...)
    pub unit: String,
}

impl WeightTriple {
    /// Weight loss in percent, when both weights are known
    pub fn loss_pct(&self) -> Option<f64> {
        if self.weight_in > 0.0 && self.weight_out > 0.0 && self.weight_out <= self.weight_in {
            Some((self.weight_in - self.weight_out) / self.weight_in * 100.0)
        } else {
            None
        }
    }
}

/// Descriptive metadata carried alongside an imported roast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoastMetadata {
    /// Roast title
    pub title: Option<String>,
    /// Roasting machine descriptor
    pub device: Option<String>,
    /// Unit the source document was recorded in
    pub source_unit: TemperatureUnit,
    /// Batch weights
    pub weight: Option<WeightTriple>,
    /// Bean description
    pub beans: Option<String>,
    /// Notes taken while roasting
    pub roasting_notes: Option<String>,
    /// Notes from cupping
    pub cupping_notes: Option<String>,
    /// Ambient temperature, canonical unit
    pub ambient_temperature: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversion() {
        let f = TemperatureUnit::Fahrenheit;
        assert!((f.to_celsius(212.0) - 100.0).abs() < 1e-9);
        assert!((f.to_celsius(32.0)).abs() < 1e-9);
        assert!((f.from_celsius(100.0) - 212.0).abs() < 1e-9);
        assert_eq!(TemperatureUnit::Celsius.to_celsius(200.0), 200.0);
    }

    #[test]
    fn test_weight_loss() {
        let w = WeightTriple {
            weight_in: 200.0,
            weight_out: 170.0,
            unit: "g".to_string(),
        };
        assert!((w.loss_pct().unwrap() - 15.0).abs() < 1e-9);

        let unweighed = WeightTriple {
            weight_out: 0.0,
            ..w
        };
        assert_eq!(unweighed.loss_pct(), None);
    }
}
