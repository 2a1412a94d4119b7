//! # Chart data
//!
//! Render-ready views over stored records. Nothing here is persisted.
//!
//! - [`assemble_chart`] merges the sample series with sparse control events
//!   (carry-forward) and milestone markers into one [`ChartPoint`] per sample
//! - [`build_value_series`] groups control events per channel with a value
//!   range and a suggested axis [`ScaleClass`]
//!
//! ```
//! use roastline::chart::assemble_chart;
//! use roastline::config::AnalyticsConfig;
//! use roastline::model::{Event, Provenance, RoastId, TemperatureSample};
//!
//! let id = RoastId::new("demo").unwrap();
//! let samples: Vec<_> = [0.0, 30.0, 60.0]
//!     .iter()
//!     .map(|&t| TemperatureSample::new(id.clone(), t, Some(150.0), None, Provenance::Live))
//!     .collect();
//! let events = vec![
//!     Event::control(id.clone(), "fan", 0.0, 200, 5.0, Provenance::Live),
//!     Event::control(id.clone(), "fan", 45.0, 200, 8.0, Provenance::Live),
//! ];
//! let chart = assemble_chart(&samples, &events, &AnalyticsConfig::default());
//! assert_eq!(chart.iter().map(|p| p.fan).collect::<Vec<_>>(), vec![5.0, 5.0, 8.0]);
//! ```

mod assembler;
mod series;

pub use assembler::{assemble_chart, ChartPoint, ControlChannel};
pub use series::{build_value_series, EventValueSeries, ScaleClass};
