use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::AnalyticsConfig;
use crate::model::{Event, PhaseMetrics, RoastId, TemperatureSample};

use super::{analyze, RoastAnalysis};

/// Stored records of one roast to compare
#[derive(Debug, Clone, Copy)]
pub struct RoastRecords<'a> {
    /// Roast identifier
    pub roast_id: &'a RoastId,
    /// Samples ordered by time
    pub samples: &'a [TemperatureSample],
    /// Events ordered by time
    pub events: &'a [Event],
}

/// Comparison row for one roast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoastComparison {
    /// Roast identifier
    pub roast_id: RoastId,
    /// Phase breakdown
    pub metrics: PhaseMetrics,
    /// Highest smoothed rate of rise, degrees per minute
    pub peak_ror: Option<f64>,
    /// Mean smoothed rate of rise, degrees per minute
    pub mean_ror: Option<f64>,
    /// Development time after first crack, seconds
    pub development_time_s: f64,
    /// Number of samples analyzed
    pub sample_count: usize,
}

impl RoastComparison {
    fn from_analysis(roast_id: &RoastId, sample_count: usize, analysis: RoastAnalysis) -> Self {
        let rates: Vec<f64> = analysis.ror.iter().map(|p| p.rate_per_min).collect();
        let peak_ror = rates.iter().copied().reduce(f64::max);
        let mean_ror = (!rates.is_empty()).then(|| rates.iter().sum::<f64>() / rates.len() as f64);
        Self {
            roast_id: roast_id.clone(),
            development_time_s: analysis.metrics.development_time_s(),
            metrics: analysis.metrics,
            peak_ror,
            mean_ror,
            sample_count,
        }
    }
}

/// Analyze every roast and return one comparison row each, in input order.
///
/// With the `parallel` feature the roasts are analyzed on the rayon pool.
pub fn compare_roasts(roasts: &[RoastRecords<'_>], config: &AnalyticsConfig) -> Vec<RoastComparison> {
    let row = |records: &RoastRecords<'_>| {
        let analysis = analyze(records.samples, records.events, config);
        RoastComparison::from_analysis(records.roast_id, records.samples.len(), analysis)
    };

    #[cfg(feature = "parallel")]
    {
        roasts.par_iter().map(row).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        roasts.iter().map(row).collect()
    }
}
