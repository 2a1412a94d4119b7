use anyhow::{Context, Result};

use roastline::analytics::{extract_milestones, rate_of_rise, rate_of_rise_at};
use roastline::config::AnalyticsConfig;
use roastline::model::TemperatureSample;
use roastline::view::RoastView;

use super::{roast_id as parse_roast_id, Session};

/// Print the rate-of-rise curve, or a point estimate, for one roast
pub fn run(session: &Session, roast_id: &str, responsive: bool, at: Option<f64>) -> Result<()> {
    let id = parse_roast_id(roast_id)?;
    let base = session.config().analytics.clone();
    let config = if responsive {
        let live = AnalyticsConfig::responsive();
        AnalyticsConfig {
            pre_window: live.pre_window,
            post_window: live.post_window,
            ..base
        }
    } else {
        base
    };

    let store = session.open_store()?;
    let view = RoastView::load(&store, &id).with_context(|| format!("Failed to read roast {}", id))?;

    if let Some(time_s) = at {
        let Some(index) = nearest_index(&view.samples, time_s) else {
            anyhow::bail!("No samples stored for roast {}", id);
        };
        let sample = &view.samples[index];
        match rate_of_rise_at(&view.samples, index, &config) {
            Some(rate) => println!("{:.1}s  {:.2} °C/min", sample.time_s, rate),
            None => println!("{:.1}s  - (not enough history)", sample.time_s),
        }
        return Ok(());
    }

    let milestones = extract_milestones(&view.milestone_events, &view.samples);
    let curve = rate_of_rise(&view.samples, &milestones, &config);
    if curve.is_empty() {
        println!("No rate of rise: too few admissible readings for roast {}", id);
        return Ok(());
    }

    println!("{:>8}  {:>10}", "time_s", "°C/min");
    for point in &curve {
        println!("{:>8.1}  {:>10.2}", point.time_s, point.rate_per_min);
    }
    Ok(())
}

/// Index of the sample closest in time, the earlier one on a tie
fn nearest_index(samples: &[TemperatureSample], time_s: f64) -> Option<usize> {
    let after = samples.partition_point(|s| s.time_s < time_s);
    match (after.checked_sub(1), samples.get(after)) {
        (None, None) => None,
        (Some(before), None) => Some(before),
        (None, Some(_)) => Some(after),
        (Some(before), Some(next)) => {
            if time_s - samples[before].time_s <= next.time_s - time_s {
                Some(before)
            } else {
                Some(after)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roastline::model::{Provenance, RoastId};

    #[test]
    fn test_nearest_index() {
        let id = RoastId::new("n").unwrap();
        let samples: Vec<_> = [0.0, 10.0, 20.0]
            .iter()
            .map(|t| TemperatureSample::new(id.clone(), *t, Some(100.0), None, Provenance::Live))
            .collect();

        assert_eq!(nearest_index(&samples, -5.0), Some(0));
        assert_eq!(nearest_index(&samples, 4.0), Some(0));
        assert_eq!(nearest_index(&samples, 5.0), Some(0));
        assert_eq!(nearest_index(&samples, 6.0), Some(1));
        assert_eq!(nearest_index(&samples, 20.0), Some(2));
        assert_eq!(nearest_index(&samples, 99.0), Some(2));
        assert_eq!(nearest_index(&[], 1.0), None);
    }
}
