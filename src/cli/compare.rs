use anyhow::{Context, Result};
use log::info;

use roastline::analytics::{compare_roasts, RoastComparison, RoastRecords};
use roastline::model::RoastId;
use roastline::store::TelemetryStore;
use roastline::view::RoastView;

use super::{roast_id as parse_roast_id, Session};

/// Compare phase breakdown and rate of rise across roasts
pub fn run(session: &Session, roast_ids: Vec<String>, json: bool) -> Result<()> {
    let store = session.open_store()?;
    let ids: Vec<RoastId> = if roast_ids.is_empty() {
        store.roast_ids().context("Failed to list roasts")?
    } else {
        roast_ids.iter().map(|raw| parse_roast_id(raw)).collect::<Result<_>>()?
    };
    if ids.is_empty() {
        println!("No roasts to compare");
        return Ok(());
    }

    let views = ids
        .iter()
        .map(|id| RoastView::load(&store, id).with_context(|| format!("Failed to read roast {}", id)))
        .collect::<Result<Vec<_>>>()?;
    let events: Vec<_> = views.iter().map(RoastView::events).collect();
    let records: Vec<RoastRecords<'_>> = views
        .iter()
        .zip(&events)
        .map(|(view, events)| RoastRecords {
            roast_id: &view.roast_id,
            samples: &view.samples,
            events,
        })
        .collect();

    let rows = compare_roasts(&records, &session.config().analytics);
    info!("Compared {} roasts", rows.len());

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print_table(&rows);
    }
    Ok(())
}

fn print_table(rows: &[RoastComparison]) {
    println!(
        "{:<24} {:>8} {:>8} {:>8} {:>8} {:>8} {:>9} {:>9}",
        "roast", "total_s", "dry%", "mail%", "dev%", "dev_s", "peak_ror", "mean_ror"
    );
    for row in rows {
        let m = &row.metrics;
        println!(
            "{:<24} {:>8.0} {:>8.2} {:>8.2} {:>8.2} {:>8.0} {:>9} {:>9}",
            row.roast_id.as_str(),
            m.total_duration_s,
            m.drying_pct,
            m.maillard_pct,
            m.development_pct,
            row.development_time_s,
            rate(row.peak_ror),
            rate(row.mean_ror)
        );
    }
}

fn rate(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}
