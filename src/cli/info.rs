use anyhow::{Context, Result};

use roastline::model::RoastId;
use roastline::store::TelemetryStore;
use roastline::view::RoastView;

use super::{roast_id as parse_roast_id, Session};

/// List stored roasts, or display one roast's summary
pub fn run(session: &Session, roast_id: Option<String>) -> Result<()> {
    let store = session.open_store()?;

    match roast_id {
        Some(raw) => describe(&store, &parse_roast_id(&raw)?),
        None => list(&store),
    }
}

fn list(store: &impl TelemetryStore) -> Result<()> {
    let ids = store.roast_ids().context("Failed to list roasts")?;
    println!("Stored Roasts");
    println!("=============");
    if ids.is_empty() {
        println!("  (none)");
        return Ok(());
    }

    for id in &ids {
        match store.summary(id).context("Failed to read summary")? {
            Some(summary) => println!(
                "  {:<32} {:>6} samples {:>4} events  {:>6.0}s",
                id.as_str(),
                summary.sample_count,
                summary.event_count,
                summary.metrics.total_duration_s
            ),
            None => println!("  {:<32} (no summary)", id.as_str()),
        }
    }
    Ok(())
}

fn describe(store: &impl TelemetryStore, id: &RoastId) -> Result<()> {
    let view = RoastView::load(store, id).with_context(|| format!("Failed to read roast {}", id))?;
    if view.samples.is_empty() && view.milestone_events.is_empty() && view.control_events.is_empty() {
        anyhow::bail!("No records stored for roast {}", id);
    }

    // Stored summaries are a cache; recompute when missing or stale.
    let (summary, source) = match view.current_summary() {
        Some(summary) => (summary.clone(), "cached"),
        None => (view.summarize(), "computed"),
    };
    let (milestones, metrics) = (summary.milestones, summary.metrics);

    let title = format!("Roast: {}", id);
    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    println!();

    println!("Records:");
    println!("  Samples: {}", view.samples.len());
    println!("  Milestone events: {}", view.milestone_events.len());
    println!("  Control events: {}", view.control_events.len());
    if let (Some(first), Some(last)) = (view.samples.first(), view.samples.last()) {
        println!("  Time span: {:.1}s - {:.1}s", first.time_s, last.time_s);
    }
    println!();

    println!("Milestones:");
    if milestones.is_empty() {
        println!("  (none recorded)");
    }
    for (kind, mark) in milestones.iter() {
        let temperature = mark
            .temperature
            .map(|t| format!("{:.1} °C", t))
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<10} {:>8.1}s  {}", kind.name(), mark.time_s(), temperature);
    }
    println!();

    println!("Phases ({}):", source);
    println!("  Total duration: {:.1}s", metrics.total_duration_s);
    println!("  Drying: {:.2}%", metrics.drying_pct);
    println!("  Maillard: {:.2}%", metrics.maillard_pct);
    println!("  Development: {:.2}%", metrics.development_pct);
    if let Some(fc) = metrics.first_crack_s {
        println!("  First crack after: {:.1}s", fc);
    }

    Ok(())
}
