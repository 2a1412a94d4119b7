use anyhow::{Context, Result};
use log::info;

use roastline::analytics::analyze;
use roastline::model::{Event, MilestoneKind, Provenance, RoastId, TemperatureSample};
use roastline::store::{LiveCapture, TelemetryStore};
use roastline::view::RoastView;

use super::{roast_id as parse_roast_id, Session};

/// Samples appended per live write
const CHUNK_SECONDS: u32 = 30;

/// Bean temperature at charge and at the turning point, °C
const CHARGE_TEMP: f64 = 200.0;
const TURNING_TEMP: f64 = 92.0;
const TURNING_S: f64 = 90.0;
const DROP_TEMP: f64 = 210.0;

/// Simulate a live roast and capture it into the store
pub fn run(session: &Session, roast_id: &str, duration: u32, interval: u32) -> Result<()> {
    info!("roastline - Live Capture Demo");
    info!("=============================");

    let id = parse_roast_id(roast_id)?;
    if f64::from(duration) <= TURNING_S {
        anyhow::bail!("Demo roast must last longer than {}s", TURNING_S);
    }
    let interval = interval.max(1);

    let store = session.open_store()?;
    let removed = store
        .delete_by_provenance(&id, Provenance::Live)
        .context("Failed to clear previous live capture")?;
    if removed.samples + removed.events > 0 {
        info!("Cleared {} samples and {} events from a previous run", removed.samples, removed.events);
    }

    let (samples, events) = simulate(&id, duration, interval);
    info!("Simulated {} samples and {} events", samples.len(), events.len());

    let mut capture = LiveCapture::open(&store, id.clone()).context("Failed to start live capture")?;
    let mut next_event = 0;
    for chunk in samples.chunks((CHUNK_SECONDS / interval).max(1) as usize) {
        let Some(last) = chunk.last() else { continue };
        capture.append_samples(chunk).context("Failed to append samples")?;

        let due = events[next_event..].partition_point(|e| e.time_s <= last.time_s);
        if due > 0 {
            capture
                .append_events(&events[next_event..next_event + due])
                .context("Failed to append events")?;
            next_event += due;
        }
    }
    if next_event < events.len() {
        capture.append_events(&events[next_event..]).context("Failed to append events")?;
    }
    let (samples_written, events_written) = capture.written();

    let analysis = analyze(&samples, &events, &session.config().analytics);
    let stored = RoastView::load(&store, &id).context("Failed to read back the capture")?;
    store
        .upsert_summary(&stored.summarize())
        .context("Failed to write summary")?;

    println!("Captured roast {}", id);
    println!("  Samples: {}", samples_written);
    println!("  Events: {}", events_written);
    println!(
        "  Phases: drying {:.2}%, maillard {:.2}%, development {:.2}%",
        analysis.metrics.drying_pct, analysis.metrics.maillard_pct, analysis.metrics.development_pct
    );
    if let Some(peak) = analysis.ror.iter().map(|p| p.rate_per_min).reduce(f64::max) {
        println!("  Peak rate of rise: {:.1} °C/min", peak);
    }

    Ok(())
}

/// Synthetic roast: the bean probe falls to a turning point, then climbs to
/// the drop temperature; the air and burner settings step at the milestones.
fn simulate(id: &RoastId, duration: u32, interval: u32) -> (Vec<TemperatureSample>, Vec<Event>) {
    let total = f64::from(duration);
    let dry_end = (total * 0.45).round();
    let fc_start = (total * 0.82).round();

    let samples = (0..=duration)
        .step_by(interval as usize)
        .map(|t| {
            let t = f64::from(t);
            let primary = bean_temperature(t, total);
            let secondary = 220.0 + 20.0 * (t / total);
            TemperatureSample::new(id.clone(), t, Some(round1(primary)), Some(round1(secondary)), Provenance::Live)
        })
        .collect();

    let live = Provenance::Live;
    let mut events = vec![
        Event::milestone(id.clone(), MilestoneKind::Charge, 0.0, live),
        Event::control(id.clone(), "air", 0.0, 0, 3.0, live),
        Event::control(id.clone(), "burner", 0.0, 3, 80.0, live),
        Event::milestone(id.clone(), MilestoneKind::DryEnd, dry_end, live),
        Event::control(id.clone(), "air", dry_end, 0, 5.0, live),
        Event::control(id.clone(), "burner", fc_start - 60.0, 3, 65.0, live),
        Event::milestone(id.clone(), MilestoneKind::FcStart, fc_start, live),
        Event::control(id.clone(), "air", fc_start, 0, 7.0, live),
        Event::control(id.clone(), "burner", fc_start, 3, 45.0, live),
        Event::milestone(id.clone(), MilestoneKind::Drop, total, live),
    ];
    events.sort_by(|a, b| a.time_s.total_cmp(&b.time_s));
    (samples, events)
}

fn bean_temperature(t: f64, total: f64) -> f64 {
    if t <= TURNING_S {
        CHARGE_TEMP - (CHARGE_TEMP - TURNING_TEMP) * (t / TURNING_S).sqrt()
    } else {
        let progress = (t - TURNING_S) / (total - TURNING_S);
        TURNING_TEMP + (DROP_TEMP - TURNING_TEMP) * progress.powf(0.75)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
