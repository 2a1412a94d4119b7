use anyhow::{Context, Result};

use roastline::store::TelemetryStore;

use super::{roast_id as parse_roast_id, Session};

/// Show the import audit log, oldest first
pub fn run(session: &Session, roast_id: Option<String>) -> Result<()> {
    let id = roast_id.as_deref().map(parse_roast_id).transpose()?;
    let store = session.open_store()?;
    let entries = store.audit_log(id.as_ref()).context("Failed to read audit log")?;

    if entries.is_empty() {
        println!("No imports recorded");
        return Ok(());
    }

    for entry in &entries {
        println!(
            "{}  {}  {:<24} {:<9} {:>6} samples {:>4} events  {}",
            entry.started_at.format("%Y-%m-%d %H:%M:%S"),
            entry.batch_id,
            entry.roast_id.as_str(),
            entry.status.to_string(),
            entry.samples_written,
            entry.events_written,
            entry.source.label.as_deref().unwrap_or("-")
        );
        for reason in &entry.reasons {
            println!("    reason: {}", reason);
        }
        if !entry.warnings.is_empty() {
            println!("    {} warnings", entry.warnings.len());
        }
    }
    Ok(())
}
