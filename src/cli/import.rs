use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};

use roastline::config::ImportConfig;
use roastline::import::{ImportError, ImportOutcome, Importer};
use roastline::model::{Provenance, RoastId};

use super::{roast_id as parse_roast_id, Session};

/// Import roast log documents
pub fn run(
    session: &Session,
    files: Vec<PathBuf>,
    roast_id: Option<String>,
    provenance: Provenance,
    full_resolution: bool,
    target_cap: Option<usize>,
    batch_size: Option<usize>,
    json: bool,
) -> Result<()> {
    if roast_id.is_some() && files.len() > 1 {
        bail!("--roast-id can only be used with a single input file");
    }

    let config = import_config(session.config().import.clone(), full_resolution, target_cap, batch_size);
    config.validate().context("Invalid import settings")?;

    let store = session.open_store()?;
    let importer = Importer::new(&store, config);

    let mut failed = 0usize;
    for file in &files {
        let id = match &roast_id {
            Some(raw) => parse_roast_id(raw)?,
            None => roast_id_from_path(file)?,
        };
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let label = file.file_name().map(|n| n.to_string_lossy().into_owned());

        match importer.import(&text, &id, provenance, label.as_deref()) {
            Ok(outcome) if json => println!("{}", serde_json::to_string_pretty(&outcome)?),
            Ok(outcome) => print_outcome(file, &outcome),
            Err(e) => {
                failed += 1;
                print_failure(file, &e);
            }
        }
    }

    info!("Imported {} of {} files", files.len() - failed, files.len());
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn import_config(
    base: ImportConfig,
    full_resolution: bool,
    target_cap: Option<usize>,
    batch_size: Option<usize>,
) -> ImportConfig {
    let mut config = if full_resolution {
        ImportConfig {
            target_cap: ImportConfig::full_resolution().target_cap,
            ..base
        }
    } else {
        base
    };
    if let Some(cap) = target_cap {
        config.target_cap = cap;
    }
    if let Some(size) = batch_size {
        config.batch_size = size;
    }
    config
}

/// Roast id from a file name: the stem up to the first dot
fn roast_id_from_path(path: &Path) -> Result<RoastId> {
    let stem = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .unwrap_or_default();
    parse_roast_id(stem)
        .with_context(|| format!("Cannot derive a roast id from {}; pass --roast-id", path.display()))
}

fn print_outcome(file: &Path, outcome: &ImportOutcome) {
    println!("{} -> {}", file.display(), outcome.roast_id);
    println!(
        "  Samples: {} written ({} in document)",
        outcome.samples_written, outcome.source_sample_count
    );
    println!("  Events: {} written", outcome.events_written);
    if outcome.replaced.samples + outcome.replaced.events > 0 {
        println!(
            "  Replaced: {} samples, {} events tagged {}",
            outcome.replaced.samples, outcome.replaced.events, outcome.provenance
        );
    }
    let milestones: Vec<String> = outcome
        .milestones
        .iter()
        .map(|(kind, mark)| format!("{}@{:.0}s", kind, mark.time_s()))
        .collect();
    if !milestones.is_empty() {
        println!("  Milestones: {}", milestones.join(", "));
    }
    let m = &outcome.metrics;
    println!(
        "  Phases: drying {:.2}%, maillard {:.2}%, development {:.2}%",
        m.drying_pct, m.maillard_pct, m.development_pct
    );
    for warning in &outcome.warnings {
        warn!("{}: {}", file.display(), warning);
    }
    println!("  Batch: {}", outcome.batch_id);
}

fn print_failure(file: &Path, error: &ImportError) {
    eprintln!("{}: import failed", file.display());
    match error {
        ImportError::Format(e) => {
            eprintln!("  - {} (line {}, column {})", e.message, e.line, e.column);
            eprintln!("  near: {}", e.context);
        }
        other => {
            for reason in other.reasons() {
                eprintln!("  - {}", reason);
            }
        }
    }
}
