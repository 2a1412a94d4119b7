use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use roastline::literal::parse_document;
use roastline::validator::validate_document;

/// Validate a roast log document without importing it
pub fn run(file: PathBuf) -> Result<()> {
    info!("Roast Log Validator");
    info!("===================");
    info!("File: {}", file.display());
    info!("");

    let text = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let parsed = match parse_document(&text) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
    };
    for warning in &parsed.warnings {
        println!("Repaired: {}", warning);
    }

    let report = validate_document(&parsed.value, file.display().to_string());

    // Use colorized output if available
    #[cfg(feature = "colorized_output")]
    {
        println!("{}", report.format_colored());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("{}", report);
    }

    // Exit with error code if validation failed
    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}
