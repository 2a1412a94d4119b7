//! # roastline
//!
//! Command-line front end for the roastline library: import third-party roast
//! logs into a local Parquet store, validate documents, and print analytics.
//!
//! ## Usage
//!
//! ```bash
//! # Import a roast log (roast id defaults to the file stem)
//! roastline --store ./roasts import kenya-aa.alog
//!
//! # Check a document without importing it
//! roastline validate kenya-aa.alog
//!
//! # Chart data as CSV, rate of rise, and a cross-roast comparison
//! roastline --store ./roasts chart kenya-aa --format csv -o kenya-aa.csv
//! roastline --store ./roasts ror kenya-aa
//! roastline --store ./roasts compare
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
