use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use roastline::model::{Provenance, RoastId};
use roastline::store::ParquetStore;

mod audit;
mod chart;
mod compare;
mod demo;
mod import;
mod info;
mod ror;
mod series;
mod validate;

mod config;

pub use config::Config;

/// roastline - Roast telemetry import and analytics
#[derive(Parser)]
#[command(name = "roastline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Store directory
    #[arg(short, long, global = true, value_name = "DIR", default_value = "roastline-store")]
    store: PathBuf,

    /// Load settings from a TOML config file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Provenance tag accepted on the command line
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ProvenanceArg {
    /// Bulk import of a third-party log
    #[default]
    Imported,
    /// Hand-entered records
    Manual,
}

impl From<ProvenanceArg> for Provenance {
    fn from(arg: ProvenanceArg) -> Self {
        match arg {
            ProvenanceArg::Imported => Provenance::Imported,
            ProvenanceArg::Manual => Provenance::Manual,
        }
    }
}

/// Output encoding for chart data
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ChartFormat {
    /// Pretty-printed JSON array
    #[default]
    Json,
    /// One CSV row per chart point
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Import roast log documents into the store
    Import {
        /// Roast log files
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Roast id (defaults to each file's stem; only valid with one file)
        #[arg(long)]
        roast_id: Option<String>,

        /// Provenance tag; re-importing replaces records with the same tag
        #[arg(short, long, default_value = "imported", value_enum)]
        provenance: ProvenanceArg,

        /// Keep every sample instead of down-sampling
        #[arg(long)]
        full_resolution: bool,

        /// Down-sampling target (samples kept, roughly)
        #[arg(long)]
        target_cap: Option<usize>,

        /// Rows per store insert
        #[arg(short = 'b', long)]
        batch_size: Option<usize>,

        /// Print each outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a roast log document without importing it
    Validate {
        /// Roast log file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List stored roasts, or summarize one
    Info {
        /// Roast id
        #[arg(value_name = "ROAST_ID")]
        roast_id: Option<String>,
    },

    /// Export chart data for a roast
    Chart {
        /// Roast id
        #[arg(value_name = "ROAST_ID")]
        roast_id: String,

        /// Output format
        #[arg(short, long, default_value = "json", value_enum)]
        format: ChartFormat,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print the rate-of-rise curve for a roast
    Ror {
        /// Roast id
        #[arg(value_name = "ROAST_ID")]
        roast_id: String,

        /// Use the lighter smoothing of live displays
        #[arg(long)]
        responsive: bool,

        /// Point estimate at the sample nearest this time (seconds)
        #[arg(long, value_name = "SECONDS")]
        at: Option<f64>,
    },

    /// Print the control channel value series for a roast
    Series {
        /// Roast id
        #[arg(value_name = "ROAST_ID")]
        roast_id: String,
    },

    /// Compare phase breakdown and rate of rise across roasts
    Compare {
        /// Roast ids (all stored roasts when omitted)
        #[arg(value_name = "ROAST_ID")]
        roast_ids: Vec<String>,

        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the import audit log
    Audit {
        /// Only entries for this roast
        #[arg(value_name = "ROAST_ID")]
        roast_id: Option<String>,
    },

    /// Simulate a live roast into the store
    Demo {
        /// Roast id to capture under
        #[arg(value_name = "ROAST_ID", default_value = "demo-roast")]
        roast_id: String,

        /// Roast length in seconds, charge to drop
        #[arg(short, long, default_value = "660")]
        duration: u32,

        /// Seconds between samples
        #[arg(short, long, default_value = "1")]
        interval: u32,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

/// Store location and loaded settings shared by every subcommand
pub struct Session {
    store_root: PathBuf,
    config: Config,
}

impl Session {
    fn new(store_root: PathBuf, config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        config.validate()?;
        Ok(Self { store_root, config })
    }

    /// Open the Parquet store, creating it when missing
    pub fn open_store(&self) -> Result<ParquetStore> {
        ParquetStore::open(&self.store_root, self.config.store.clone())
            .with_context(|| format!("Failed to open store: {}", self.store_root.display()))
    }

    /// Settings from the config file, or defaults
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Parse a roast id argument
pub fn roast_id(raw: &str) -> Result<RoastId> {
    RoastId::new(raw).with_context(|| format!("Invalid roast id: {:?}", raw))
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let session = Session::new(cli.store, cli.config.as_deref())?;

    match cli.command {
        Commands::Import {
            files,
            roast_id,
            provenance,
            full_resolution,
            target_cap,
            batch_size,
            json,
        } => import::run(
            &session,
            files,
            roast_id,
            Provenance::from(provenance),
            full_resolution,
            target_cap,
            batch_size,
            json,
        ),
        Commands::Validate { file } => validate::run(file),
        Commands::Info { roast_id } => info::run(&session, roast_id),
        Commands::Chart {
            roast_id,
            format,
            output,
        } => chart::run(&session, &roast_id, format, output),
        Commands::Ror {
            roast_id,
            responsive,
            at,
        } => ror::run(&session, &roast_id, responsive, at),
        Commands::Series { roast_id } => series::run(&session, &roast_id),
        Commands::Compare { roast_ids, json } => compare::run(&session, roast_ids, json),
        Commands::Audit { roast_id } => audit::run(&session, roast_id),
        Commands::Demo {
            roast_id,
            duration,
            interval,
        } => demo::run(&session, &roast_id, duration, interval),
    }
}
