pub mod classify;
pub mod config;
pub mod export;
pub mod report;

use std::path::Path;

use clap::{Parser, Subcommand};

use crate::aggregator::RunConfig;
use crate::error::Result;
use crate::settings::load_settings;

/// Resolve settings from disk and apply per-run overrides.
pub(crate) fn run_config(config: Option<&str>, pct: Option<f64>, noise: &[String]) -> Result<RunConfig> {
    let mut settings = load_settings(config.map(Path::new))?;
    settings.noise_keywords.extend(noise.iter().cloned());
    let run = RunConfig::from_settings(&settings)?;
    match pct {
        Some(p) => run.with_pct(p),
        None => Ok(run),
    }
}

#[derive(Parser)]
#[command(
    name = "cuadre",
    about = "Consolidate a monthly cash-register workbook and compute commission payouts."
)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify every sheet of a workbook and print the payment and commission summaries.
    Report {
        /// Workbook (.xlsx, .xls, .ods) or a single-day .csv
        file: String,
        #[command(flatten)]
        run: RunArgs,
        /// Also print every retained transaction
        #[arg(long)]
        details: bool,
    },
    /// Write the consolidated tables to CSV/JSON and optionally copy them to a drive folder.
    Export {
        /// Workbook (.xlsx, .xls, .ods) or a single-day .csv
        file: String,
        #[command(flatten)]
        run: RunArgs,
        /// Output directory (default: current directory)
        #[arg(long)]
        output: Option<String>,
        /// File name stem (default: consolidated_YYYY-MM-DD_HH-MM)
        #[arg(long)]
        name: Option<String>,
        /// Folder to copy the exported files into, e.g. a synced Drive folder
        #[arg(long = "upload-to")]
        upload_to: Option<String>,
    },
    /// Show how a single register line would be classified.
    Classify {
        /// Description text as typed in the register
        description: String,
        /// Value of the optional Type column
        #[arg(long = "type")]
        type_hint: Option<String>,
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        cash: f64,
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        transfer: f64,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Inspect or create the settings file.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Commission percentage (0-100), overrides the settings file
    #[arg(long)]
    pub pct: Option<f64>,
    /// Settings file (default: ~/.config/cuadre/settings.json)
    #[arg(long)]
    pub config: Option<String>,
    /// Extra summary-row keyword to drop (repeatable)
    #[arg(long = "noise")]
    pub noise: Vec<String>,
}

impl RunArgs {
    pub fn resolve(&self) -> Result<RunConfig> {
        run_config(self.config.as_deref(), self.pct, &self.noise)
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings as JSON.
    Show {
        #[arg(long)]
        config: Option<String>,
    },
    /// Write default settings to the settings file.
    Init {
        #[arg(long)]
        config: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the default settings file location.
    Path,
}
