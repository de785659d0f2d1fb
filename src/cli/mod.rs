pub mod codes;
pub mod uchrabvr;
pub mod uder;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::settings::Job;

pub(crate) fn config_path(config: Option<String>, job: Job) -> PathBuf {
    config
        .map(PathBuf::from)
        .unwrap_or_else(|| job.default_config_path())
}

#[derive(Parser)]
#[command(
    name = "galrecon",
    version,
    about = "Reconcile Galaktika payroll pre-posting exports."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fold RKSN allowances into their primary payment codes and write SQL updates.
    Uchrabvr {
        /// Settings file (default: ./uchrabvr.json)
        #[arg(long)]
        config: Option<String>,
        /// UCHRABVR export to read (overrides input_file)
        #[arg(long)]
        input: Option<String>,
        /// File for the generated UPDATE statements (overrides output_file_path)
        #[arg(long)]
        output: Option<String>,
        /// Do not wait for Enter after printing the checklist
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Check that income-tax withholdings balance to zero per month.
    Uder {
        /// Settings file (default: ./uder.json)
        #[arg(long)]
        config: Option<String>,
        /// UDER export to read (overrides input_file)
        #[arg(long)]
        input: Option<String>,
    },
    /// Validate and show the primary/secondary code table.
    Codes {
        /// Settings file (default: ./uchrabvr.json)
        #[arg(long)]
        config: Option<String>,
    },
}
