pub mod dashboard;
pub mod demo;
pub mod load;
pub mod report;
pub mod status;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "autosales",
    version,
    about = "Automobile sales statistics dashboard for the terminal."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive statistics dashboard.
    Dashboard {
        /// Sales CSV to use instead of the configured data file
        #[arg(long)]
        file: Option<String>,
    },
    /// Compute one report and print it.
    Report(ReportArgs),
    /// Show the configured data file and a summary of its contents.
    Status {
        /// Sales CSV to use instead of the configured data file
        #[arg(long)]
        file: Option<String>,
    },
    /// Switch to a different sales CSV.
    Load {
        /// Path to the sales CSV
        path: String,
    },
    /// Write a synthetic sales CSV and switch to it.
    Demo {
        /// Output path (default: <data dir>/demo_automobile_sales.csv)
        #[arg(long)]
        output: Option<String>,
        /// Random seed for the generated figures
        #[arg(long, default_value = "1980")]
        seed: u64,
    },
}

#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Report type: yearly or recession
    #[arg(long = "type")]
    pub report_type: Option<String>,
    /// Year for the yearly report
    #[arg(long)]
    pub year: Option<String>,
    /// Output format: table or json
    #[arg(long)]
    pub format: Option<String>,
    /// Write to this file instead of stdout
    #[arg(long)]
    pub output: Option<String>,
    /// Sales CSV to use instead of the configured data file
    #[arg(long)]
    pub file: Option<String>,
}
