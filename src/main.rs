mod charts;
mod cli;
mod error;
mod fmt;
mod loader;
mod models;
mod settings;
mod stats;
mod tui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn init_tracing() {
    let filter = EnvFilter::try_from_env("AUTOSALES_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        None => cli::dashboard::run(None),
        Some(Commands::Dashboard { file }) => cli::dashboard::run(file),
        Some(Commands::Report(args)) => cli::report::run(args),
        Some(Commands::Status { file }) => cli::status::run(file),
        Some(Commands::Load { path }) => cli::load::run(&path),
        Some(Commands::Demo { output, seed }) => cli::demo::run(output, seed),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
