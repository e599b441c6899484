mod app;
mod cli;
mod config;
mod consts;
mod core;
mod error;
mod logging;
mod output;
mod pricing;
mod source;
mod utils;
mod watcher;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use cli::Cli;
use config::Config;

fn main() -> ExitCode {
    let cli = Cli::parse().with_config(&Config::load());

    // Snapshot output owns stdout, the live dashboard owns the whole terminal
    let _log_guard = match logging::init(cli.debug, cli.one_shot()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: {e}");
            None
        }
    };

    for note in &cli.notes {
        info!("{note}");
    }
    for warning in &cli.warnings {
        warn!("{warning}");
    }

    match app::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
