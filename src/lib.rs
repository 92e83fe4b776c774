//! scanclock library root.
//! Exposes the CLI parser, the high-level run() function, and the kiosk
//! session modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod logging;
pub mod models;
pub mod store;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use std::path::Path;
use utils::path::expand_tilde;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config, config_path: &Path) -> AppResult<()> {
    match &cli.command {
        Commands::Init { .. } => cli::commands::init::handle(&cli.command, cfg, config_path),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg, config_path),
        Commands::Kiosk { .. } => cli::commands::kiosk::handle(&cli.command, cfg),
        Commands::Status { .. } => cli::commands::status::handle(&cli.command, cfg),
        Commands::Summary { .. } => cli::commands::summary::handle(&cli.command, cfg),
        Commands::Prune { .. } => cli::commands::prune::handle(&cli.command, cfg),
        Commands::SignOutAll { .. } => cli::commands::signout::handle(&cli.command, cfg),
        Commands::Backup => cli::commands::backup::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();
    logging::init();

    let config_path = match &cli.config {
        Some(path) => expand_tilde(path),
        None => Config::config_file(),
    };

    // Load the configuration once; `init` may still be creating it.
    let mut cfg = Config::load_from(&config_path)?;

    if let Some(data) = &cli.data {
        cfg.data_file = data.clone();
    }

    dispatch(&cli, &cfg, &config_path)
}
