//! `LaunchRDP` CLI - Command-line interface for the `LaunchRDP` launcher
//!
//! Manages stored users and hosts, keeps the Windows credential vault in
//! step with them, and opens Remote Desktop sessions.

mod cli;
mod commands;
mod error;
mod util;

use std::path::Path;

use clap::Parser;
use cli::Cli;
use launchrdp_core::tracing::{TracingLevel, init_tracing};

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    init_logging(config_path, cli.verbose, cli.quiet);

    let result = commands::dispatch(config_path, cli.command);

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}

/// Starts tracing from `settings.toml`, raised by `-v` and lowered by `-q`
///
/// Settings problems are reported by the command itself, so defaults are
/// used here.
fn init_logging(config_path: Option<&Path>, verbose: u8, quiet: bool) {
    let Ok(config_manager) = util::create_config_manager(config_path) else {
        return;
    };
    let settings = config_manager.load_settings().unwrap_or_default();
    let mut config = config_manager.tracing_config(&settings);
    config.level = TracingLevel::from_verbosity(config.level, verbose, quiet);

    if let Err(e) = init_tracing(&config) {
        eprintln!("Warning: logging disabled: {e}");
    }
}
