//! Command handler modules for the CLI.

mod cleanup;
mod completions;
mod config;
mod host;
mod launch;
mod profile;
mod user;

use std::path::Path;

use crate::cli::Commands;
use crate::error::CliError;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(config_path: Option<&Path>, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::User(subcmd) => user::cmd_user(config_path, subcmd),
        Commands::Host(subcmd) => host::cmd_host(config_path, subcmd),
        Commands::Launch { host, user } => {
            launch::cmd_launch(config_path, &host, user.as_deref())
        }
        Commands::Profile { host, user } => {
            profile::cmd_profile(config_path, &host, user.as_deref())
        }
        Commands::Cleanup => cleanup::cmd_cleanup(config_path),
        Commands::Config(subcmd) => config::cmd_config(config_path, subcmd),
        Commands::Completions { shell } => completions::cmd_completions(shell),
    }
}
