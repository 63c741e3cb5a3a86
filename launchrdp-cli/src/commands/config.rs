//! Settings file and directory commands.

use std::path::{Path, PathBuf};

use launchrdp_core::config::{AppSettings, ConfigManager};
use serde::Serialize;

use crate::cli::ConfigCommands;
use crate::error::CliError;
use crate::util::{create_config_manager, load_settings};

/// Config command handler
pub fn cmd_config(config_path: Option<&Path>, subcmd: ConfigCommands) -> Result<(), CliError> {
    let config_manager = create_config_manager(config_path)?;
    match subcmd {
        ConfigCommands::Init { force } => cmd_config_init(&config_manager, force),
        ConfigCommands::Show => cmd_config_show(&config_manager),
    }
}

/// Creates the directories and writes `settings.toml` with default values
fn cmd_config_init(config_manager: &ConfigManager, force: bool) -> Result<(), CliError> {
    config_manager
        .ensure_dirs()
        .map_err(|e| CliError::Config(format!("Failed to create directories: {e}")))?;

    let path = config_manager.settings_path();
    if path.exists() && !force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists; use --force to overwrite it",
            path.display()
        )));
    }
    config_manager
        .save_settings(&AppSettings::default())
        .map_err(|e| CliError::Config(format!("Failed to save settings: {e}")))?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[derive(Serialize)]
struct ConfigOutput {
    config_dir: PathBuf,
    settings_file: PathBuf,
    profile_dir: PathBuf,
    logs_dir: PathBuf,
    settings: AppSettings,
}

fn cmd_config_show(config_manager: &ConfigManager) -> Result<(), CliError> {
    let output = ConfigOutput {
        config_dir: config_manager.config_dir().to_path_buf(),
        settings_file: config_manager.settings_path(),
        profile_dir: config_manager.temp_dir(),
        logs_dir: config_manager.logs_dir(),
        settings: load_settings(config_manager)?,
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))?;
    println!("{json}");
    Ok(())
}
