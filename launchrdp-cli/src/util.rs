//! Shared utility functions used across command modules.

use std::io::Read as _;
use std::path::Path;

use launchrdp_core::config::{AppSettings, ConfigManager};
use launchrdp_core::models::{Host, User};
use launchrdp_core::service::{CredentialSyncReport, LaunchService};
use secrecy::SecretString;
use zeroize::Zeroizing;

use crate::cli::PasswordArgs;
use crate::error::CliError;

/// Creates a `ConfigManager` using the optional custom config directory
/// from CLI args.
pub fn create_config_manager(config_path: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_path {
        Some(path) => Ok(ConfigManager::with_config_dir(path.to_path_buf())),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Loads `settings.toml` from the config directory
pub fn load_settings(config_manager: &ConfigManager) -> Result<AppSettings, CliError> {
    config_manager
        .load_settings()
        .map_err(|e| CliError::Config(format!("Failed to load settings: {e}")))
}

/// Builds the service for this machine from the CLI config directory
pub fn create_service(config_path: Option<&Path>) -> Result<LaunchService, CliError> {
    let config_manager = create_config_manager(config_path)?;
    let settings = load_settings(&config_manager)?;
    Ok(LaunchService::for_platform(&config_manager, &settings))
}

/// Find a host by name or ID
pub fn find_host<'a>(hosts: &'a [Host], name_or_id: &str) -> Result<&'a Host, CliError> {
    find_entry(hosts, name_or_id, |h| &h.name, |h| &h.id)
        .map_err(|e| e.into_error("host", CliError::HostNotFound))
}

/// Find a user by username or ID
pub fn find_user<'a>(users: &'a [User], name_or_id: &str) -> Result<&'a User, CliError> {
    find_entry(users, name_or_id, |u| &u.username, |u| &u.id)
        .map_err(|e| e.into_error("user", CliError::UserNotFound))
}

enum LookupError {
    Missing(String),
    Ambiguous(String, Vec<String>),
}

impl LookupError {
    fn into_error(self, kind: &str, missing: fn(String) -> CliError) -> CliError {
        match self {
            Self::Missing(query) => missing(query),
            Self::Ambiguous(query, names) => CliError::Ambiguous(format!(
                "Ambiguous {kind} name '{query}'. Matches: {}",
                names.join(", ")
            )),
        }
    }
}

/// Exact name, then ID, then case-insensitive name, then unique prefix
fn find_entry<'a, T>(
    items: &'a [T],
    query: &str,
    name: impl Fn(&T) -> &String,
    id: impl Fn(&T) -> &String,
) -> Result<&'a T, LookupError> {
    if let Some(item) = items.iter().find(|i| name(*i) == query) {
        return Ok(item);
    }

    if let Some(item) = items.iter().find(|i| id(*i) == query) {
        return Ok(item);
    }

    if let Some(item) = items.iter().find(|i| name(*i).eq_ignore_ascii_case(query)) {
        return Ok(item);
    }

    let prefix = query.to_lowercase();
    let matches: Vec<_> = items
        .iter()
        .filter(|i| !prefix.is_empty() && name(*i).to_lowercase().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [] => Err(LookupError::Missing(query.to_string())),
        [only] => Ok(*only),
        _ => Err(LookupError::Ambiguous(
            query.to_string(),
            matches.iter().map(|i| name(*i).clone()).collect(),
        )),
    }
}

/// Reads a new password as requested by the flags, if any
pub fn read_password(args: PasswordArgs, label: &str) -> Result<Option<SecretString>, CliError> {
    if args.password_stdin {
        let mut input = Zeroizing::new(String::new());
        std::io::stdin().read_to_string(&mut *input)?;
        return Ok(Some(secret_from_line(&input)));
    }
    if args.ask_password {
        eprint!("Enter password for '{label}': ");
        let password = Zeroizing::new(
            rpassword::read_password()
                .map_err(|e| CliError::InvalidInput(format!("Failed to read password: {e}")))?,
        );
        return Ok(Some(secret_from_line(&password)));
    }
    Ok(None)
}

/// Copies `line` without its line ending into a secret; the caller wipes `line`
fn secret_from_line(line: &str) -> SecretString {
    SecretString::from(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Prints a warning for each host whose credential could not be synced
pub fn report_sync(report: &CredentialSyncReport) {
    if let Some(reason) = &report.skipped {
        eprintln!("Warning: credential sync skipped: {reason}");
    }
    for (address, error) in report.failed_addresses.iter().zip(&report.errors) {
        eprintln!("Warning: credential for {address} not updated: {error}");
    }
    if report.migrated {
        tracing::info!("Stored password re-encrypted with the current codec");
    }
}
