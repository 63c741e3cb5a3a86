//! Application directories and settings persistence

use std::fs;
use std::path::{Path, PathBuf};

use super::AppSettings;
use crate::error::{ConfigError, ConfigResult};
use crate::session::LauncherConfig;
use crate::store::Storage;
use crate::tracing::{TracingConfig, TracingOutput};

const VENDOR_DIR: &str = "Lancer";
const APP_DIR: &str = "LaunchRDP";
const SETTINGS_FILE: &str = "settings.toml";
const TEMP_DIR: &str = "temp";
const LOGS_DIR: &str = "logs";
const LOG_FILE: &str = "launchrdp.log";

/// Locates the configuration and data directories and reads settings
///
/// By default entity files and settings live in the roaming configuration
/// directory (`%APPDATA%\Lancer\LaunchRDP`) while generated profiles and logs
/// live in the local data directory (`%LOCALAPPDATA%\Lancer\LaunchRDP`).
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl ConfigManager {
    /// Uses the platform's per-user directories
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoDirectory` if the platform reports no
    /// configuration or local data directory.
    pub fn new() -> ConfigResult<Self> {
        let config_root = dirs::config_dir().ok_or(ConfigError::NoDirectory("configuration"))?;
        let data_root = dirs::data_local_dir().ok_or(ConfigError::NoDirectory("local data"))?;
        Ok(Self {
            config_dir: config_root.join(VENDOR_DIR).join(APP_DIR),
            data_dir: data_root.join(VENDOR_DIR).join(APP_DIR),
        })
    }

    /// Keeps everything below a single directory
    #[must_use]
    pub fn with_config_dir(dir: PathBuf) -> Self {
        Self {
            data_dir: dir.clone(),
            config_dir: dir,
        }
    }

    /// Directory holding `users.json`, `hosts.json` and `settings.toml`
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Directory receiving generated connection profiles
    #[must_use]
    pub fn temp_dir(&self) -> PathBuf {
        self.data_dir.join(TEMP_DIR)
    }

    /// Directory receiving log files
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join(LOGS_DIR)
    }

    /// Path of the settings file
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Creates every directory
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::CreateDir` for the first directory that cannot be created.
    pub fn ensure_dirs(&self) -> ConfigResult<()> {
        for dir in [self.config_dir.clone(), self.temp_dir(), self.logs_dir()] {
            fs::create_dir_all(&dir).map_err(|source| ConfigError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Reads `settings.toml`, returning defaults when it does not exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read and
    /// `ConfigError::Parse` if it is not valid.
    pub fn load_settings(&self) -> ConfigResult<AppSettings> {
        let path = self.settings_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(AppSettings::default());
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Writes `settings.toml`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Serialize` or `ConfigError::Io` on failure.
    pub fn save_settings(&self, settings: &AppSettings) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(settings).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        let path = self.settings_path();
        fs::create_dir_all(&self.config_dir).map_err(|source| ConfigError::CreateDir {
            path: self.config_dir.clone(),
            source,
        })?;
        fs::write(&path, content).map_err(|source| ConfigError::Io { path, source })
    }

    /// Opens the entity store in the configuration directory
    #[must_use]
    pub fn storage(&self) -> Storage {
        Storage::new(&self.config_dir)
    }

    /// Launcher configuration for the given settings
    #[must_use]
    pub fn launcher_config(&self, settings: &AppSettings) -> LauncherConfig {
        LauncherConfig {
            client_program: settings.launcher.client_program.clone(),
            window_class: settings.launcher.session_window_class.clone(),
            profile_dir: self.temp_dir(),
        }
    }

    /// Tracing configuration for the given settings
    #[must_use]
    pub fn tracing_config(&self, settings: &AppSettings) -> TracingConfig {
        let output = if settings.logging.log_to_file {
            TracingOutput::File {
                path: self.logs_dir().join(LOG_FILE),
            }
        } else {
            TracingOutput::Stderr
        };
        TracingConfig::new()
            .with_level(settings.logging.tracing_level())
            .with_output(output)
    }
}
