//! Configuration management for `LaunchRDP`
//!
//! This module provides the `ConfigManager` for locating application
//! directories and loading and saving `settings.toml`.

mod manager;
pub mod settings;

pub use manager::ConfigManager;
pub use settings::{AppSettings, LauncherSettings, LoggingSettings};
