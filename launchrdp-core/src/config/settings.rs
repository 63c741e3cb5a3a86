//! Application settings stored in `settings.toml`

use serde::{Deserialize, Serialize};

use crate::session::{DEFAULT_CLIENT_PROGRAM, DEFAULT_SESSION_WINDOW_CLASS};
use crate::tracing::TracingLevel;

/// All application settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Remote Desktop client settings
    pub launcher: LauncherSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// How sessions are started and recognised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherSettings {
    /// Client executable, resolved through `PATH`
    pub client_program: String,
    /// Window class of the client's session windows
    pub session_window_class: String,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            client_program: DEFAULT_CLIENT_PROGRAM.to_string(),
            session_window_class: DEFAULT_SESSION_WINDOW_CLASS.to_string(),
        }
    }
}

/// Log verbosity and destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level for this application's targets (`error` .. `trace`)
    pub level: String,
    /// Write to `launchrdp.log` in the logs directory instead of stderr
    pub log_to_file: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: TracingLevel::Warn.to_string(),
            log_to_file: false,
        }
    }
}

impl LoggingSettings {
    /// Parsed level; unknown values fall back to `warn`
    #[must_use]
    pub fn tracing_level(&self) -> TracingLevel {
        self.level.parse().unwrap_or(TracingLevel::Warn)
    }
}
