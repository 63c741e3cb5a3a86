//! Reuse-or-launch decision for a host

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{
    DEFAULT_CLIENT_PROGRAM, DEFAULT_SESSION_WINDOW_CLASS, ProcessSpawner, WindowInfo,
    WindowProbe, find_session_window,
};
use crate::error::{LaunchError, LaunchResult};
use crate::models::{Host, User};
use crate::profile;
use crate::tracing::span_names;

/// Extension of connection profile files
pub const PROFILE_EXTENSION: &str = "rdp";

/// Launcher settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    /// Client executable
    pub client_program: String,
    /// Window class identifying open sessions
    pub window_class: String,
    /// Directory receiving generated profiles
    pub profile_dir: PathBuf,
}

impl LauncherConfig {
    /// Default client and window class with the given profile directory
    #[must_use]
    pub fn new(profile_dir: impl Into<PathBuf>) -> Self {
        Self {
            client_program: DEFAULT_CLIENT_PROGRAM.to_string(),
            window_class: DEFAULT_SESSION_WINDOW_CLASS.to_string(),
            profile_dir: profile_dir.into(),
        }
    }
}

/// What [`SessionLauncher::launch`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// An open session window was brought to the foreground
    Reused {
        /// Window handle
        handle: i64,
        /// Window title
        title: String,
    },
    /// A new client was started
    Launched {
        /// Client process id
        pid: u32,
        /// Profile handed to the client
        profile_path: PathBuf,
    },
}

impl LaunchOutcome {
    /// Returns true when an existing session was reused
    #[must_use]
    pub const fn was_reused(&self) -> bool {
        matches!(self, Self::Reused { .. })
    }
}

/// Opens sessions, preferring an already open window for the same host
///
/// No registry of sessions is kept: every launch asks the probe again.
pub struct SessionLauncher {
    config: LauncherConfig,
    probe: Arc<dyn WindowProbe>,
    spawner: Arc<dyn ProcessSpawner>,
}

impl std::fmt::Debug for SessionLauncher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLauncher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionLauncher {
    /// Creates a launcher
    #[must_use]
    pub fn new(
        config: LauncherConfig,
        probe: Arc<dyn WindowProbe>,
        spawner: Arc<dyn ProcessSpawner>,
    ) -> Self {
        Self {
            config,
            probe,
            spawner,
        }
    }

    /// Launcher settings
    #[must_use]
    pub const fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Path of the profile generated for `host`
    #[must_use]
    pub fn profile_path(&self, host: &Host) -> PathBuf {
        self.config
            .profile_dir
            .join(format!("{}.{PROFILE_EXTENSION}", host.id))
    }

    /// Looks for an open session window for `address`
    ///
    /// Probe failures are logged and reported as no match.
    #[must_use]
    pub fn find_existing(&self, address: &str) -> Option<WindowInfo> {
        let windows = match self.probe.list_visible_windows() {
            Ok(windows) => windows,
            Err(e) => {
                tracing::warn!(error = %e, "Window probe failed, starting a new session");
                return None;
            }
        };
        find_session_window(&windows, &self.config.window_class, address).cloned()
    }

    /// Activates an open session for `host` or starts a new client
    ///
    /// # Errors
    ///
    /// Returns `LaunchError::ProfileWrite` if the profile cannot be written
    /// and `LaunchError::SpawnFailed` if the client cannot be started. A
    /// profile written before a spawn failure is left in place.
    pub fn launch(&self, host: &Host, user: &User) -> LaunchResult<LaunchOutcome> {
        let _span =
            crate::trace_operation!(span_names::SESSION_LAUNCH, host_id = %host.id).entered();

        if let Some(window) = self.find_existing(&host.address) {
            self.bring_to_front(window.handle);
            tracing::info!(handle = window.handle, "Reused open session");
            return Ok(LaunchOutcome::Reused {
                handle: window.handle,
                title: window.title,
            });
        }

        let profile_path = self.write_profile(host, user)?;
        let pid = self
            .spawner
            .spawn(&self.config.client_program, &profile_path)?;
        tracing::info!(
            pid,
            program = %self.config.client_program,
            "Started Remote Desktop client"
        );
        Ok(LaunchOutcome::Launched { pid, profile_path })
    }

    fn bring_to_front(&self, handle: i64) {
        match self.probe.is_minimized(handle) {
            Ok(true) => {
                if let Err(e) = self.probe.restore(handle) {
                    tracing::warn!(handle, error = %e, "Failed to restore session window");
                }
            }
            Ok(false) => {}
            Err(e) => tracing::warn!(handle, error = %e, "Failed to read window state"),
        }
        if let Err(e) = self.probe.activate(handle) {
            tracing::warn!(handle, error = %e, "Failed to activate session window");
        }
    }

    /// Writes the profile for `host` and returns its absolute path
    ///
    /// # Errors
    ///
    /// Returns `LaunchError::ProfileWrite` on I/O failure.
    pub fn write_profile(&self, host: &Host, user: &User) -> LaunchResult<PathBuf> {
        let path = self.profile_path(host);
        let write_error = |source| LaunchError::ProfileWrite {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.config.profile_dir).map_err(write_error)?;
        fs::write(&path, profile::build(host, user).render()).map_err(write_error)?;
        let absolute = std::path::absolute(&path).map_err(write_error)?;
        tracing::debug!(path = %absolute.display(), "Connection profile written");
        Ok(absolute)
    }

    /// Removes every generated profile and returns how many were removed
    ///
    /// Files that cannot be removed are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns `LaunchError::Cleanup` if the directory cannot be listed.
    pub fn cleanup_profiles(&self) -> LaunchResult<usize> {
        let dir = &self.config.profile_dir;
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(source) => {
                return Err(LaunchError::Cleanup {
                    path: dir.clone(),
                    source,
                });
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !is_profile(&path) || !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove profile");
                }
            }
        }
        tracing::info!(removed, "Profile cleanup finished");
        Ok(removed)
    }
}

fn is_profile(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PROFILE_EXTENSION))
}
