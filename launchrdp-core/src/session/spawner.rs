//! Starting the external Remote Desktop client

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{LaunchError, LaunchResult};

/// Default Remote Desktop client
pub const DEFAULT_CLIENT_PROGRAM: &str = "mstsc";

/// Starts the client for a profile file
pub trait ProcessSpawner: Send + Sync {
    /// Starts `program <profile>` and returns its process id without waiting
    ///
    /// # Errors
    ///
    /// Returns `LaunchError::SpawnFailed` if the process cannot be started.
    fn spawn(&self, program: &str, profile: &Path) -> LaunchResult<u32>;
}

/// Starts the client detached from this process's standard streams
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSpawner;

impl DetachedSpawner {
    /// Creates the spawner
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessSpawner for DetachedSpawner {
    fn spawn(&self, program: &str, profile: &Path) -> LaunchResult<u32> {
        let mut child = Command::new(program)
            .arg(profile)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| LaunchError::SpawnFailed {
                program: program.to_string(),
                source,
            })?;
        let pid = child.id();

        // Reap the client when it exits; the session outlives this call
        let reaper = std::thread::Builder::new()
            .name(format!("reap-{pid}"))
            .spawn(move || child.wait());
        if let Err(e) = reaper {
            tracing::debug!(pid, error = %e, "Could not start reaper thread");
        }
        Ok(pid)
    }
}
