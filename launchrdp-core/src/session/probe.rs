//! Discovery and activation of open Remote Desktop windows

use crate::error::{LaunchError, LaunchResult, PlatformError};
use crate::platform::{Script, run_script};

/// Window class of the Remote Desktop client's top-level window
pub const DEFAULT_SESSION_WINDOW_CLASS: &str = "TscShellContainerClass";

/// A visible top-level window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    /// Native window handle
    pub handle: i64,
    /// Window class name
    pub class_name: String,
    /// Window title
    pub title: String,
}

/// Access to the desktop's top-level windows
pub trait WindowProbe: Send + Sync {
    /// Lists visible top-level windows
    ///
    /// # Errors
    ///
    /// Returns `LaunchError::Probe` if enumeration fails.
    fn list_visible_windows(&self) -> LaunchResult<Vec<WindowInfo>>;

    /// Returns true when the window is minimized
    ///
    /// # Errors
    ///
    /// Returns `LaunchError::Probe` if the state cannot be read.
    fn is_minimized(&self, handle: i64) -> LaunchResult<bool>;

    /// Restores a minimized window
    ///
    /// # Errors
    ///
    /// Returns `LaunchError::Probe` on failure.
    fn restore(&self, handle: i64) -> LaunchResult<()>;

    /// Brings the window to the foreground
    ///
    /// # Errors
    ///
    /// Returns `LaunchError::Probe` on failure.
    fn activate(&self, handle: i64) -> LaunchResult<()>;
}

/// Finds the window of an open session to `address`
///
/// The client titles its window after the connection, so a window of the
/// client class whose title contains the address (ignoring case) is taken
/// to be that session. Two hosts whose addresses contain one another can
/// therefore match each other's window.
#[must_use]
pub fn find_session_window<'a>(
    windows: &'a [WindowInfo],
    window_class: &str,
    address: &str,
) -> Option<&'a WindowInfo> {
    if address.is_empty() {
        return None;
    }
    let needle = address.to_lowercase();
    windows
        .iter()
        .find(|w| w.class_name == window_class && w.title.to_lowercase().contains(&needle))
}

/// Parses `handle<TAB>class<TAB>title` lines; malformed lines are skipped
#[must_use]
pub fn parse_window_list(output: &str) -> Vec<WindowInfo> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.trim_end_matches('\r').splitn(3, '\t');
            let handle = parts.next()?.trim().parse().ok()?;
            let class_name = parts.next()?.to_string();
            let title = parts.next().unwrap_or_default().to_string();
            Some(WindowInfo {
                handle,
                class_name,
                title,
            })
        })
        .collect()
}

/// Window probe backed by the Win32 window APIs
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopWindowProbe;

impl DesktopWindowProbe {
    /// Creates the probe
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn run(action: &str, handle: Option<i64>) -> LaunchResult<String> {
        let handle = handle.map(|h| h.to_string());
        let fields: Vec<&[u8]> = handle.iter().map(String::as_bytes).collect();
        let output = run_script(Script::Windows, action, &fields)
            .map_err(|e: PlatformError| LaunchError::Probe(e.to_string()))?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(LaunchError::Probe(format!(
                "{action}: {}",
                output.error_message()
            )))
        }
    }
}

impl WindowProbe for DesktopWindowProbe {
    fn list_visible_windows(&self) -> LaunchResult<Vec<WindowInfo>> {
        Self::run("list", None).map(|out| parse_window_list(&out))
    }

    fn is_minimized(&self, handle: i64) -> LaunchResult<bool> {
        Self::run("minimized", Some(handle)).map(|out| out.trim() == "1")
    }

    fn restore(&self, handle: i64) -> LaunchResult<()> {
        Self::run("restore", Some(handle)).map(|_| ())
    }

    fn activate(&self, handle: i64) -> LaunchResult<()> {
        Self::run("activate", Some(handle)).map(|_| ())
    }
}
