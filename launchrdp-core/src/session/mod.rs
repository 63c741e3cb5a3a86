//! Remote Desktop sessions: finding open ones and starting new ones

mod launcher;
mod probe;
mod spawner;

pub use launcher::{LaunchOutcome, LauncherConfig, PROFILE_EXTENSION, SessionLauncher};
pub use probe::{
    DEFAULT_SESSION_WINDOW_CLASS, DesktopWindowProbe, WindowInfo, WindowProbe,
    find_session_window, parse_window_list,
};
pub use spawner::{DEFAULT_CLIENT_PROGRAM, DetachedSpawner, ProcessSpawner};
