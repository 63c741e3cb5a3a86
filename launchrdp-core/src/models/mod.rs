//! Data models for stored users and hosts

mod host;
mod user;

pub use host::{
    DEFAULT_PORT, DEFAULT_POSITION, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, DisplayMode,
    Host, HostSettings, WINDOW_FRAME_HEIGHT, WINDOW_FRAME_WIDTH, desktop_size_for_window,
};
pub use user::User;
