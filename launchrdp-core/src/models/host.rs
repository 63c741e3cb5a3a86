//! Stored remote hosts and their display settings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Default RDP port
pub const DEFAULT_PORT: u16 = 3389;
/// Default outer window width
pub const DEFAULT_WINDOW_WIDTH: u32 = 1200;
/// Default outer window height
pub const DEFAULT_WINDOW_HEIGHT: u32 = 800;
/// Default window position, both axes
pub const DEFAULT_POSITION: i32 = 100;
/// Horizontal window border of the Remote Desktop client, in pixels
pub const WINDOW_FRAME_WIDTH: u32 = 16;
/// Title bar plus vertical borders of the Remote Desktop client, in pixels
pub const WINDOW_FRAME_HEIGHT: u32 = 59;

/// How the client presents the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Fixed-size window at a stored position
    #[default]
    #[serde(alias = "windowed")]
    Window,
    /// Full screen across all monitors
    Fullscreen,
}

impl DisplayMode {
    /// Value of the `screen mode id` profile key
    #[must_use]
    pub const fn screen_mode_id(self) -> u8 {
        match self {
            Self::Window => 1,
            Self::Fullscreen => 2,
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Window => write!(f, "window"),
            Self::Fullscreen => write!(f, "fullscreen"),
        }
    }
}

impl std::str::FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "window" | "windowed" => Ok(Self::Window),
            "fullscreen" => Ok(Self::Fullscreen),
            other => Err(format!("unknown display mode '{other}'")),
        }
    }
}

/// Desktop size the client renders for an outer window size
#[must_use]
pub const fn desktop_size_for_window(width: u32, height: u32) -> (u32, u32) {
    (
        width.saturating_sub(WINDOW_FRAME_WIDTH),
        height.saturating_sub(WINDOW_FRAME_HEIGHT),
    )
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

const fn default_true() -> bool {
    true
}

const fn default_window_width() -> u32 {
    DEFAULT_WINDOW_WIDTH
}

const fn default_window_height() -> u32 {
    DEFAULT_WINDOW_HEIGHT
}

const fn default_position() -> i32 {
    DEFAULT_POSITION
}

/// Older files store an unassigned user as `""`; both `""` and `null` read as `None`
fn deserialize_user_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|id| !id.is_empty()))
}

/// Unassigned is written as `""`, matching what older versions expect
#[allow(clippy::ref_option)]
fn serialize_user_id<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_deref().unwrap_or_default())
}

/// A remote machine and how to present a session to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HostRecord")]
pub struct Host {
    /// Unique identifier, immutable after creation
    pub id: String,
    /// Display name
    pub name: String,
    /// Host name or IP address
    pub address: String,
    /// RDP port
    pub port: u16,
    /// Assigned user
    #[serde(serialize_with = "serialize_user_id")]
    pub user_id: Option<String>,
    /// Windowed or fullscreen
    pub display_mode: DisplayMode,
    /// Outer window width requested by the user
    pub window_width: u32,
    /// Outer window height requested by the user
    pub window_height: u32,
    /// Remote desktop width, derived from `window_width`
    pub desktop_width: u32,
    /// Remote desktop height, derived from `window_height`
    pub desktop_height: u32,
    /// Window left edge
    pub position_x: i32,
    /// Window top edge
    pub position_y: i32,
    /// Share the clipboard with the session
    pub redirect_clipboard: bool,
    /// Share all local drives with the session
    pub redirect_drives: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub modified_at: DateTime<Utc>,
}

/// A host as stored on disk, including fields only older files carry
#[derive(Deserialize)]
struct HostRecord {
    id: String,
    name: String,
    address: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default, deserialize_with = "deserialize_user_id")]
    user_id: Option<String>,
    #[serde(default)]
    display_mode: Option<DisplayMode>,
    /// `screen mode id` of older files: 1 windowed, 2 fullscreen
    #[serde(default)]
    screen_mode: Option<i64>,
    #[serde(default = "default_window_width")]
    window_width: u32,
    #[serde(default = "default_window_height")]
    window_height: u32,
    #[serde(default)]
    desktop_width: u32,
    #[serde(default)]
    desktop_height: u32,
    #[serde(default = "default_position")]
    position_x: i32,
    #[serde(default = "default_position")]
    position_y: i32,
    #[serde(default = "default_true")]
    redirect_clipboard: bool,
    #[serde(default)]
    redirect_drives: bool,
    #[serde(default)]
    created_at: DateTime<Utc>,
    #[serde(default)]
    modified_at: DateTime<Utc>,
}

impl From<HostRecord> for Host {
    fn from(record: HostRecord) -> Self {
        // Either field asking for fullscreen wins.
        let fullscreen_id = i64::from(DisplayMode::Fullscreen.screen_mode_id());
        let display_mode = if record.screen_mode == Some(fullscreen_id) {
            DisplayMode::Fullscreen
        } else {
            record.display_mode.unwrap_or_default()
        };
        Self {
            id: record.id,
            name: record.name,
            address: record.address,
            port: record.port,
            user_id: record.user_id,
            display_mode,
            window_width: record.window_width,
            window_height: record.window_height,
            desktop_width: record.desktop_width,
            desktop_height: record.desktop_height,
            position_x: record.position_x,
            position_y: record.position_y,
            redirect_clipboard: record.redirect_clipboard,
            redirect_drives: record.redirect_drives,
            created_at: record.created_at,
            modified_at: record.modified_at,
        }
    }
}

impl Host {
    /// Creates a host from its settings with a fresh id and timestamps
    #[must_use]
    pub fn new(settings: HostSettings) -> Self {
        let now = Utc::now();
        let mut host = Self {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            address: String::new(),
            port: DEFAULT_PORT,
            user_id: None,
            display_mode: DisplayMode::Window,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            desktop_width: 0,
            desktop_height: 0,
            position_x: DEFAULT_POSITION,
            position_y: DEFAULT_POSITION,
            redirect_clipboard: true,
            redirect_drives: false,
            created_at: now,
            modified_at: now,
        };
        host.apply(settings);
        host.modified_at = now;
        host
    }

    /// Replaces every editable field and recomputes the desktop size
    pub fn apply(&mut self, settings: HostSettings) {
        self.name = settings.name;
        self.address = settings.address;
        self.port = settings.port;
        self.user_id = settings.user_id.filter(|id| !id.is_empty());
        self.display_mode = settings.display_mode;
        self.position_x = settings.position_x;
        self.position_y = settings.position_y;
        self.redirect_clipboard = settings.redirect_clipboard;
        self.redirect_drives = settings.redirect_drives;
        self.set_window_size(settings.window_width, settings.window_height);
        self.modified_at = Utc::now();
    }

    /// Sets the outer window size and the derived desktop size
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
        (self.desktop_width, self.desktop_height) = desktop_size_for_window(width, height);
    }

    /// Outer window size, falling back to desktop size plus frame when unset
    #[must_use]
    pub const fn effective_window_size(&self) -> (u32, u32) {
        if self.window_width == 0 || self.window_height == 0 {
            (
                self.desktop_width.saturating_add(WINDOW_FRAME_WIDTH),
                self.desktop_height.saturating_add(WINDOW_FRAME_HEIGHT),
            )
        } else {
            (self.window_width, self.window_height)
        }
    }

    /// Returns true if `user_id` is assigned to this host
    #[must_use]
    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }

    /// Updates `modified_at`
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

/// Every user-editable host field; the input of create and full update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettings {
    /// Display name
    pub name: String,
    /// Host name or IP address
    pub address: String,
    /// RDP port
    pub port: u16,
    /// Assigned user
    pub user_id: Option<String>,
    /// Windowed or fullscreen
    pub display_mode: DisplayMode,
    /// Outer window width
    pub window_width: u32,
    /// Outer window height
    pub window_height: u32,
    /// Window left edge
    pub position_x: i32,
    /// Window top edge
    pub position_y: i32,
    /// Share the clipboard
    pub redirect_clipboard: bool,
    /// Share all local drives
    pub redirect_drives: bool,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            port: DEFAULT_PORT,
            user_id: None,
            display_mode: DisplayMode::Window,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            position_x: DEFAULT_POSITION,
            position_y: DEFAULT_POSITION,
            redirect_clipboard: true,
            redirect_drives: false,
        }
    }
}

impl HostSettings {
    /// Settings for a new host with default display options
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            ..Self::default()
        }
    }

    /// Current settings of an existing host, as a base for edits
    #[must_use]
    pub fn from_host(host: &Host) -> Self {
        Self {
            name: host.name.clone(),
            address: host.address.clone(),
            port: host.port,
            user_id: host.user_id.clone(),
            display_mode: host.display_mode,
            window_width: host.window_width,
            window_height: host.window_height,
            position_x: host.position_x,
            position_y: host.position_y,
            redirect_clipboard: host.redirect_clipboard,
            redirect_drives: host.redirect_drives,
        }
    }

    /// Assigns a user
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Checks the fields a profile cannot do without
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("host name must not be empty".to_string());
        }
        if self.address.trim().is_empty() {
            return Err("host address must not be empty".to_string());
        }
        if self.address.chars().any(char::is_whitespace) {
            return Err(format!("host address '{}' contains whitespace", self.address));
        }
        if self.port == 0 {
            return Err("port must be between 1 and 65535".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_host_defaults() {
        let host = Host::new(HostSettings::new("Build", "build01"));
        assert_eq!(host.port, 3389);
        assert_eq!(host.display_mode, DisplayMode::Window);
        assert_eq!((host.window_width, host.window_height), (1200, 800));
        assert_eq!((host.desktop_width, host.desktop_height), (1184, 741));
        assert_eq!((host.position_x, host.position_y), (100, 100));
        assert!(host.redirect_clipboard);
        assert!(!host.redirect_drives);
        assert!(host.user_id.is_none());
    }

    #[test]
    fn test_apply_recomputes_desktop() {
        let mut host = Host::new(HostSettings::new("a", "b"));
        let mut settings = HostSettings::from_host(&host);
        settings.window_width = 10;
        settings.window_height = 2000;
        host.apply(settings);
        assert_eq!((host.desktop_width, host.desktop_height), (0, 1941));
    }

    #[test]
    fn test_effective_window_size_fallback() {
        let mut host = Host::new(HostSettings::new("a", "b"));
        host.window_width = 0;
        host.desktop_width = 1184;
        host.desktop_height = 761;
        assert_eq!(host.effective_window_size(), (1200, 820));
    }

    #[test]
    fn test_empty_user_id_reads_as_none() {
        let json = r#"{"id":"1","name":"n","address":"a","user_id":""}"#;
        let host: Host = serde_json::from_str(json).unwrap();
        assert!(host.user_id.is_none());

        let json = r#"{"id":"1","name":"n","address":"a","user_id":null}"#;
        let host: Host = serde_json::from_str(json).unwrap();
        assert!(host.user_id.is_none());
    }

    #[test]
    fn test_unassigned_user_written_as_empty_string() {
        let host = Host::new(HostSettings::new("a", "b"));
        let value = serde_json::to_value(&host).unwrap();
        assert_eq!(value["user_id"], "");
        assert_eq!(value["display_mode"], "window");
    }

    #[test]
    fn test_reads_older_records() {
        let json = r#"{
            "id": "1712345678901234567",
            "name": "File server",
            "address": "fs01.corp.local",
            "port": 3389,
            "user_id": "1712345678000000000",
            "redirect_clipboard": false,
            "redirect_drives": true,
            "drives_to_redirect": "*",
            "display_mode": "windowed",
            "dynamic_resolution": true,
            "screen_mode": 1,
            "window_width": 1600,
            "window_height": 900,
            "desktop_width": 1584,
            "desktop_height": 841,
            "position_x": -1700,
            "position_y": 40,
            "win_pos_str": "0,1,-1700,40,-100,940",
            "created_at": "2024-04-05T10:11:12+02:00",
            "modified_at": "2024-04-05T10:11:12+02:00"
        }"#;
        let host: Host = serde_json::from_str(json).unwrap();
        assert_eq!(host.display_mode, DisplayMode::Window);
        assert_eq!(host.user_id.as_deref(), Some("1712345678000000000"));
        assert_eq!(host.position_x, -1700);
        assert!(host.redirect_drives);
    }

    #[test]
    fn test_legacy_screen_mode_reads_as_fullscreen() {
        let json = r#"{"id":"1","name":"n","address":"a","screen_mode":2}"#;
        let host: Host = serde_json::from_str(json).unwrap();
        assert_eq!(host.display_mode, DisplayMode::Fullscreen);

        let json = r#"{"id":"1","name":"n","address":"a","display_mode":"windowed","screen_mode":2}"#;
        let host: Host = serde_json::from_str(json).unwrap();
        assert_eq!(host.display_mode, DisplayMode::Fullscreen);

        let json = r#"{"id":"1","name":"n","address":"a","display_mode":"fullscreen","screen_mode":1}"#;
        let host: Host = serde_json::from_str(json).unwrap();
        assert_eq!(host.display_mode, DisplayMode::Fullscreen);

        let json = r#"{"id":"1","name":"n","address":"a","screen_mode":1}"#;
        let host: Host = serde_json::from_str(json).unwrap();
        assert_eq!(host.display_mode, DisplayMode::Window);
    }

    #[test]
    fn test_display_mode_parse() {
        assert_eq!("Fullscreen".parse::<DisplayMode>(), Ok(DisplayMode::Fullscreen));
        assert_eq!("windowed".parse::<DisplayMode>(), Ok(DisplayMode::Window));
        assert!("tiled".parse::<DisplayMode>().is_err());
    }

    #[test]
    fn test_validate() {
        assert!(HostSettings::new("n", "a").validate().is_ok());
        assert!(HostSettings::new(" ", "a").validate().is_err());
        assert!(HostSettings::new("n", "").validate().is_err());
        assert!(HostSettings::new("n", "a b").validate().is_err());
        let mut settings = HostSettings::new("n", "a");
        settings.port = 0;
        assert!(settings.validate().is_err());
    }
}
