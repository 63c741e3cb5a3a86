//! Connection profile (`.rdp`) generation
//!
//! A profile is a list of `key:type:value` lines read by the Remote Desktop
//! client. It carries the address, logon name and display settings; the
//! password is never written, the client finds it in the credential vault.

use std::borrow::Cow;
use std::fmt;

use crate::models::{DisplayMode, Host, User};

/// Desktop size used for fullscreen sessions of hosts without a stored size
pub const FULLSCREEN_FALLBACK: (u32, u32) = (1920, 1080);

/// A typed profile value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValue {
    /// `i` entries
    Int(i64),
    /// `s` entries
    Text(Cow<'static, str>),
}

impl ProfileValue {
    const fn type_code(&self) -> char {
        match self {
            Self::Int(_) => 'i',
            Self::Text(_) => 's',
        }
    }
}

impl fmt::Display for ProfileValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

const fn int(value: i64) -> ProfileValue {
    ProfileValue::Int(value)
}

const fn text(value: &'static str) -> ProfileValue {
    ProfileValue::Text(Cow::Borrowed(value))
}

fn flag(enabled: bool) -> ProfileValue {
    ProfileValue::Int(i64::from(enabled))
}

/// Session, performance and device settings written before the drive entry
const SESSION_DEFAULTS: &[(&str, ProfileValue)] = &[
    ("session bpp", int(32)),
    ("compression", int(1)),
    ("keyboardhook", int(1)),
    ("audiocapturemode", int(1)),
    ("videoplaybackmode", int(1)),
    ("connection type", int(7)),
    ("networkautodetect", int(1)),
    ("bandwidthautodetect", int(1)),
    ("displayconnectionbar", int(1)),
    ("enableworkspacereconnect", int(0)),
    ("remoteappmousemoveinject", int(1)),
    ("disable wallpaper", int(0)),
    ("allow font smoothing", int(0)),
    ("allow desktop composition", int(0)),
    ("disable full window drag", int(1)),
    ("disable menu anims", int(1)),
    ("disable themes", int(0)),
    ("disable cursor setting", int(0)),
    ("bitmapcachepersistenable", int(1)),
    ("audiomode", int(0)),
    ("redirectprinters", int(1)),
    ("redirectlocation", int(1)),
    ("redirectcomports", int(1)),
    ("redirectsmartcards", int(1)),
    ("redirectwebauthn", int(1)),
    ("redirectposdevices", int(0)),
    ("camerastoredirect", text("*")),
    ("devicestoredirect", text("*")),
];

/// Security and gateway settings written after the drive entry
const SECURITY_DEFAULTS: &[(&str, ProfileValue)] = &[
    ("autoreconnection enabled", int(1)),
    ("authentication level", int(2)),
    ("prompt for credentials", int(0)),
    ("negotiate security layer", int(1)),
    ("remoteapplicationmode", int(0)),
    ("alternate shell", text("")),
    ("shell working directory", text("")),
    ("gatewayhostname", text("")),
    ("gatewayusagemethod", int(4)),
    ("gatewaycredentialssource", int(4)),
    ("gatewayprofileusagemethod", int(0)),
    ("promptcredentialonce", int(0)),
    ("gatewaybrokeringtype", int(0)),
    ("use redirection server name", int(0)),
    ("rdgiskdcproxy", int(0)),
    ("kdcproxyname", text("")),
    ("enablerdsaadauth", int(0)),
];

/// An ordered connection profile
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileDocument {
    entries: Vec<(&'static str, ProfileValue)>,
}

impl ProfileDocument {
    fn push(&mut self, key: &'static str, value: ProfileValue) {
        self.entries.push((key, value));
    }

    /// Value of the first entry named `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ProfileValue> {
        self.entries
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
    }

    /// Entry names in document order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true for a document without entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the document, one `\n`-terminated line per entry
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ProfileDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            writeln!(f, "{key}:{}:{value}", value.type_code())?;
        }
        Ok(())
    }
}

/// `winposstr` value: `0,1,left,top,right,bottom`
///
/// The outer window size falls back to the desktop size plus the client's
/// frame when no window size is stored.
#[must_use]
pub fn window_position(host: &Host) -> String {
    let (width, height) = host.effective_window_size();
    let left = i64::from(host.position_x);
    let top = i64::from(host.position_y);
    format!(
        "0,1,{left},{top},{},{}",
        left + i64::from(width),
        top + i64::from(height)
    )
}

/// Builds the profile for connecting to `host` as `user`
#[must_use]
pub fn build(host: &Host, user: &User) -> ProfileDocument {
    let mut doc = ProfileDocument::default();
    let fullscreen = host.display_mode == DisplayMode::Fullscreen;

    doc.push("full address", ProfileValue::Text(host.address.clone().into()));
    doc.push("server port", int(i64::from(host.port)));
    doc.push("username", ProfileValue::Text(user.username.clone().into()));
    doc.push("redirectclipboard", flag(host.redirect_clipboard));
    doc.push("dynamic resolution", int(0));
    doc.push(
        "screen mode id",
        int(i64::from(host.display_mode.screen_mode_id())),
    );

    let (width, height) = if fullscreen && (host.desktop_width == 0 || host.desktop_height == 0) {
        FULLSCREEN_FALLBACK
    } else {
        (host.desktop_width, host.desktop_height)
    };
    doc.push("desktopwidth", int(i64::from(width)));
    doc.push("desktopheight", int(i64::from(height)));
    doc.push("winposstr", ProfileValue::Text(window_position(host).into()));
    doc.push("use multimon", flag(fullscreen));

    for (key, value) in SESSION_DEFAULTS {
        doc.push(*key, value.clone());
    }
    doc.push(
        "drivestoredirect",
        text(if host.redirect_drives { "*" } else { "" }),
    );
    for (key, value) in SECURITY_DEFAULTS {
        doc.push(*key, value.clone());
    }

    doc
}
