//! `LaunchRDP` Core Library
//!
//! Stores Remote Desktop hosts and the users that log on to them, keeps the
//! Windows credential vault in step with the stored passwords, and opens
//! sessions through the system Remote Desktop client, reusing a session
//! window that is already open for the same host.
//!
//! # Crate Structure
//!
//! - [`models`] - Users and hosts
//! - [`store`] - JSON-backed collections with locking and atomic writes
//! - [`secret`] - Password codecs (DPAPI, legacy AES) and the codec chain
//! - [`vault`] - Per-host entries in the OS credential vault
//! - [`profile`] - `.rdp` connection profile generation
//! - [`session`] - Window probing and client launching
//! - [`service`] - Operations keeping store and vault consistent
//! - [`config`] - Application directories and settings
//! - [`platform`] - Embedded PowerShell host used for Windows APIs

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod models;
pub mod platform;
pub mod profile;
pub mod secret;
pub mod service;
pub mod session;
pub mod store;
pub mod tracing;
pub mod vault;

pub use config::{AppSettings, ConfigManager};
pub use error::{
    CodecError, ConfigError, LaunchError, LaunchRdpError, LaunchRdpResult, PlatformError,
    StoreError, VaultError,
};
pub use models::{DisplayMode, Host, HostSettings, User};
pub use profile::ProfileDocument;
pub use secret::{CodecChain, LegacyAesCodec, ProtectedDataCodec, SecretCodec};
pub use service::{
    CredentialSyncReport, HostOutcome, LaunchService, NewUser, SecretResolution, SecretState,
    SecretUpdate, UserOutcome, UserUpdate,
};
pub use session::{LaunchOutcome, LauncherConfig, SessionLauncher, WindowInfo, WindowProbe};
pub use store::Storage;
pub use vault::{CredentialVault, MemoryVault};
