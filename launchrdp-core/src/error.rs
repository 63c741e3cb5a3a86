//! Error types for `LaunchRDP`
//!
//! Each component has its own error enum; [`LaunchRdpError`] folds them
//! together for the orchestration layer and its callers.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving directories or reading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform did not report a configuration or data directory
    #[error("Could not determine the {0} directory for this user")]
    NoDirectory(&'static str),

    /// A directory could not be created
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The settings file could not be read or written
    #[error("Settings file {path}: {source}")]
    Io {
        /// Settings file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML
    #[error("Failed to parse settings: {0}")]
    Parse(String),

    /// The settings could not be serialized
    #[error("Failed to serialize settings: {0}")]
    Serialize(String),
}

/// Errors raised by the JSON entity store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file exists but could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Backing file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a valid collection document
    #[error("Corrupt store file {path}: {reason}")]
    Corrupt {
        /// Backing file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// The collection could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Backing file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The collection could not be serialized
    #[error("Failed to serialize {collection}: {reason}")]
    Serialize {
        /// Collection name
        collection: &'static str,
        /// Serializer message
        reason: String,
    },

    /// A previous holder of the collection lock panicked
    #[error("Lock for the {0} collection is poisoned")]
    Poisoned(&'static str),
}

/// Errors raised by secret codecs
#[derive(Debug, Error)]
pub enum CodecError {
    /// The token could not be decrypted by this codec
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// The plaintext could not be encrypted
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// The codec needs a platform facility that is not present
    #[error("Secret codec unavailable: {0}")]
    Unsupported(String),
}

/// Errors raised by the OS credential vault adapter
#[derive(Debug, Error)]
pub enum VaultError {
    /// A required field was empty
    #[error("Invalid credential input: {0} must not be empty")]
    InvalidInput(&'static str),

    /// The encoded secret exceeds the vault's blob limit
    #[error("Secret is {size} bytes, the credential store accepts at most {max}")]
    SecretTooLarge {
        /// Encoded size in bytes
        size: usize,
        /// Store limit in bytes
        max: usize,
    },

    /// No entry exists for the target
    #[error("No credential stored for {0}")]
    NotFound(String),

    /// The vault call failed
    #[error("Credential store unavailable: {message}{}", code.map(|c| format!(" (code: {c})")).unwrap_or_default())]
    Unavailable {
        /// Native error code, when one was reported
        code: Option<i32>,
        /// Description of the failure
        message: String,
    },
}

/// Errors raised while talking to the platform host process
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The facility only exists on another platform
    #[error("{0} is only available on Windows")]
    Unsupported(&'static str),

    /// The host process could not be started or awaited
    #[error("Failed to run PowerShell: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Errors raised by the session launcher
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The connection profile could not be written
    #[error("Failed to write connection profile {path}: {source}")]
    ProfileWrite {
        /// Profile path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The external client could not be started
    #[error("Failed to launch {program}: {source}")]
    SpawnFailed {
        /// Client program
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Window enumeration or activation failed
    #[error("Window probe failed: {0}")]
    Probe(String),

    /// The profile directory could not be listed during cleanup
    #[error("Failed to read profile directory {path}: {source}")]
    Cleanup {
        /// Profile directory
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error for `LaunchRDP` operations
#[derive(Debug, Error)]
pub enum LaunchRdpError {
    /// No host with the given id
    #[error("Host not found: {0}")]
    HostNotFound(String),

    /// No user with the given id
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// The host has no user and none was supplied
    #[error("Host '{0}' has no assigned user")]
    NoUserAssigned(String),

    /// A required field was empty or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Entity store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Secret codec error
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Credential vault error
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// Launch error
    #[error(transparent)]
    Launch(#[from] LaunchError),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
/// Result type for entity store operations
pub type StoreResult<T> = Result<T, StoreError>;
/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
/// Result type for vault operations
pub type VaultResult<T> = Result<T, VaultError>;
/// Result type for platform host operations
pub type PlatformResult<T> = Result<T, PlatformError>;
/// Result type for launcher operations
pub type LaunchResult<T> = Result<T, LaunchError>;
/// Result type for top-level operations
pub type LaunchRdpResult<T> = Result<T, LaunchRdpError>;
