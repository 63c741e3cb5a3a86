//! CLI error types and exit codes.

use launchrdp_core::error::LaunchRdpError;

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, storage or vault errors
    pub const GENERAL_ERROR: i32 = 1;
    /// A named user or host does not exist
    pub const NOT_FOUND: i32 = 2;
    /// The Remote Desktop client could not be started or the profile written
    pub const LAUNCH_FAILURE: i32 = 3;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Host not found
    #[error("Host not found: {0}")]
    HostNotFound(String),

    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// A name matched more than one entry
    #[error("{0}")]
    Ambiguous(String),

    /// Bad argument or field value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage, codec or vault error
    #[error("{0}")]
    Operation(String),

    /// Launch error
    #[error("Launch failed: {0}")]
    Launch(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LaunchRdpError> for CliError {
    fn from(err: LaunchRdpError) -> Self {
        match err {
            LaunchRdpError::HostNotFound(id) => Self::HostNotFound(id),
            LaunchRdpError::UserNotFound(id) => Self::UserNotFound(id),
            LaunchRdpError::InvalidInput(reason) => Self::InvalidInput(reason),
            LaunchRdpError::Config(e) => Self::Config(e.to_string()),
            LaunchRdpError::Launch(e) => Self::Launch(e.to_string()),
            LaunchRdpError::NoUserAssigned(_)
            | LaunchRdpError::Store(_)
            | LaunchRdpError::Codec(_)
            | LaunchRdpError::Vault(_) => Self::Operation(err.to_string()),
        }
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error
    /// - 2: User or host not found
    /// - 3: Launch failure
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::HostNotFound(_) | Self::UserNotFound(_) => exit_codes::NOT_FOUND,
            Self::Launch(_) => exit_codes::LAUNCH_FAILURE,
            Self::Config(_)
            | Self::Ambiguous(_)
            | Self::InvalidInput(_)
            | Self::Operation(_)
            | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
