//! Access to Windows facilities through a short-lived PowerShell host
//!
//! The library forbids `unsafe`, so DPAPI, Credential Manager and window
//! management are reached through small embedded scripts. On other
//! platforms every call reports [`PlatformError::Unsupported`].
//!
//! [`PlatformError::Unsupported`]: crate::error::PlatformError::Unsupported

mod powershell;

pub use powershell::{Script, ScriptOutput, encode_command, encode_input, run_script};
