//! Per-host login secrets in the OS credential vault
//!
//! The Remote Desktop client looks up `TERMSRV/<address>` entries when it
//! connects, so a stored entry lets it log in without prompting.

mod credman;
mod memory;
mod request;

use std::sync::Arc;

use secrecy::SecretString;

use crate::error::VaultResult;

pub use credman::CredentialManagerVault;
pub use memory::{MemoryVault, StoredCredential};
pub use request::{
    CredentialRequest, MAX_SECRET_BYTES, TARGET_PREFIX, qualify_username, target_name,
};

/// Store for per-host login secrets
///
/// Callers treat `delete` as best-effort: its errors are logged and
/// reported, never fatal to the surrounding operation.
pub trait CredentialVault: Send + Sync {
    /// Writes or overwrites the entry for `address`
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidInput` for empty fields,
    /// `VaultError::SecretTooLarge` for oversized secrets and
    /// `VaultError::Unavailable` when the store rejects the write.
    fn store(&self, address: &str, username: &str, secret: &SecretString) -> VaultResult<()>;

    /// Removes the entry for `address`
    ///
    /// # Errors
    ///
    /// Returns `VaultError::NotFound` when no entry exists and
    /// `VaultError::Unavailable` on other failures.
    fn delete(&self, address: &str) -> VaultResult<()>;
}

/// The vault for the current platform
///
/// Windows gets the Credential Manager; elsewhere entries live in memory
/// so the rest of the workflow can still be exercised.
#[must_use]
pub fn platform_vault() -> Arc<dyn CredentialVault> {
    if cfg!(windows) {
        Arc::new(CredentialManagerVault::new())
    } else {
        tracing::debug!("No OS credential store on this platform, using in-memory vault");
        Arc::new(MemoryVault::new())
    }
}
