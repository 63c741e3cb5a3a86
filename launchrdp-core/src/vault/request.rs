//! Backend-independent preparation of a vault entry

use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::error::{VaultError, VaultResult};

/// Prefix the Remote Desktop client uses to look up saved logins
pub const TARGET_PREFIX: &str = "TERMSRV/";

/// Largest credential blob the Windows credential store accepts, in bytes
pub const MAX_SECRET_BYTES: usize = 512;

/// Vault target for a host address
#[must_use]
pub fn target_name(address: &str) -> String {
    format!("{TARGET_PREFIX}{address}")
}

/// Qualifies a bare username as `address\username`
///
/// Names that already carry a domain (`DOMAIN\user`) are returned unchanged.
#[must_use]
pub fn qualify_username(address: &str, username: &str) -> String {
    if username.contains('\\') {
        username.to_string()
    } else {
        format!("{address}\\{username}")
    }
}

/// A validated vault entry ready to be written
pub struct CredentialRequest {
    /// `TERMSRV/<address>`
    pub target: String,
    /// Qualified username
    pub username: String,
    blob: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for CredentialRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRequest")
            .field("target", &self.target)
            .field("username", &self.username)
            .field("blob_len", &self.blob.len())
            .finish()
    }
}

impl CredentialRequest {
    /// Validates the inputs and encodes the secret as UTF-16LE without terminator
    ///
    /// # Errors
    ///
    /// Returns `VaultError::InvalidInput` when a field is empty and
    /// `VaultError::SecretTooLarge` when the encoded secret exceeds
    /// [`MAX_SECRET_BYTES`].
    pub fn new(address: &str, username: &str, secret: &SecretString) -> VaultResult<Self> {
        if address.is_empty() {
            return Err(VaultError::InvalidInput("address"));
        }
        if username.is_empty() {
            return Err(VaultError::InvalidInput("username"));
        }
        let plain = secret.expose_secret();
        if plain.is_empty() {
            return Err(VaultError::InvalidInput("secret"));
        }

        let blob: Zeroizing<Vec<u8>> = Zeroizing::new(
            plain
                .encode_utf16()
                .flat_map(u16::to_le_bytes)
                .collect(),
        );
        if blob.len() > MAX_SECRET_BYTES {
            return Err(VaultError::SecretTooLarge {
                size: blob.len(),
                max: MAX_SECRET_BYTES,
            });
        }

        Ok(Self {
            target: target_name(address),
            username: qualify_username(address, username),
            blob,
        })
    }

    /// The encoded secret
    #[must_use]
    pub fn secret_blob(&self) -> &[u8] {
        &self.blob
    }
}
