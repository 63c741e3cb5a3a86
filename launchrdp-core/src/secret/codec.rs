//! The codec abstraction shared by every password encryption scheme

use secrecy::SecretString;

use crate::error::CodecResult;

/// Reversible encryption of a password into an opaque, printable token
///
/// Implementations map the empty plaintext to the empty token and back, so
/// `""` in a stored record always means "no secret".
pub trait SecretCodec: Send + Sync {
    /// Stable identifier used in logs and error messages
    fn codec_id(&self) -> &'static str;

    /// Encrypts a plaintext password into a token
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Encryption` or `CodecError::Unsupported` when
    /// the token cannot be produced.
    fn encrypt(&self, plaintext: &SecretString) -> CodecResult<String>;

    /// Decrypts a token produced by this codec
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Decryption` for malformed or foreign tokens and
    /// `CodecError::Unsupported` when the codec cannot run here.
    fn decrypt(&self, token: &str) -> CodecResult<SecretString>;
}
