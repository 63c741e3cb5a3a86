//! Windows Data Protection API codec (current-user scope)
//!
//! Tokens are the base64 encoding of the raw DPAPI blob protecting the UTF-8
//! password bytes, without additional entropy. Only the same Windows user on
//! the same machine can decrypt them.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use super::SecretCodec;
use crate::error::{CodecError, CodecResult, PlatformError};
use crate::platform::{Script, run_script};

/// Identifier of the DPAPI codec
pub const DPAPI_CODEC_ID: &str = "dpapi";

/// Codec backed by `ProtectedData` in the current-user scope
#[derive(Debug, Default, Clone, Copy)]
pub struct ProtectedDataCodec;

impl ProtectedDataCodec {
    /// Creates the codec
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn platform_error(err: PlatformError, failed: fn(String) -> CodecError) -> CodecError {
    match err {
        PlatformError::Unsupported(_) => CodecError::Unsupported(err.to_string()),
        PlatformError::Spawn(_) => failed(err.to_string()),
    }
}

impl SecretCodec for ProtectedDataCodec {
    fn codec_id(&self) -> &'static str {
        DPAPI_CODEC_ID
    }

    fn encrypt(&self, plaintext: &SecretString) -> CodecResult<String> {
        let plain = plaintext.expose_secret();
        if plain.is_empty() {
            return Ok(String::new());
        }

        let output = run_script(Script::ProtectedData, "protect", &[plain.as_bytes()])
            .map_err(|e| platform_error(e, CodecError::Encryption))?;
        if !output.success() {
            return Err(CodecError::Encryption(output.error_message()));
        }

        let token = output.stdout.trim().to_string();
        if STANDARD.decode(&token).is_err() {
            return Err(CodecError::Encryption(
                "DPAPI returned a malformed blob".to_string(),
            ));
        }
        Ok(token)
    }

    fn decrypt(&self, token: &str) -> CodecResult<SecretString> {
        if token.is_empty() {
            return Ok(SecretString::from(String::new()));
        }
        if STANDARD.decode(token).is_err() {
            return Err(CodecError::Decryption("token is not valid base64".to_string()));
        }

        let output = run_script(Script::ProtectedData, "unprotect", &[token.as_bytes()])
            .map_err(|e| platform_error(e, CodecError::Decryption))?;
        if !output.success() {
            return Err(CodecError::Decryption(output.error_message()));
        }

        // The script answers with base64 so arbitrary bytes survive the console
        let plain = Zeroizing::new(
            STANDARD
                .decode(output.stdout.trim())
                .map_err(|e| CodecError::Decryption(e.to_string()))?,
        );
        let text = std::str::from_utf8(&plain)
            .map_err(|_| CodecError::Decryption("plaintext is not valid UTF-8".to_string()))?;
        Ok(SecretString::from(text.to_string()))
    }
}
