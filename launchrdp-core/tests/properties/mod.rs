mod codec_tests;
mod profile_tests;
mod store_tests;
mod vault_tests;

use launchrdp_core::error::{CodecError, CodecResult};
use launchrdp_core::secret::SecretCodec;
use secrecy::{ExposeSecret, SecretString};

/// Reversible stand-in for the platform codec
pub struct PlainCodec;

impl SecretCodec for PlainCodec {
    fn codec_id(&self) -> &'static str {
        "plain"
    }

    fn encrypt(&self, plaintext: &SecretString) -> CodecResult<String> {
        if plaintext.expose_secret().is_empty() {
            return Ok(String::new());
        }
        Ok(format!("v2:{}", plaintext.expose_secret()))
    }

    fn decrypt(&self, token: &str) -> CodecResult<SecretString> {
        token
            .strip_prefix("v2:")
            .map(|p| SecretString::from(p.to_string()))
            .ok_or_else(|| CodecError::Decryption("missing v2 prefix".to_string()))
    }
}
