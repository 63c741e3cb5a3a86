//! Static-key AES-256-GCM codec used by older versions
//!
//! The key is derived from the machine name and a fixed suffix, so any
//! process on the machine can decrypt these tokens. The codec exists to
//! read and migrate existing records and is never the primary codec.
//!
//! Token layout: `base64(nonce[12] || ciphertext || tag[16])`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use super::SecretCodec;
use crate::error::{CodecError, CodecResult};

/// Identifier of the legacy codec
pub const LEGACY_CODEC_ID: &str = "legacy-aes";

const KEY_SUFFIX: &str = "LaunchRDP_Secret_Key_12345";
const KEY_LEN: usize = 32;
const KEY_PAD: u8 = b'X';

/// Derives the legacy key: `machine + suffix`, truncated or padded with `X` to 32 bytes
#[must_use]
pub fn derive_legacy_key(machine_name: &str) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([KEY_PAD; KEY_LEN]);
    let material = machine_name.bytes().chain(KEY_SUFFIX.bytes());
    for (slot, byte) in key.iter_mut().zip(material) {
        *slot = byte;
    }
    key
}

/// AES-256-GCM codec keyed by the machine name
pub struct LegacyAesCodec {
    key: Zeroizing<[u8; KEY_LEN]>,
    rng: SystemRandom,
}

impl std::fmt::Debug for LegacyAesCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyAesCodec").finish_non_exhaustive()
    }
}

impl LegacyAesCodec {
    /// Creates the codec for an explicit machine name
    #[must_use]
    pub fn with_machine_name(machine_name: &str) -> Self {
        Self {
            key: derive_legacy_key(machine_name),
            rng: SystemRandom::new(),
        }
    }

    /// Creates the codec for the local machine
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Unsupported` if the host name cannot be read.
    pub fn from_machine() -> CodecResult<Self> {
        let name = hostname::get()
            .map_err(|e| CodecError::Unsupported(format!("cannot read host name: {e}")))?;
        Ok(Self::with_machine_name(&name.to_string_lossy()))
    }

    fn key(&self) -> CodecResult<LessSafeKey> {
        let unbound = UnboundKey::new(&AES_256_GCM, &self.key[..])
            .map_err(|_| CodecError::Encryption("Failed to create key".to_string()))?;
        Ok(LessSafeKey::new(unbound))
    }
}

impl SecretCodec for LegacyAesCodec {
    fn codec_id(&self) -> &'static str {
        LEGACY_CODEC_ID
    }

    fn encrypt(&self, plaintext: &SecretString) -> CodecResult<String> {
        let plain = plaintext.expose_secret();
        if plain.is_empty() {
            return Ok(String::new());
        }

        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| CodecError::Encryption("Failed to generate nonce".to_string()))?;

        let mut buffer = Zeroizing::new(plain.as_bytes().to_vec());
        self.key()?
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::empty(),
                &mut *buffer,
            )
            .map_err(|_| CodecError::Encryption("Encryption failed".to_string()))?;

        let mut output = Vec::with_capacity(NONCE_LEN + buffer.len());
        output.extend_from_slice(&nonce_bytes);
        output.extend_from_slice(&buffer);
        Ok(STANDARD.encode(output))
    }

    fn decrypt(&self, token: &str) -> CodecResult<SecretString> {
        if token.is_empty() {
            return Ok(SecretString::from(String::new()));
        }

        let data = STANDARD
            .decode(token)
            .map_err(|_| CodecError::Decryption("token is not valid base64".to_string()))?;
        if data.len() < NONCE_LEN + AES_256_GCM.tag_len() {
            return Err(CodecError::Decryption("token too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
        let mut nonce_array = [0u8; NONCE_LEN];
        nonce_array.copy_from_slice(nonce_bytes);

        let mut buffer = Zeroizing::new(ciphertext.to_vec());
        let plain = self
            .key()
            .map_err(|e| CodecError::Decryption(e.to_string()))?
            .open_in_place(
                Nonce::assume_unique_for_key(nonce_array),
                Aad::empty(),
                &mut *buffer,
            )
            .map_err(|_| CodecError::Decryption("authentication failed".to_string()))?;

        let text = std::str::from_utf8(plain)
            .map_err(|_| CodecError::Decryption("plaintext is not valid UTF-8".to_string()))?;
        Ok(SecretString::from(text.to_string()))
    }
}
