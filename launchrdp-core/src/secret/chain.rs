//! Ordered list of codecs with re-encryption of tokens read by a fallback codec

use secrecy::SecretString;

use super::{LegacyAesCodec, ProtectedDataCodec, SecretCodec};
use crate::error::{CodecError, CodecResult};

/// Outcome of decrypting a token through a [`CodecChain`]
#[derive(Debug)]
pub struct Decrypted {
    /// The recovered password
    pub plaintext: SecretString,
    /// Codec that accepted the token
    pub codec_id: &'static str,
    /// Replacement token under the primary codec, when a fallback codec was used
    pub migrated_token: Option<String>,
}

impl Decrypted {
    /// Returns true when the caller should persist `migrated_token`
    #[must_use]
    pub const fn needs_migration(&self) -> bool {
        self.migrated_token.is_some()
    }
}

/// Codecs in priority order; the first one encrypts every new secret
pub struct CodecChain {
    codecs: Vec<Box<dyn SecretCodec>>,
}

impl std::fmt::Debug for CodecChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.codecs.iter().map(|c| c.codec_id()))
            .finish()
    }
}

impl CodecChain {
    /// Creates a chain with a single, primary codec
    #[must_use]
    pub fn new(primary: Box<dyn SecretCodec>) -> Self {
        Self {
            codecs: vec![primary],
        }
    }

    /// Appends a fallback codec, tried after every codec already present
    #[must_use]
    pub fn with_fallback(mut self, codec: Box<dyn SecretCodec>) -> Self {
        self.codecs.push(codec);
        self
    }

    /// DPAPI as primary with the legacy machine-key codec as fallback
    ///
    /// The fallback is omitted, with a warning, when the host name is unreadable.
    #[must_use]
    pub fn platform_default() -> Self {
        let chain = Self::new(Box::new(ProtectedDataCodec::new()));
        match LegacyAesCodec::from_machine() {
            Ok(legacy) => chain.with_fallback(Box::new(legacy)),
            Err(e) => {
                tracing::warn!(error = %e, "Legacy secret codec disabled");
                chain
            }
        }
    }

    /// Identifier of the primary codec
    #[must_use]
    pub fn primary_id(&self) -> &'static str {
        self.codecs[0].codec_id()
    }

    /// Identifiers of all codecs, in order
    #[must_use]
    pub fn codec_ids(&self) -> Vec<&'static str> {
        self.codecs.iter().map(|c| c.codec_id()).collect()
    }

    /// Encrypts with the primary codec
    ///
    /// # Errors
    ///
    /// Propagates the primary codec's error.
    pub fn encrypt(&self, plaintext: &SecretString) -> CodecResult<String> {
        self.codecs[0].encrypt(plaintext)
    }

    /// Decrypts with the first codec that accepts the token
    ///
    /// When a fallback codec succeeds the plaintext is re-encrypted under the
    /// primary codec and returned as `migrated_token`. If that re-encryption
    /// fails the plaintext is still returned, without a migration.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Decryption` naming every codec tried when none
    /// accepts the token.
    pub fn decrypt(&self, token: &str) -> CodecResult<Decrypted> {
        let primary = self.primary_id();
        if token.is_empty() {
            return Ok(Decrypted {
                plaintext: SecretString::from(String::new()),
                codec_id: primary,
                migrated_token: None,
            });
        }

        let mut failures = Vec::with_capacity(self.codecs.len());
        for (index, codec) in self.codecs.iter().enumerate() {
            let plaintext = match codec.decrypt(token) {
                Ok(plaintext) => plaintext,
                Err(e) => {
                    tracing::debug!(codec = codec.codec_id(), error = %e, "Codec rejected token");
                    failures.push(format!("{}: {e}", codec.codec_id()));
                    continue;
                }
            };

            if index == 0 {
                return Ok(Decrypted {
                    plaintext,
                    codec_id: primary,
                    migrated_token: None,
                });
            }

            let migrated_token = match self.encrypt(&plaintext) {
                Ok(migrated) => {
                    tracing::info!(from = codec.codec_id(), to = primary, "Secret migrated");
                    Some(migrated)
                }
                Err(e) => {
                    tracing::warn!(
                        from = codec.codec_id(),
                        to = primary,
                        error = %e,
                        "Secret read by fallback codec but could not be re-encrypted"
                    );
                    None
                }
            };
            return Ok(Decrypted {
                plaintext,
                codec_id: codec.codec_id(),
                migrated_token,
            });
        }

        Err(CodecError::Decryption(format!(
            "no codec accepted the token ({})",
            failures.join("; ")
        )))
    }
}
