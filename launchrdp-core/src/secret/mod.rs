//! Password encryption for stored user records
//!
//! New secrets are protected with Windows DPAPI ([`ProtectedDataCodec`]).
//! Records written by older versions use a static machine key
//! ([`LegacyAesCodec`]); the [`CodecChain`] reads both and hands back a
//! replacement token whenever the legacy codec was needed.

mod chain;
mod codec;
mod dpapi;
mod legacy;

pub use chain::{CodecChain, Decrypted};
pub use codec::SecretCodec;
pub use dpapi::{DPAPI_CODEC_ID, ProtectedDataCodec};
pub use legacy::{LEGACY_CODEC_ID, LegacyAesCodec, derive_legacy_key};
