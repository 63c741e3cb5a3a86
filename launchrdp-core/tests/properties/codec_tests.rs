//! Property tests for the password codecs

use launchrdp_core::secret::{CodecChain, LegacyAesCodec, SecretCodec, derive_legacy_key};
use proptest::prelude::*;
use secrecy::{ExposeSecret, SecretString};

use super::PlainCodec;

proptest! {
    #[test]
    fn legacy_roundtrip(
        machine in "[A-Z0-9-]{1,15}",
        password in "\\PC{1,64}",
    ) {
        let codec = LegacyAesCodec::with_machine_name(&machine);
        let token = codec.encrypt(&SecretString::from(password.clone())).unwrap();
        let plain = codec.decrypt(&token).unwrap();
        prop_assert_eq!(plain.expose_secret(), password.as_str());
    }

    #[test]
    fn legacy_tokens_bound_to_machine(
        password in "[a-zA-Z0-9]{1,32}",
    ) {
        let token = LegacyAesCodec::with_machine_name("HOST-A")
            .encrypt(&SecretString::from(password))
            .unwrap();
        prop_assert!(LegacyAesCodec::with_machine_name("HOST-B").decrypt(&token).is_err());
    }

    #[test]
    fn legacy_key_is_always_32_bytes(machine in "\\PC{0,80}") {
        let key = derive_legacy_key(&machine);
        prop_assert_eq!(key.len(), 32);
        let seed = format!("{machine}LaunchRDP_Secret_Key_12345");
        let prefix = &seed.as_bytes()[..seed.len().min(32)];
        prop_assert_eq!(&key[..prefix.len()], prefix);
        prop_assert!(key[prefix.len()..].iter().all(|&b| b == b'X'));
    }

    #[test]
    fn chain_migrates_legacy_tokens_to_primary(password in "[ -~]{1,48}") {
        let legacy = LegacyAesCodec::with_machine_name("WS01");
        let token = legacy.encrypt(&SecretString::from(password.clone())).unwrap();
        let chain = CodecChain::new(Box::new(PlainCodec))
            .with_fallback(Box::new(LegacyAesCodec::with_machine_name("WS01")));

        let decrypted = chain.decrypt(&token).unwrap();
        prop_assert_eq!(decrypted.plaintext.expose_secret(), password.as_str());
        prop_assert_eq!(decrypted.codec_id, "legacy-aes");
        let migrated = decrypted.migrated_token.unwrap();
        let migrated_plain = PlainCodec.decrypt(&migrated).unwrap();
        prop_assert_eq!(
            migrated_plain.expose_secret(),
            password.as_str()
        );

        let again = chain.decrypt(&migrated).unwrap();
        prop_assert!(!again.needs_migration());
    }

    #[test]
    fn chain_encrypts_with_primary_only(password in "[ -~]{1,48}") {
        let chain = CodecChain::new(Box::new(PlainCodec))
            .with_fallback(Box::new(LegacyAesCodec::with_machine_name("WS01")));
        let token = chain.encrypt(&SecretString::from(password.clone())).unwrap();
        prop_assert_eq!(token, format!("v2:{password}"));
    }
}

#[test]
fn empty_token_and_plaintext() {
    let chain = CodecChain::new(Box::new(LegacyAesCodec::with_machine_name("WS01")));
    assert_eq!(chain.encrypt(&SecretString::from(String::new())).unwrap(), "");
    let decrypted = chain.decrypt("").unwrap();
    assert_eq!(decrypted.plaintext.expose_secret(), "");
    assert!(!decrypted.needs_migration());
}
