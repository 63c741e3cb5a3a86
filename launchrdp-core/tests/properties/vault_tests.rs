//! Property tests for vault entry preparation

use launchrdp_core::error::VaultError;
use launchrdp_core::vault::{
    CredentialRequest, CredentialVault, MAX_SECRET_BYTES, MemoryVault, qualify_username,
    target_name,
};
use proptest::prelude::*;
use secrecy::{ExposeSecret, SecretString};

proptest! {
    #[test]
    fn domain_names_kept(
        address in "[a-z0-9.]{1,20}",
        domain in "[A-Z]{1,10}",
        user in "[a-z]{1,10}",
    ) {
        let name = format!("{domain}\\{user}");
        prop_assert_eq!(qualify_username(&address, &name), name);
    }

    #[test]
    fn bare_names_prefixed(address in "[a-z0-9.]{1,20}", user in "[a-z@.]{1,20}") {
        prop_assert_eq!(qualify_username(&address, &user), format!("{address}\\{user}"));
    }

    #[test]
    fn secret_blob_is_utf16le(address in "[a-z0-9.]{1,20}", password in "\\PC{1,100}") {
        let request = CredentialRequest::new(&address, "u", &SecretString::from(password.clone()));
        let expected: Vec<u8> = password.encode_utf16().flat_map(u16::to_le_bytes).collect();
        if expected.len() > MAX_SECRET_BYTES {
            let rejected = matches!(request, Err(VaultError::SecretTooLarge { .. }));
            prop_assert!(rejected);
        } else {
            let request = request.unwrap();
            prop_assert_eq!(request.secret_blob(), expected.as_slice());
            prop_assert_eq!(request.target, target_name(&address));
        }
    }

    #[test]
    fn store_then_delete(address in "[a-z0-9.]{1,20}", password in "[ -~]{1,64}") {
        let vault = MemoryVault::new();
        vault.store(&address, "alice", &SecretString::from(password.clone())).unwrap();
        let fetched = vault.get(&address).unwrap();
        prop_assert_eq!(fetched.secret.expose_secret(), password.as_str());
        vault.delete(&address).unwrap();
        let missing = matches!(vault.delete(&address), Err(VaultError::NotFound(_)));
        prop_assert!(missing);
    }
}

#[test]
fn size_limit_boundary() {
    let fits = SecretString::from("a".repeat(256));
    assert!(CredentialRequest::new("h", "u", &fits).is_ok());

    let too_long = SecretString::from("a".repeat(257));
    assert!(matches!(
        CredentialRequest::new("h", "u", &too_long),
        Err(VaultError::SecretTooLarge { size: 514, max: 512 })
    ));
}

#[test]
fn empty_fields_rejected() {
    let secret = SecretString::from("pw".to_string());
    assert!(matches!(
        CredentialRequest::new("", "u", &secret),
        Err(VaultError::InvalidInput(_))
    ));
    assert!(matches!(
        CredentialRequest::new("h", "", &secret),
        Err(VaultError::InvalidInput(_))
    ));
    assert!(matches!(
        CredentialRequest::new("h", "u", &SecretString::from(String::new())),
        Err(VaultError::InvalidInput(_))
    ));
}
