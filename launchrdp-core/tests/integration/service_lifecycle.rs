//! End-to-end behaviour of `LaunchService` over a temporary data directory

use std::fs;

use launchrdp_core::error::StoreError;
use launchrdp_core::secret::{LegacyAesCodec, SecretCodec};
use launchrdp_core::{
    HostSettings, LaunchOutcome, LaunchRdpError, NewUser, SecretUpdate, User, UserUpdate,
};
use secrecy::ExposeSecret;
use tempfile::TempDir;

use super::support::{MACHINE, fixture, secret};

#[test]
fn test_second_launch_reuses_open_session() {
    let dir = TempDir::new().unwrap();
    let f = fixture(dir.path());
    let user = f
        .service
        .create_user(NewUser::new("alice").with_password(secret("Zq9!kestrel")))
        .unwrap();
    let host = f
        .service
        .create_host(HostSettings::new("Build", "build01.corp").with_user(&user.id))
        .unwrap()
        .host;

    let first = f.service.launch(&host.id, None).unwrap();
    let LaunchOutcome::Launched { pid, profile_path } = first else {
        panic!("first launch must start a client");
    };
    assert_eq!(pid, 501);
    let profile = fs::read_to_string(&profile_path).unwrap();
    assert!(profile.starts_with("full address:s:build01.corp\n"));
    assert!(!profile.contains("kestrel"));

    f.probe.open_session(42, "BUILD01.corp");
    let second = f.service.launch(&host.id, None).unwrap();
    assert_eq!(
        second,
        LaunchOutcome::Reused {
            handle: 42,
            title: "BUILD01.corp - Remote Desktop Connection".to_string(),
        }
    );
    assert_eq!(*f.probe.activated.lock().unwrap(), vec![42]);
    assert_eq!(f.spawner.spawned.lock().unwrap().len(), 1);
}

#[test]
fn test_legacy_token_migrated_on_first_read() {
    let dir = TempDir::new().unwrap();
    let f = fixture(dir.path());
    let legacy = LegacyAesCodec::with_machine_name(MACHINE);
    let mut user = User::new("alice", "alice", "CORP");
    user.encrypted_password = legacy.encrypt(&secret("s3cret")).unwrap();
    f.service.storage().users().save_all(&[user.clone()]).unwrap();

    let outcome = f
        .service
        .create_host(HostSettings::new("Build", "build01").with_user(&user.id))
        .unwrap();
    assert!(outcome.sync.migrated);
    assert_eq!(
        f.vault.get("build01").unwrap().secret.expose_secret(),
        "s3cret"
    );

    let saved = f.service.user(&user.id).unwrap();
    assert_eq!(saved.encrypted_password, "v2:s3cret");
    assert!(saved.modified_at >= user.modified_at);

    let again = f.service.resolve_secret(&user.id).unwrap();
    assert!(!again.migrated);
}

#[test]
fn test_password_change_with_one_failing_host() {
    let dir = TempDir::new().unwrap();
    let f = fixture(dir.path());
    let user = f.service.create_user(NewUser::new("CORP\\alice")).unwrap();
    for address in ["a.corp", "b.corp"] {
        f.service
            .create_host(HostSettings::new(address, address).with_user(&user.id))
            .unwrap();
    }
    f.vault.fail_for("a.corp");

    let outcome = f
        .service
        .update_user(
            &user.id,
            UserUpdate::from_user(&user).with_password(SecretUpdate::Set(secret("new-pw"))),
        )
        .unwrap();

    assert_eq!(outcome.sync.failed_addresses, vec!["a.corp"]);
    assert_eq!(outcome.sync.synced_addresses, vec!["b.corp"]);
    assert_eq!(outcome.sync.errors.len(), 1);
    assert_eq!(
        f.service.user(&user.id).unwrap().encrypted_password,
        "v2:new-pw"
    );
    assert_eq!(f.vault.get("b.corp").unwrap().username, "CORP\\alice");

    f.vault.recover("a.corp");
    f.vault.fail_for("b.corp");
    let report = f.service.delete_user(&user.id).unwrap();
    assert_eq!(report.total(), 2);
    assert_eq!(report.failed_addresses, vec!["b.corp"]);
    assert!(f
        .service
        .hosts()
        .unwrap()
        .iter()
        .all(|host| host.user_id.is_none()));
}

#[test]
fn test_corrupt_hosts_file_is_left_alone() {
    let dir = TempDir::new().unwrap();
    let f = fixture(dir.path());
    let path = dir.path().join("hosts.json");
    let garbage = b"{ \"hosts\": [ { \"id\": ";
    fs::write(&path, garbage).unwrap();

    let err = f
        .service
        .create_host(HostSettings::new("Build", "build01"))
        .unwrap_err();
    assert!(matches!(
        err,
        LaunchRdpError::Store(StoreError::Corrupt { .. })
    ));
    assert_eq!(fs::read(&path).unwrap(), garbage);

    assert!(f.service.create_user(NewUser::new("alice")).is_ok());
    assert!(matches!(
        f.service.hosts(),
        Err(LaunchRdpError::Store(StoreError::Corrupt { .. }))
    ));
}

#[test]
fn test_reassigning_to_unreadable_secret_removes_old_entry() {
    let dir = TempDir::new().unwrap();
    let f = fixture(dir.path());
    let alice = f
        .service
        .create_user(NewUser::new("alice").with_password(secret("a-pw")))
        .unwrap();
    let bob = f
        .service
        .create_user(NewUser::new("bob").with_password(secret("b-pw")))
        .unwrap();
    let host = f
        .service
        .create_host(HostSettings::new("Build", "b01").with_user(&alice.id))
        .unwrap()
        .host;
    assert_eq!(f.vault.get("b01").unwrap().username, "b01\\alice");

    f.service
        .storage()
        .users()
        .update(|users| {
            for user in users.iter_mut().filter(|u| u.id == bob.id) {
                user.encrypted_password = "garbage".to_string();
            }
            Ok::<_, StoreError>(())
        })
        .unwrap();

    let outcome = f
        .service
        .update_host(&host.id, HostSettings::from_host(&host).with_user(&bob.id))
        .unwrap();
    assert_eq!(outcome.host.user_id.as_deref(), Some(bob.id.as_str()));
    assert!(outcome.sync.was_skipped());
    assert!(outcome.sync.is_success());
    assert!(f.vault.get("b01").is_none());
}

#[test]
fn test_user_update_with_corrupt_hosts_file_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let f = fixture(dir.path());
    let user = f
        .service
        .create_user(NewUser::new("alice").with_password(secret("old")))
        .unwrap();
    f.service
        .create_host(HostSettings::new("Build", "build01").with_user(&user.id))
        .unwrap();
    fs::write(dir.path().join("hosts.json"), b"{ \"hosts\": [").unwrap();
    let users_before = fs::read(dir.path().join("users.json")).unwrap();

    let err = f
        .service
        .update_user(
            &user.id,
            UserUpdate::from_user(&user).with_password(SecretUpdate::Set(secret("new"))),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        LaunchRdpError::Store(StoreError::Corrupt { .. })
    ));
    assert_eq!(fs::read(dir.path().join("users.json")).unwrap(), users_before);
    assert_eq!(f.service.user(&user.id).unwrap().encrypted_password, "v2:old");
    assert_eq!(f.vault.get("build01").unwrap().secret.expose_secret(), "old");
}

#[test]
fn test_host_update_with_corrupt_users_file_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let f = fixture(dir.path());
    let user = f
        .service
        .create_user(NewUser::new("alice").with_password(secret("pw")))
        .unwrap();
    let host = f
        .service
        .create_host(HostSettings::new("Build", "build01").with_user(&user.id))
        .unwrap()
        .host;
    fs::write(dir.path().join("users.json"), b"{ \"users\": [").unwrap();

    let mut settings = HostSettings::from_host(&host);
    settings.address = "build02".to_string();
    let err = f.service.update_host(&host.id, settings).unwrap_err();
    assert!(matches!(
        err,
        LaunchRdpError::Store(StoreError::Corrupt { .. })
    ));
    assert_eq!(f.service.hosts().unwrap(), vec![host]);
    assert!(f.vault.get("build01").is_some());
    assert!(f.vault.get("build02").is_none());
}

#[test]
fn test_profile_only_generation() {
    let dir = TempDir::new().unwrap();
    let f = fixture(dir.path());
    let user = f.service.create_user(NewUser::new("alice")).unwrap();
    let mut settings = HostSettings::new("Big", "big01").with_user(&user.id);
    settings.display_mode = launchrdp_core::DisplayMode::Fullscreen;
    let host = f.service.create_host(settings).unwrap().host;

    let path = f.service.generate_profile(&host.id, None).unwrap();
    assert!(path.is_absolute());
    let profile = fs::read_to_string(&path).unwrap();
    assert!(profile.contains("screen mode id:i:2\n"));
    assert!(profile.contains("use multimon:i:1\n"));
    assert!(f.spawner.spawned.lock().unwrap().is_empty());

    assert_eq!(f.service.cleanup_profiles().unwrap(), 1);
}
