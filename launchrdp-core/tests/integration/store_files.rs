//! On-disk format of `users.json` and `hosts.json`

use std::fs;

use launchrdp_core::error::StoreError;
use launchrdp_core::models::DisplayMode;
use launchrdp_core::store::Storage;
use launchrdp_core::{Host, HostSettings, LaunchRdpError, NewUser, User};
use tempfile::TempDir;

use super::support::fixture;

const OLD_USERS: &str = r#"{
  "users": [
    {
      "id": "1712345678901234567",
      "name": "Admin",
      "username": "CORP\\admin",
      "encrypted_password": "",
      "created_at": "2024-04-05T09:30:00.1234567+02:00",
      "modified_at": "2024-04-05T09:30:00.1234567+02:00"
    }
  ]
}"#;

const OLD_HOSTS: &str = r#"{
  "hosts": [
    {
      "id": "1712345678901234999",
      "name": "File server",
      "address": "fs01.corp",
      "port": 3390,
      "user_id": "",
      "display_mode": "windowed",
      "screen_mode": 1,
      "win_pos_str": "0,1,100,100,1300,900",
      "window_width": 1200,
      "window_height": 800,
      "desktop_width": 1184,
      "desktop_height": 761,
      "position_x": 100,
      "position_y": 100,
      "created_at": "2024-04-05T09:31:00Z",
      "modified_at": "2024-04-05T09:31:00Z"
    }
  ]
}"#;

#[test]
fn test_reads_files_from_older_versions() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("users.json"), OLD_USERS).unwrap();
    fs::write(dir.path().join("hosts.json"), OLD_HOSTS).unwrap();
    let storage = Storage::new(dir.path());

    let users = storage.users().load_all().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, "1712345678901234567");
    assert_eq!(users[0].username, "CORP\\admin");
    assert!(!users[0].has_secret());
    assert_eq!(users[0].created_at.timestamp(), 1_712_302_200);
    assert_eq!(users[0].created_at.timestamp_subsec_nanos(), 123_456_700);

    let hosts = storage.hosts().load_all().unwrap();
    let host = &hosts[0];
    assert_eq!(host.user_id, None);
    assert_eq!(host.display_mode, DisplayMode::Window);
    assert_eq!(host.port, 3390);
    assert!(host.redirect_clipboard);
    assert!(!host.redirect_drives);
    assert_eq!((host.desktop_width, host.desktop_height), (1184, 761));
}

#[test]
fn test_written_document_shape() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path());
    let hosts = [
        Host::new(HostSettings::new("zeta", "z")),
        Host::new(HostSettings::new("Alpha", "a")),
        Host::new(HostSettings::new("beta", "b")),
    ];
    storage.hosts().save_all(&hosts).unwrap();

    let text = fs::read_to_string(dir.path().join("hosts.json")).unwrap();
    assert!(text.starts_with("{\n  \"hosts\": [\n"));
    assert!(text.ends_with("}\n"));
    assert!(text.contains("\"user_id\": \"\""));
    assert!(text.contains("\"display_mode\": \"window\""));

    let names: Vec<String> = storage
        .hosts()
        .load_all()
        .unwrap()
        .into_iter()
        .map(|h| h.name)
        .collect();
    assert_eq!(names, vec!["Alpha", "beta", "zeta"]);
}

#[test]
fn test_failed_update_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path());
    storage
        .users()
        .save_all(&[User::new("alice", "", "")])
        .unwrap();
    let path = dir.path().join("users.json");
    let before = fs::read(&path).unwrap();

    let result: Result<(), StoreError> = storage.users().update(|users| {
        users.clear();
        Err(StoreError::Poisoned("users"))
    });
    assert!(result.is_err());
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_update_both_keeps_collections_in_step() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path());
    let user = User::new("alice", "", "");
    let host = Host::new(HostSettings::new("Build", "build01").with_user(&user.id));
    storage.users().save_all(&[user.clone()]).unwrap();
    storage.hosts().save_all(&[host]).unwrap();

    storage
        .update_both(|users, hosts| {
            users.retain(|u| u.id != user.id);
            for host in hosts.iter_mut() {
                host.user_id = None;
            }
            Ok::<_, StoreError>(())
        })
        .unwrap();

    assert!(storage.users().load_all().unwrap().is_empty());
    assert_eq!(storage.hosts().load_all().unwrap()[0].user_id, None);
}

#[test]
fn test_concurrent_creates_keep_every_record() {
    let dir = TempDir::new().unwrap();
    let f = fixture(dir.path());

    std::thread::scope(|scope| {
        for i in 0..16 {
            let service = &f.service;
            scope.spawn(move || {
                service.create_user(NewUser::new(format!("user{i:02}"))).unwrap();
            });
        }
    });

    let mut names: Vec<_> = f
        .service
        .users()
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    names.sort();
    let expected: Vec<_> = (0..16).map(|i| format!("user{i:02}")).collect();
    assert_eq!(names, expected);
}

#[test]
fn test_update_both_contends_with_single_collection_writers() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::new(dir.path());

    std::thread::scope(|scope| {
        for i in 0..8 {
            let storage = &storage;
            scope.spawn(move || {
                storage
                    .update_both(|users, hosts| {
                        let user = User::new(format!("pair{i}"), "", "");
                        hosts.push(Host::new(
                            HostSettings::new(format!("pair{i}"), format!("pair{i}.corp"))
                                .with_user(&user.id),
                        ));
                        users.push(user);
                        Ok::<_, StoreError>(())
                    })
                    .unwrap();
            });
            scope.spawn(move || {
                storage
                    .users()
                    .update(|users| {
                        users.push(User::new(format!("solo{i}"), "", ""));
                        Ok::<_, StoreError>(())
                    })
                    .unwrap();
            });
            scope.spawn(move || {
                storage
                    .hosts()
                    .update(|hosts| {
                        hosts.push(Host::new(HostSettings::new(
                            format!("solo{i}"),
                            format!("solo{i}.corp"),
                        )));
                        Ok::<_, StoreError>(())
                    })
                    .unwrap();
            });
        }
    });

    let users = storage.users().load_all().unwrap();
    let hosts = storage.hosts().load_all().unwrap();
    assert_eq!(users.len(), 16);
    assert_eq!(hosts.len(), 16);
    let assigned: Vec<_> = hosts.iter().filter(|h| h.user_id.is_some()).collect();
    assert_eq!(assigned.len(), 8);
    for host in assigned {
        assert!(users.iter().any(|u| host.is_assigned_to(&u.id)));
    }
}

#[test]
fn test_host_create_racing_user_delete_leaves_no_dangling_user() {
    let dir = TempDir::new().unwrap();
    let f = fixture(dir.path());
    let users: Vec<_> = (0..8)
        .map(|i| f.service.create_user(NewUser::new(format!("user{i}"))).unwrap())
        .collect();

    std::thread::scope(|scope| {
        for user in &users {
            let service = &f.service;
            scope.spawn(move || {
                let settings = HostSettings::new(&user.username, format!("{}.corp", user.username))
                    .with_user(&user.id);
                match service.create_host(settings) {
                    Ok(_) | Err(LaunchRdpError::UserNotFound(_)) => {}
                    Err(e) => panic!("unexpected error: {e}"),
                }
            });
            scope.spawn(move || {
                service.delete_user(&user.id).unwrap();
            });
        }
    });

    assert!(f.service.users().unwrap().is_empty());
    assert!(f.service.hosts().unwrap().iter().all(|h| h.user_id.is_none()));
}
