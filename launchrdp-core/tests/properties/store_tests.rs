//! Property tests for the JSON collections and host geometry

use launchrdp_core::models::{
    Host, HostSettings, User, WINDOW_FRAME_HEIGHT, WINDOW_FRAME_WIDTH, desktop_size_for_window,
};
use launchrdp_core::store::Storage;
use proptest::prelude::*;
use tempfile::TempDir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn save_load_is_idempotent(names in prop::collection::vec("[a-zA-Z]{1,12}", 0..8)) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path());
        let users: Vec<User> = names.iter().map(|n| User::new(n.as_str(), "", "")).collect();

        storage.users().save_all(&users).unwrap();
        let first = storage.users().load_all().unwrap();
        storage.users().save_all(&first).unwrap();
        let second = storage.users().load_all().unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), users.len());

        let keys: Vec<String> = first.iter().map(|u| u.username.to_lowercase()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        prop_assert_eq!(keys, sorted);
    }

    #[test]
    fn desktop_size_follows_window(width in any::<u32>(), height in any::<u32>()) {
        let (dw, dh) = desktop_size_for_window(width, height);
        prop_assert_eq!(dw, width.saturating_sub(WINDOW_FRAME_WIDTH));
        prop_assert_eq!(dh, height.saturating_sub(WINDOW_FRAME_HEIGHT));
    }

    #[test]
    fn full_update_recomputes_desktop(
        first in (0u32..5000, 0u32..5000),
        second in (0u32..5000, 0u32..5000),
    ) {
        let mut settings = HostSettings::new("h", "h");
        (settings.window_width, settings.window_height) = first;
        let mut host = Host::new(settings.clone());
        prop_assert_eq!(
            (host.desktop_width, host.desktop_height),
            desktop_size_for_window(first.0, first.1)
        );

        (settings.window_width, settings.window_height) = second;
        host.apply(settings);
        prop_assert_eq!(
            (host.desktop_width, host.desktop_height),
            desktop_size_for_window(second.0, second.1)
        );
    }
}
