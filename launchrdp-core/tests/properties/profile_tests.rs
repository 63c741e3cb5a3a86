//! Property tests for connection profile generation

use launchrdp_core::models::{DisplayMode, Host, HostSettings, User};
use launchrdp_core::profile::{self, ProfileValue};
use proptest::prelude::*;

fn arb_host() -> impl Strategy<Value = Host> {
    (
        "[a-z0-9.-]{1,30}",
        1u16..,
        0u32..4000,
        0u32..3000,
        -2000i32..4000,
        -2000i32..4000,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(address, port, width, height, x, y, fullscreen, clipboard, drives)| {
                let mut settings = HostSettings::new("host", address);
                settings.port = port;
                settings.window_width = width;
                settings.window_height = height;
                settings.position_x = x;
                settings.position_y = y;
                settings.display_mode = if fullscreen {
                    DisplayMode::Fullscreen
                } else {
                    DisplayMode::Window
                };
                settings.redirect_clipboard = clipboard;
                settings.redirect_drives = drives;
                Host::new(settings)
            },
        )
}

proptest! {
    #[test]
    fn build_is_deterministic(host in arb_host(), username in "[a-zA-Z\\\\.]{1,20}") {
        let user = User::new(username, "", "");
        prop_assert_eq!(profile::build(&host, &user), profile::build(&host, &user));
    }

    #[test]
    fn leading_keys_in_order(host in arb_host()) {
        let user = User::new("alice", "", "");
        let doc = profile::build(&host, &user);
        let keys: Vec<&str> = doc.keys().take(10).collect();
        prop_assert_eq!(keys, vec![
            "full address",
            "server port",
            "username",
            "redirectclipboard",
            "dynamic resolution",
            "screen mode id",
            "desktopwidth",
            "desktopheight",
            "winposstr",
            "use multimon",
        ]);
    }

    #[test]
    fn window_position_spans_window(host in arb_host()) {
        let (w, h) = host.effective_window_size();
        let expected = format!(
            "0,1,{},{},{},{}",
            host.position_x,
            host.position_y,
            i64::from(host.position_x) + i64::from(w),
            i64::from(host.position_y) + i64::from(h),
        );
        prop_assert_eq!(profile::window_position(&host), expected);
    }

    #[test]
    fn display_settings(host in arb_host()) {
        let doc = profile::build(&host, &User::new("alice", "", ""));
        let fullscreen = host.display_mode == DisplayMode::Fullscreen;
        prop_assert_eq!(
            doc.get("screen mode id"),
            Some(&ProfileValue::Int(if fullscreen { 2 } else { 1 }))
        );
        prop_assert_eq!(doc.get("use multimon"), Some(&ProfileValue::Int(i64::from(fullscreen))));

        let width = doc.get("desktopwidth").cloned();
        if fullscreen && (host.desktop_width == 0 || host.desktop_height == 0) {
            prop_assert_eq!(width, Some(ProfileValue::Int(1920)));
        } else {
            prop_assert_eq!(width, Some(ProfileValue::Int(i64::from(host.desktop_width))));
        }
    }

    #[test]
    fn every_line_is_key_type_value(host in arb_host()) {
        let rendered = profile::build(&host, &User::new("CORP\\bob", "", "")).render();
        prop_assert!(rendered.ends_with('\n'));
        for line in rendered.lines() {
            let mut parts = line.splitn(3, ':');
            let key = parts.next().unwrap_or_default();
            let kind = parts.next().unwrap_or_default();
            prop_assert!(!key.is_empty());
            prop_assert!(kind == "s" || kind == "i", "bad type in {}", line);
            prop_assert!(parts.next().is_some());
        }
    }
}
