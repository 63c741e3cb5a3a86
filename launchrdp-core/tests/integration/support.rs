//! Fakes shared by the integration tests

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use launchrdp_core::error::{CodecError, CodecResult, LaunchResult};
use launchrdp_core::secret::{CodecChain, LegacyAesCodec, SecretCodec};
use launchrdp_core::session::{
    DEFAULT_SESSION_WINDOW_CLASS, LauncherConfig, ProcessSpawner, SessionLauncher, WindowInfo,
    WindowProbe,
};
use launchrdp_core::store::Storage;
use launchrdp_core::vault::MemoryVault;
use launchrdp_core::LaunchService;
use secrecy::{ExposeSecret, SecretString};

pub const MACHINE: &str = "WORKSTATION-7";

/// Primary codec for tests: `v2:` followed by the plaintext
pub struct PlainCodec;

impl SecretCodec for PlainCodec {
    fn codec_id(&self) -> &'static str {
        "plain"
    }

    fn encrypt(&self, plaintext: &SecretString) -> CodecResult<String> {
        Ok(format!("v2:{}", plaintext.expose_secret()))
    }

    fn decrypt(&self, token: &str) -> CodecResult<SecretString> {
        token
            .strip_prefix("v2:")
            .map(|p| SecretString::from(p.to_string()))
            .ok_or_else(|| CodecError::Decryption("missing v2 prefix".to_string()))
    }
}

#[derive(Default)]
pub struct FakeProbe {
    pub windows: Mutex<Vec<WindowInfo>>,
    pub activated: Mutex<Vec<i64>>,
}

impl FakeProbe {
    pub fn open_session(&self, handle: i64, address: &str) {
        self.windows.lock().unwrap().push(WindowInfo {
            handle,
            class_name: DEFAULT_SESSION_WINDOW_CLASS.to_string(),
            title: format!("{address} - Remote Desktop Connection"),
        });
    }
}

impl WindowProbe for FakeProbe {
    fn list_visible_windows(&self) -> LaunchResult<Vec<WindowInfo>> {
        Ok(self.windows.lock().unwrap().clone())
    }

    fn is_minimized(&self, _handle: i64) -> LaunchResult<bool> {
        Ok(false)
    }

    fn restore(&self, _handle: i64) -> LaunchResult<()> {
        Ok(())
    }

    fn activate(&self, handle: i64) -> LaunchResult<()> {
        self.activated.lock().unwrap().push(handle);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSpawner {
    pub spawned: Mutex<Vec<(String, PathBuf)>>,
}

impl ProcessSpawner for RecordingSpawner {
    fn spawn(&self, program: &str, profile: &Path) -> LaunchResult<u32> {
        let mut spawned = self.spawned.lock().unwrap();
        spawned.push((program.to_string(), profile.to_path_buf()));
        Ok(500 + spawned.len() as u32)
    }
}

pub struct Fixture {
    pub service: LaunchService,
    pub vault: Arc<MemoryVault>,
    pub probe: Arc<FakeProbe>,
    pub spawner: Arc<RecordingSpawner>,
}

pub fn fixture(dir: &Path) -> Fixture {
    let vault = Arc::new(MemoryVault::new());
    let probe = Arc::new(FakeProbe::default());
    let spawner = Arc::new(RecordingSpawner::default());
    let codecs = CodecChain::new(Box::new(PlainCodec))
        .with_fallback(Box::new(LegacyAesCodec::with_machine_name(MACHINE)));
    let launcher = SessionLauncher::new(
        LauncherConfig::new(dir.join("temp")),
        probe.clone(),
        spawner.clone(),
    );
    Fixture {
        service: LaunchService::new(Storage::new(dir), codecs, vault.clone(), launcher),
        vault,
        probe,
        spawner,
    }
}

pub fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}
