//! User, host and launch operations keeping the store and the vault in step
//!
//! [`LaunchService`] owns every collaborator explicitly: the entity store,
//! the codec chain, the credential vault and the session launcher. Record
//! saves and vault writes are independent: a vault failure is reported in a
//! [`CredentialSyncReport`] and never undoes or blocks the record save.

mod hosts;
mod launch;
mod report;
mod users;

use std::sync::Arc;

use secrecy::SecretString;

pub use report::{
    CredentialSyncReport, HostOutcome, SecretResolution, SecretState, UserOutcome,
};
pub use users::{NewUser, SecretUpdate, UserUpdate};

use crate::config::{AppSettings, ConfigManager};
use crate::error::{LaunchRdpError, LaunchRdpResult, VaultError};
use crate::models::{Host, User};
use crate::secret::CodecChain;
use crate::session::{DesktopWindowProbe, DetachedSpawner, SessionLauncher};
use crate::store::Storage;
use crate::tracing::span_names;
use crate::vault::{CredentialVault, platform_vault};

/// Entry point for every operation on users, hosts and sessions
pub struct LaunchService {
    storage: Storage,
    codecs: CodecChain,
    vault: Arc<dyn CredentialVault>,
    launcher: SessionLauncher,
}

impl std::fmt::Debug for LaunchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchService")
            .field("storage", &self.storage)
            .field("codecs", &self.codecs)
            .field("launcher", &self.launcher)
            .finish_non_exhaustive()
    }
}

impl LaunchService {
    /// Creates a service from explicit collaborators
    #[must_use]
    pub fn new(
        storage: Storage,
        codecs: CodecChain,
        vault: Arc<dyn CredentialVault>,
        launcher: SessionLauncher,
    ) -> Self {
        Self {
            storage,
            codecs,
            vault,
            launcher,
        }
    }

    /// Creates a service using this machine's codecs, vault and desktop
    #[must_use]
    pub fn for_platform(config: &ConfigManager, settings: &AppSettings) -> Self {
        let launcher = SessionLauncher::new(
            config.launcher_config(settings),
            Arc::new(DesktopWindowProbe::new()),
            Arc::new(DetachedSpawner::new()),
        );
        Self::new(
            config.storage(),
            CodecChain::platform_default(),
            platform_vault(),
            launcher,
        )
    }

    /// The entity store
    #[must_use]
    pub const fn storage(&self) -> &Storage {
        &self.storage
    }

    /// The codec chain
    #[must_use]
    pub const fn codecs(&self) -> &CodecChain {
        &self.codecs
    }

    /// The session launcher
    #[must_use]
    pub const fn launcher(&self) -> &SessionLauncher {
        &self.launcher
    }

    /// All users, sorted by username
    ///
    /// # Errors
    ///
    /// Returns a store error if `users.json` cannot be read.
    pub fn users(&self) -> LaunchRdpResult<Vec<User>> {
        Ok(self.storage.users().load_all()?)
    }

    /// All hosts, sorted by name
    ///
    /// # Errors
    ///
    /// Returns a store error if `hosts.json` cannot be read.
    pub fn hosts(&self) -> LaunchRdpResult<Vec<Host>> {
        Ok(self.storage.hosts().load_all()?)
    }

    /// The user with the given id
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` or a store error.
    pub fn user(&self, id: &str) -> LaunchRdpResult<User> {
        self.storage
            .users()
            .read(|users| users.iter().find(|u| u.id == id).cloned())?
            .ok_or_else(|| LaunchRdpError::UserNotFound(id.to_string()))
    }

    /// The host with the given id
    ///
    /// # Errors
    ///
    /// Returns `HostNotFound` or a store error.
    pub fn host(&self, id: &str) -> LaunchRdpResult<Host> {
        self.storage
            .hosts()
            .read(|hosts| hosts.iter().find(|h| h.id == id).cloned())?
            .ok_or_else(|| LaunchRdpError::HostNotFound(id.to_string()))
    }

    /// Decrypts a user's stored secret
    ///
    /// A token read by a fallback codec is re-encrypted with the primary
    /// codec and saved while the users collection is still locked;
    /// `migrated` is then set. An unreadable token is not an error.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` or a store error.
    pub fn resolve_secret(&self, user_id: &str) -> LaunchRdpResult<SecretResolution> {
        let _span =
            crate::trace_operation!(span_names::CREDENTIAL_RESOLVE, user_id = %user_id).entered();

        let guard = self.storage.users().lock()?;
        let mut users = guard.load()?;
        let resolution = self.resolve_token(find_user_mut(&mut users, user_id)?);
        if resolution.migrated {
            guard.save(&mut users)?;
            tracing::info!(user_id = %user_id, "Migrated secret saved");
        }
        Ok(resolution)
    }

    /// Decrypts `user`'s token, replacing it in place when it was migrated
    fn resolve_token(&self, user: &mut User) -> SecretResolution {
        if !user.has_secret() {
            return SecretResolution {
                state: SecretState::Absent,
                migrated: false,
            };
        }

        match self.codecs.decrypt(&user.encrypted_password) {
            Ok(decrypted) => {
                let migrated = match decrypted.migrated_token {
                    Some(token) => {
                        user.encrypted_password = token;
                        user.touch();
                        true
                    }
                    None => false,
                };
                SecretResolution {
                    state: SecretState::Present(decrypted.plaintext),
                    migrated,
                }
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %user.id,
                    error = %e,
                    "Stored secret is unreadable, credential sync skipped"
                );
                SecretResolution {
                    state: SecretState::Unreadable(e.to_string()),
                    migrated: false,
                }
            }
        }
    }

    fn store_entry(
        &self,
        report: &mut CredentialSyncReport,
        address: &str,
        username: &str,
        secret: &SecretString,
    ) {
        match self.vault.store(address, username, secret) {
            Ok(()) => {
                tracing::debug!(address, "Vault entry stored");
                report.record_success(address);
            }
            Err(e) => {
                tracing::warn!(address, error = %e, "Failed to store vault entry");
                report.record_failure(address, e.to_string());
            }
        }
    }

    /// Best-effort delete; a missing entry counts as deleted
    fn delete_entry(&self, report: &mut CredentialSyncReport, address: &str) {
        match self.vault.delete(address) {
            Ok(()) => {
                tracing::debug!(address, "Vault entry deleted");
                report.record_success(address);
            }
            Err(VaultError::NotFound(_)) => {
                tracing::debug!(address, "No vault entry to delete");
                report.record_success(address);
            }
            Err(e) => {
                tracing::warn!(address, error = %e, "Failed to delete vault entry");
                report.record_failure(address, e.to_string());
            }
        }
    }

    /// Applies a resolved secret to the vault entries of `hosts`
    fn sync_hosts(
        &self,
        report: &mut CredentialSyncReport,
        hosts: &[Host],
        username: &str,
        resolution: SecretResolution,
    ) {
        let _span =
            crate::trace_operation!(span_names::CREDENTIAL_SYNC, hosts = hosts.len()).entered();
        report.migrated |= resolution.migrated;
        match resolution.state {
            SecretState::Present(secret) => {
                for host in hosts {
                    self.store_entry(report, &host.address, username, &secret);
                }
            }
            SecretState::Absent => {}
            SecretState::Unreadable(reason) => report.skipped = Some(reason),
        }
    }

    fn hosts_assigned_to(&self, user_id: &str) -> LaunchRdpResult<Vec<Host>> {
        Ok(self.storage.hosts().read(|hosts| {
            hosts
                .iter()
                .filter(|h| h.is_assigned_to(user_id))
                .cloned()
                .collect()
        })?)
    }
}

fn find_user_mut<'a>(users: &'a mut [User], id: &str) -> LaunchRdpResult<&'a mut User> {
    users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or_else(|| LaunchRdpError::UserNotFound(id.to_string()))
}

fn find_host_mut<'a>(hosts: &'a mut [Host], id: &str) -> LaunchRdpResult<&'a mut Host> {
    hosts
        .iter_mut()
        .find(|h| h.id == id)
        .ok_or_else(|| LaunchRdpError::HostNotFound(id.to_string()))
}
