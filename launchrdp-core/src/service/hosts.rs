//! Host create, update and delete

use super::{
    CredentialSyncReport, HostOutcome, LaunchService, SecretResolution, SecretState,
    find_host_mut, find_user_mut,
};
use crate::error::{LaunchRdpError, LaunchRdpResult};
use crate::models::{Host, HostSettings, User};
use crate::tracing::span_names;

impl LaunchService {
    /// Creates a host and stores the assigned user's secret under its address
    ///
    /// The user is looked up and its secret resolved with both collections
    /// locked.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for invalid settings, `UserNotFound` for an
    /// unknown user, or a store error; nothing is written then.
    pub fn create_host(&self, settings: HostSettings) -> LaunchRdpResult<HostOutcome> {
        settings.validate().map_err(LaunchRdpError::InvalidInput)?;
        let host = Host::new(settings);
        let _span = crate::trace_operation!(span_names::HOST_MUTATE, host_id = %host.id).entered();

        let plan = self.storage.update_both(|users, hosts| {
            let plan = self.plan_entry(users, &host, true)?;
            hosts.push(host.clone());
            Ok::<_, LaunchRdpError>(plan)
        })?;

        let mut sync = CredentialSyncReport::new();
        self.sync_host_entry(&mut sync, &host, plan, false);
        tracing::info!(host_id = %host.id, "Host created");
        Ok(HostOutcome { host, sync })
    }

    /// Replaces a host's fields and recomputes its desktop size
    ///
    /// When the address changed the entry under the old address is deleted.
    /// When the address or the user changed the entry is rewritten from the
    /// assigned user's secret, or deleted if there is no readable secret to
    /// replace it with.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput`, `HostNotFound`, `UserNotFound` or a store
    /// error; nothing is written then.
    pub fn update_host(&self, id: &str, settings: HostSettings) -> LaunchRdpResult<HostOutcome> {
        let _span = crate::trace_operation!(span_names::HOST_MUTATE, host_id = %id).entered();
        settings.validate().map_err(LaunchRdpError::InvalidInput)?;

        let (previous_address, host, plan) = self.storage.update_both(|users, hosts| {
            let host = find_host_mut(hosts, id)?;
            let previous_address = host.address.clone();
            let previous_user = host.user_id.clone();
            host.apply(settings);
            let host = host.clone();

            let changed = previous_address != host.address || previous_user != host.user_id;
            let plan = self.plan_entry(users, &host, changed)?;
            Ok::<_, LaunchRdpError>((previous_address, host, plan))
        })?;

        let mut sync = CredentialSyncReport::new();
        let address_changed = previous_address != host.address;
        if address_changed {
            self.delete_entry(&mut sync, &previous_address);
        }
        self.sync_host_entry(&mut sync, &host, plan, !address_changed);

        tracing::info!(
            host_id = %id,
            address_changed,
            failed = sync.failure_count,
            "Host updated"
        );
        Ok(HostOutcome { host, sync })
    }

    /// Deletes a host and its vault entry
    ///
    /// # Errors
    ///
    /// Returns `HostNotFound` or a store error; nothing is written then.
    pub fn delete_host(&self, id: &str) -> LaunchRdpResult<CredentialSyncReport> {
        let _span = crate::trace_operation!(span_names::HOST_MUTATE, host_id = %id).entered();

        let host = self.storage.hosts().update(|hosts| {
            let index = hosts
                .iter()
                .position(|h| h.id == id)
                .ok_or_else(|| LaunchRdpError::HostNotFound(id.to_string()))?;
            Ok::<_, LaunchRdpError>(hosts.remove(index))
        })?;

        let mut sync = CredentialSyncReport::new();
        self.delete_entry(&mut sync, &host.address);
        tracing::info!(host_id = %id, "Host deleted");
        Ok(sync)
    }

    /// Checks that the host's user exists and, with `resolve`, decrypts its secret
    ///
    /// Runs with both collections locked. A migrated token is replaced in
    /// `users` and saved with them.
    fn plan_entry(
        &self,
        users: &mut [User],
        host: &Host,
        resolve: bool,
    ) -> LaunchRdpResult<EntryPlan> {
        let Some(user_id) = host.user_id.as_deref() else {
            return Ok(if resolve { EntryPlan::Unassigned } else { EntryPlan::Keep });
        };
        let user = find_user_mut(users, user_id)?;
        if !resolve {
            return Ok(EntryPlan::Keep);
        }
        let resolution = self.resolve_token(user);
        Ok(EntryPlan::Assigned {
            username: user.username.clone(),
            resolution,
        })
    }

    /// Carries out the vault work planned for `host`
    ///
    /// With `clear_stale` an entry left by a previous user is deleted when
    /// there is no readable secret to replace it with.
    fn sync_host_entry(
        &self,
        sync: &mut CredentialSyncReport,
        host: &Host,
        plan: EntryPlan,
        clear_stale: bool,
    ) {
        let (username, resolution) = match plan {
            EntryPlan::Keep => return,
            EntryPlan::Unassigned => {
                if clear_stale {
                    self.delete_entry(sync, &host.address);
                }
                return;
            }
            EntryPlan::Assigned {
                username,
                resolution,
            } => (username, resolution),
        };

        if clear_stale {
            match &resolution.state {
                SecretState::Present(_) => {}
                SecretState::Absent => self.delete_entry(sync, &host.address),
                SecretState::Unreadable(_) => {
                    tracing::warn!(
                        host_id = %host.id,
                        "Assigned user's secret is unreadable, previous vault entry removed"
                    );
                    self.delete_entry(sync, &host.address);
                }
            }
        }
        self.sync_hosts(sync, std::slice::from_ref(host), &username, resolution);
    }
}

/// Vault work for one host, decided while the collections are locked
enum EntryPlan {
    /// Address and user unchanged
    Keep,
    /// The host has no user
    Unassigned,
    /// Store the user's secret
    Assigned {
        username: String,
        resolution: SecretResolution,
    },
}
