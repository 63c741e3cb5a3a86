//! User create, update and delete

use secrecy::{ExposeSecret, SecretString};

use super::{
    CredentialSyncReport, LaunchService, SecretResolution, SecretState, UserOutcome,
    find_user_mut,
};
use crate::error::{LaunchRdpError, LaunchRdpResult};
use crate::models::User;
use crate::tracing::span_names;

/// What to do with a user's stored secret on update
#[derive(Debug, Default)]
pub enum SecretUpdate {
    /// Keep the stored token
    #[default]
    Unchanged,
    /// Remove the stored token and the vault entries of the user's hosts
    Clear,
    /// Encrypt and store a new secret; must not be empty
    Set(SecretString),
}

/// Input of [`LaunchService::create_user`]
#[derive(Debug)]
pub struct NewUser {
    /// Logon name
    pub username: String,
    /// Informational login name
    pub login: String,
    /// Informational domain name
    pub domain: String,
    /// Initial secret
    pub password: Option<SecretString>,
}

impl NewUser {
    /// A user with only a username
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            login: String::new(),
            domain: String::new(),
            password: None,
        }
    }

    /// Sets the initial secret
    #[must_use]
    pub fn with_password(mut self, password: SecretString) -> Self {
        self.password = Some(password);
        self
    }
}

/// Full replacement of a user's editable fields
#[derive(Debug)]
pub struct UserUpdate {
    /// Logon name
    pub username: String,
    /// Informational login name
    pub login: String,
    /// Informational domain name
    pub domain: String,
    /// Secret change
    pub password: SecretUpdate,
}

impl UserUpdate {
    /// The current fields of `user` with the secret left unchanged
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            login: user.login.clone(),
            domain: user.domain.clone(),
            password: SecretUpdate::Unchanged,
        }
    }

    /// Sets the secret change
    #[must_use]
    pub fn with_password(mut self, password: SecretUpdate) -> Self {
        self.password = password;
        self
    }
}

/// Vault work decided while the users collection is locked
enum VaultPlan {
    Nothing,
    Store(SecretResolution),
    Delete,
}

impl LaunchService {
    /// Creates a user, encrypting the initial secret with the primary codec
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty username or secret, a codec error
    /// if encryption fails, or a store error.
    pub fn create_user(&self, new_user: NewUser) -> LaunchRdpResult<User> {
        validate_username(&new_user.username)?;
        let mut user = User::new(new_user.username, new_user.login, new_user.domain);
        if let Some(password) = &new_user.password {
            user.encrypted_password = self.encrypt_password(password)?;
        }

        self.storage.users().update(|users| {
            users.push(user.clone());
            Ok::<_, LaunchRdpError>(())
        })?;
        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    /// Replaces a user's fields and brings the vault entries of the user's
    /// hosts in line with the result
    ///
    /// With [`SecretUpdate::Set`] every assigned host receives the new
    /// secret; with [`SecretUpdate::Clear`] their entries are deleted; with
    /// [`SecretUpdate::Unchanged`] entries are rewritten only when the
    /// username changed. Vault failures are reported, not returned.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput`, `UserNotFound`, a codec error if the new
    /// secret cannot be encrypted, or a store error; nothing is written then.
    pub fn update_user(&self, id: &str, update: UserUpdate) -> LaunchRdpResult<UserOutcome> {
        let _span = crate::trace_operation!(span_names::USER_MUTATE, user_id = %id).entered();
        validate_username(&update.username)?;

        let UserUpdate {
            username,
            login,
            domain,
            password,
        } = update;
        let clear = matches!(password, SecretUpdate::Clear);
        let replacement = match password {
            SecretUpdate::Set(secret) => Some((self.encrypt_password(&secret)?, secret)),
            SecretUpdate::Clear | SecretUpdate::Unchanged => None,
        };

        let guard = self.storage.users().lock()?;
        let mut users = guard.load()?;
        let user = find_user_mut(&mut users, id)?;
        let renamed = user.username != username;
        user.username = username;
        user.login = login;
        user.domain = domain;

        let plan = if let Some((token, secret)) = replacement {
            user.encrypted_password = token;
            VaultPlan::Store(SecretResolution {
                state: SecretState::Present(secret),
                migrated: false,
            })
        } else if clear {
            user.encrypted_password.clear();
            VaultPlan::Delete
        } else if renamed {
            VaultPlan::Store(self.resolve_token(user))
        } else {
            VaultPlan::Nothing
        };
        user.touch();
        let user = user.clone();

        // A hosts read error must abort before the user is saved.
        let hosts = match &plan {
            VaultPlan::Nothing => Vec::new(),
            VaultPlan::Store(_) | VaultPlan::Delete => self.hosts_assigned_to(id)?,
        };
        guard.save(&mut users)?;
        drop(guard);

        let mut sync = CredentialSyncReport::new();
        match plan {
            VaultPlan::Nothing => {}
            VaultPlan::Delete => {
                let _span =
                    crate::trace_operation!(span_names::CREDENTIAL_SYNC, user_id = %id).entered();
                for host in &hosts {
                    self.delete_entry(&mut sync, &host.address);
                }
            }
            VaultPlan::Store(resolution) => {
                self.sync_hosts(&mut sync, &hosts, &user.username, resolution);
            }
        }

        tracing::info!(
            user_id = %id,
            synced = sync.success_count,
            failed = sync.failure_count,
            "User updated"
        );
        Ok(UserOutcome { user, sync })
    }

    /// Deletes a user, unassigns its hosts and deletes their vault entries
    ///
    /// Every vault delete is attempted regardless of earlier failures.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` or a store error; nothing is written then.
    pub fn delete_user(&self, id: &str) -> LaunchRdpResult<CredentialSyncReport> {
        let _span = crate::trace_operation!(span_names::USER_MUTATE, user_id = %id).entered();

        let addresses = self.storage.update_both(|users, hosts| {
            let index = users
                .iter()
                .position(|u| u.id == id)
                .ok_or_else(|| LaunchRdpError::UserNotFound(id.to_string()))?;
            users.remove(index);

            let mut addresses = Vec::new();
            for host in hosts.iter_mut().filter(|h| h.is_assigned_to(id)) {
                host.user_id = None;
                host.touch();
                addresses.push(host.address.clone());
            }
            Ok::<_, LaunchRdpError>(addresses)
        })?;

        let mut sync = CredentialSyncReport::new();
        {
            let _span =
                crate::trace_operation!(span_names::CREDENTIAL_SYNC, user_id = %id).entered();
            for address in &addresses {
                self.delete_entry(&mut sync, address);
            }
        }
        tracing::info!(
            user_id = %id,
            unassigned = addresses.len(),
            failed = sync.failure_count,
            "User deleted"
        );
        Ok(sync)
    }

    fn encrypt_password(&self, password: &SecretString) -> LaunchRdpResult<String> {
        if password.expose_secret().is_empty() {
            return Err(LaunchRdpError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }
        Ok(self.codecs.encrypt(password)?)
    }
}

fn validate_username(username: &str) -> LaunchRdpResult<()> {
    if username.trim().is_empty() {
        return Err(LaunchRdpError::InvalidInput(
            "username must not be empty".to_string(),
        ));
    }
    Ok(())
}
