//! In-process vault for platforms without a credential store

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use secrecy::SecretString;

use super::{CredentialRequest, CredentialVault, target_name};
use crate::error::{VaultError, VaultResult};

/// A stored entry, as the Remote Desktop client would see it
#[derive(Debug, Clone)]
pub struct StoredCredential {
    /// Qualified username
    pub username: String,
    /// The secret
    pub secret: SecretString,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, StoredCredential>,
    failing: HashSet<String>,
}

/// Vault kept in memory for the lifetime of the process
///
/// Addresses registered with [`MemoryVault::fail_for`] make every call for
/// that address fail with `VaultError::Unavailable`.
#[derive(Debug, Default)]
pub struct MemoryVault {
    inner: Mutex<Inner>,
}

impl MemoryVault {
    /// Creates an empty vault
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> VaultResult<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| VaultError::Unavailable {
            code: None,
            message: "memory vault lock poisoned".to_string(),
        })
    }

    /// Makes subsequent calls for `address` fail
    pub fn fail_for(&self, address: &str) {
        if let Ok(mut inner) = self.lock() {
            inner.failing.insert(address.to_string());
        }
    }

    /// Removes a failure registered with [`MemoryVault::fail_for`]
    pub fn recover(&self, address: &str) {
        if let Ok(mut inner) = self.lock() {
            inner.failing.remove(address);
        }
    }

    /// Returns the entry stored for `address`
    #[must_use]
    pub fn get(&self, address: &str) -> Option<StoredCredential> {
        self.lock()
            .ok()
            .and_then(|inner| inner.entries.get(&target_name(address)).cloned())
    }

    /// Returns all targets, sorted
    #[must_use]
    pub fn targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self
            .lock()
            .map(|inner| inner.entries.keys().cloned().collect())
            .unwrap_or_default();
        targets.sort();
        targets
    }

    /// Number of stored entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    /// Returns true when nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn injected(address: &str) -> VaultError {
    VaultError::Unavailable {
        code: Some(1312),
        message: format!("injected failure for {address}"),
    }
}

impl CredentialVault for MemoryVault {
    fn store(&self, address: &str, username: &str, secret: &SecretString) -> VaultResult<()> {
        let request = CredentialRequest::new(address, username, secret)?;
        let mut inner = self.lock()?;
        if inner.failing.contains(address) {
            return Err(injected(address));
        }
        inner.entries.insert(
            request.target,
            StoredCredential {
                username: request.username,
                secret: secret.clone(),
            },
        );
        Ok(())
    }

    fn delete(&self, address: &str) -> VaultResult<()> {
        if address.is_empty() {
            return Err(VaultError::InvalidInput("address"));
        }
        let mut inner = self.lock()?;
        if inner.failing.contains(address) {
            return Err(injected(address));
        }
        let target = target_name(address);
        inner
            .entries
            .remove(&target)
            .map(|_| ())
            .ok_or(VaultError::NotFound(target))
    }
}
