//! Outcomes of operations that touch the credential vault

use secrecy::SecretString;

use crate::models::{Host, User};

/// Per-host results of synchronising vault entries
///
/// Vault failures never abort the operation that caused them; they are
/// collected here instead.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CredentialSyncReport {
    /// Number of successful vault operations
    pub success_count: usize,
    /// Number of failed vault operations
    pub failure_count: usize,
    /// Addresses whose entry was stored or deleted
    pub synced_addresses: Vec<String>,
    /// Addresses whose vault operation failed
    pub failed_addresses: Vec<String>,
    /// Error messages, one per failed address
    pub errors: Vec<String>,
    /// A legacy token was re-encrypted and saved while resolving the secret
    pub migrated: bool,
    /// Why the sync was skipped, when the stored secret could not be read
    pub skipped: Option<String>,
}

impl CredentialSyncReport {
    /// Creates a new empty report
    #[must_use]
    pub const fn new() -> Self {
        Self {
            success_count: 0,
            failure_count: 0,
            synced_addresses: Vec::new(),
            failed_addresses: Vec::new(),
            errors: Vec::new(),
            migrated: false,
            skipped: None,
        }
    }

    /// Returns true if no vault operation failed
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failure_count == 0
    }

    /// Returns true if any vault operation failed
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.failure_count > 0
    }

    /// Returns the total number of vault operations attempted
    #[must_use]
    pub const fn total(&self) -> usize {
        self.success_count + self.failure_count
    }

    /// Returns true if the sync was skipped because the secret is unreadable
    #[must_use]
    pub const fn was_skipped(&self) -> bool {
        self.skipped.is_some()
    }

    pub(crate) fn record_success(&mut self, address: &str) {
        self.success_count += 1;
        self.synced_addresses.push(address.to_string());
    }

    pub(crate) fn record_failure(&mut self, address: &str, error: String) {
        self.failure_count += 1;
        self.failed_addresses.push(address.to_string());
        self.errors.push(error);
    }
}

/// A user after a mutation, with the vault results
#[derive(Debug, Clone)]
pub struct UserOutcome {
    /// The saved record
    pub user: User,
    /// Vault results for the user's hosts
    pub sync: CredentialSyncReport,
}

/// A host after a mutation, with the vault results
#[derive(Debug, Clone)]
pub struct HostOutcome {
    /// The saved record
    pub host: Host,
    /// Vault results for the host's address(es)
    pub sync: CredentialSyncReport,
}

/// State of a user's stored secret after resolution
#[derive(Debug)]
pub enum SecretState {
    /// The secret was decrypted
    Present(SecretString),
    /// No secret is stored
    Absent,
    /// No codec could read the stored token
    Unreadable(String),
}

/// Result of resolving a user's stored secret
#[derive(Debug)]
pub struct SecretResolution {
    /// The decrypted secret, or why there is none
    pub state: SecretState,
    /// The token was migrated to the primary codec and saved
    pub migrated: bool,
}

impl SecretResolution {
    /// The secret, if one was decrypted
    #[must_use]
    pub const fn secret(&self) -> Option<&SecretString> {
        match &self.state {
            SecretState::Present(secret) => Some(secret),
            SecretState::Absent | SecretState::Unreadable(_) => None,
        }
    }
}
