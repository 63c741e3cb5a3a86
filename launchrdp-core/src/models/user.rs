//! Stored user accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A login used to connect to one or more hosts
///
/// The password is never held in clear: `encrypted_password` carries a
/// codec token and `""` means no secret is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier, immutable after creation
    pub id: String,
    /// Logon name sent to the host (`user`, `DOMAIN\user` or `user@domain`)
    pub username: String,
    /// Informational login name
    #[serde(default)]
    pub login: String,
    /// Informational domain name
    #[serde(default)]
    pub domain: String,
    /// Encrypted password token
    #[serde(default)]
    pub encrypted_password: String,
    /// Creation time
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    /// Last modification time
    #[serde(default)]
    pub modified_at: DateTime<Utc>,
}

impl User {
    /// Creates a user with a fresh id and timestamps and no secret
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        login: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.into(),
            login: login.into(),
            domain: domain.into(),
            encrypted_password: String::new(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Returns true when a secret token is stored
    #[must_use]
    pub fn has_secret(&self) -> bool {
        !self.encrypted_password.is_empty()
    }

    /// Updates `modified_at`
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}
