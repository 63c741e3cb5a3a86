//! Durable storage of users and hosts as JSON documents

mod json;

use std::path::Path;

use crate::error::StoreError;
use crate::models::{Host, User};

pub use json::{CollectionGuard, Entity, JsonCollection};

/// The user and host collections of one data directory
///
/// Operations touching both collections lock users before hosts.
#[derive(Debug)]
pub struct Storage {
    users: JsonCollection<User>,
    hosts: JsonCollection<Host>,
}

impl Storage {
    /// Opens the collections stored in `dir`
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            users: JsonCollection::new(dir),
            hosts: JsonCollection::new(dir),
        }
    }

    /// The user collection
    #[must_use]
    pub const fn users(&self) -> &JsonCollection<User> {
        &self.users
    }

    /// The host collection
    #[must_use]
    pub const fn hosts(&self) -> &JsonCollection<Host> {
        &self.hosts
    }

    /// Load-modify-save of both collections under both locks
    ///
    /// Users are written before hosts. An error from `f` aborts before
    /// anything is written.
    ///
    /// # Errors
    ///
    /// Returns the closure's error or any store error, converted into `E`.
    pub fn update_both<R, E>(
        &self,
        f: impl FnOnce(&mut Vec<User>, &mut Vec<Host>) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let users_guard = self.users.lock()?;
        let hosts_guard = self.hosts.lock()?;
        let mut users = users_guard.load()?;
        let mut hosts = hosts_guard.load()?;

        let result = f(&mut users, &mut hosts)?;

        users_guard.save(&mut users)?;
        hosts_guard.save(&mut hosts)?;
        Ok(result)
    }
}
