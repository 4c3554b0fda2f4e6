//! In-memory user directory
//!
//! Maps usernames to group memberships. Registration is idempotent and
//! additive: registering a known user merges the new groups into the
//! existing set.

use crate::types::User;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};

/// Shared username → groups mapping
///
/// A single lock guards all reads and writes, so registrations may race
/// freely with discharge resolution on other threads.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl UserDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`, merging `groups` into any groups it already has
    ///
    /// Returns `true` if the user was newly created. Empty usernames are
    /// never registered.
    pub fn register<I, S>(&self, name: &str, groups: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if name.is_empty() {
            return false;
        }

        let mut users = self.users.write();
        let created = !users.contains_key(name);
        users
            .entry(name.to_string())
            .or_default()
            .extend(groups.into_iter().map(Into::into));
        created
    }

    /// Current groups of `name`; empty for unknown users
    pub fn groups(&self, name: &str) -> BTreeSet<String> {
        self.users.read().get(name).cloned().unwrap_or_default()
    }

    /// Snapshot of a registered user
    pub fn get(&self, name: &str) -> Option<User> {
        self.users.read().get(name).map(|groups| User {
            name: name.to_string(),
            groups: groups.clone(),
        })
    }

    /// Whether `name` has been registered
    pub fn contains(&self, name: &str) -> bool {
        self.users.read().contains_key(name)
    }

    /// Registered usernames, sorted
    pub fn users(&self) -> Vec<String> {
        let mut names: Vec<String> = self.users.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered users
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    /// Whether no users are registered
    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}
