//! Group-membership access control
//!
//! An identity is allowed when its principal set, the identity itself plus
//! the groups recorded for it, intersects the ACL. Groups are flat: there
//! is no nesting.

use crate::directory::UserDirectory;
use crate::error::Result;
use crate::types::Identity;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Evaluates ACLs against the user directory
#[derive(Debug, Clone)]
pub struct AccessEvaluator {
    directory: Arc<UserDirectory>,
}

impl AccessEvaluator {
    /// Create an evaluator backed by `directory`
    pub fn new(directory: Arc<UserDirectory>) -> Self {
        Self { directory }
    }

    /// The identity's own name plus its registered groups
    ///
    /// Unregistered identities still contribute their own name.
    pub fn principals(&self, identity: &Identity) -> BTreeSet<String> {
        let mut principals = self.directory.groups(&identity.id);
        principals.insert(identity.id.clone());
        principals
    }

    /// Whether `identity` is granted by `acl`
    ///
    /// The in-memory directory never fails a lookup; the `Result` leaves room
    /// for backends that can.
    pub fn allow<S: AsRef<str>>(&self, identity: &Identity, acl: &[S]) -> Result<bool> {
        if acl.is_empty() {
            return Ok(false);
        }
        let principals = self.principals(identity);
        Ok(acl.iter().any(|entry| principals.contains(entry.as_ref())))
    }
}
