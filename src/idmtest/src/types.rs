//! Core identity service types

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Declared key/value pairs read from a verified discharge
/// (e.g. `{"username": "bob"}`)
pub type DeclaredState = BTreeMap<String, String>;

/// Declared key carrying the resolved username
pub const USERNAME_KEY: &str = "username";

/// Prefix of a declared caveat condition
const DECLARED_PREFIX: &str = "declared";

/// Registered user with its group memberships
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Username (unique key)
    pub name: String,

    /// Groups the user belongs to
    #[serde(default)]
    pub groups: BTreeSet<String>,
}

impl User {
    /// Create a user with no groups
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: BTreeSet::new(),
        }
    }
}

/// Identity resolved for a single discharge or authorization request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Resolved username
    pub id: String,

    /// Domain qualifier, empty unless the request was domain-scoped
    #[serde(default)]
    pub domain: String,
}

impl Identity {
    /// Create an identity without a domain
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domain: String::new(),
        }
    }

    /// Attach a domain qualifier
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Username as bound into declared caveats: `id@domain` when
    /// domain-qualified, plain `id` otherwise.
    pub fn bound_name(&self) -> String {
        if self.domain.is_empty() {
            self.id.clone()
        } else {
            format!("{}@{}", self.id, self.domain)
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bound_name())
    }
}

/// Caveat attached to a macaroon
///
/// Third-party caveats carry the location of the authority that can
/// discharge them. First-party caveats (including declared caveats)
/// have no location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caveat {
    /// Location of the discharging authority (third-party caveats only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Caveat condition
    pub condition: String,
}

impl Caveat {
    /// Creates a first-party caveat
    pub fn first_party(condition: impl Into<String>) -> Self {
        Self {
            location: None,
            condition: condition.into(),
        }
    }

    /// Creates a third-party caveat addressed to `location`
    pub fn third_party(location: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            condition: condition.into(),
        }
    }

    /// Creates a declared caveat binding `key` to `value`
    pub fn declared(key: &str, value: &str) -> Self {
        Self::first_party(format!("{} {} {}", DECLARED_PREFIX, key, value))
    }

    /// Returns true if this is a third-party caveat
    pub fn is_third_party(&self) -> bool {
        self.location.is_some()
    }

    /// Key/value pair of a declared caveat, `None` for any other caveat
    pub fn declared_pair(&self) -> Option<(&str, &str)> {
        if self.is_third_party() {
            return None;
        }
        let rest = self.condition.strip_prefix(DECLARED_PREFIX)?.strip_prefix(' ')?;
        let (key, value) = rest.split_once(' ')?;
        if key.is_empty() {
            return None;
        }
        Some((key, value))
    }
}

/// Collects the declared pairs from a set of caveats
///
/// A key declared more than once with different values is left out:
/// conflicting declarations never bind.
pub fn infer_declared<'a>(caveats: impl IntoIterator<Item = &'a Caveat>) -> DeclaredState {
    let mut declared = DeclaredState::new();
    let mut conflicts = BTreeSet::new();

    for (key, value) in caveats.into_iter().filter_map(Caveat::declared_pair) {
        match declared.get(key) {
            Some(existing) if existing != value => {
                conflicts.insert(key.to_string());
            }
            Some(_) => {}
            None => {
                declared.insert(key.to_string(), value.to_string());
            }
        }
    }

    for key in conflicts {
        declared.remove(&key);
    }
    declared
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_bound_name() {
        assert_eq!(Identity::new("bob").bound_name(), "bob");
        assert_eq!(
            Identity::new("bob").with_domain("test-domain").bound_name(),
            "bob@test-domain"
        );
        assert_eq!(Identity::new("bob").with_domain("d").to_string(), "bob@d");
    }

    #[test]
    fn test_identity_equality() {
        assert_eq!(Identity::new("bob"), Identity::new("bob"));
        assert_ne!(Identity::new("bob"), Identity::new("bob").with_domain("x"));
        assert_ne!(Identity::new("bob"), Identity::new("alice"));
    }

    #[test]
    fn test_declared_caveat() {
        let caveat = Caveat::declared("username", "bob");
        assert_eq!(caveat.condition, "declared username bob");
        assert!(!caveat.is_third_party());
        assert_eq!(caveat.declared_pair(), Some(("username", "bob")));
    }

    #[test]
    fn test_non_declared_caveats() {
        let third = Caveat::third_party("http://idm", "is-authenticated-user");
        assert!(third.is_third_party());
        assert_eq!(third.declared_pair(), None);

        assert_eq!(Caveat::first_party("time-before 2030").declared_pair(), None);
        assert_eq!(Caveat::first_party("declaredx a b").declared_pair(), None);
        assert_eq!(Caveat::first_party("declared username").declared_pair(), None);
    }

    #[test]
    fn test_infer_declared() {
        let caveats = vec![
            Caveat::declared("username", "bob"),
            Caveat::declared("username", "bob"),
            Caveat::declared("team", "red"),
            Caveat::declared("team", "blue"),
            Caveat::third_party("http://idm", "is-authenticated-user"),
        ];

        let declared = infer_declared(&caveats);
        assert_eq!(declared.len(), 1);
        assert_eq!(declared.get("username").map(String::as_str), Some("bob"));
    }
}
