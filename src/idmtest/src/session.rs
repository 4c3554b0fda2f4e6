//! Process-wide default identity
//!
//! Simulates a browser that is already logged in: when a discharge request
//! carries no caller identity, the default user (if any) is used instead.

use parking_lot::RwLock;

/// Optional default username shared by all requests
#[derive(Debug, Default)]
pub struct SessionDefault {
    user: RwLock<Option<String>>,
}

impl SessionDefault {
    /// Create a session with no default user
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default user
    ///
    /// May be called again: a later call replaces the previous default.
    /// An empty name clears the default.
    pub fn set(&self, name: impl Into<String>) {
        let name = name.into();
        *self.user.write() = if name.is_empty() { None } else { Some(name) };
    }

    /// Remove the default user
    pub fn clear(&self) {
        self.user.write().take();
    }

    /// Current default user
    pub fn get(&self) -> Option<String> {
        self.user.read().clone()
    }

    /// Explicit caller identity if present, otherwise the default user
    pub fn acting_user(&self, caller: Option<&str>) -> Option<String> {
        match caller {
            Some(name) if !name.is_empty() => Some(name.to_string()),
            _ => self.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_absent() {
        let session = SessionDefault::new();
        assert_eq!(session.get(), None);
        assert_eq!(session.acting_user(None), None);
    }

    #[test]
    fn test_caller_preferred_over_default() {
        let session = SessionDefault::new();
        session.set("bob");

        assert_eq!(session.acting_user(Some("alice")).as_deref(), Some("alice"));
        assert_eq!(session.acting_user(None).as_deref(), Some("bob"));
        assert_eq!(session.acting_user(Some("")).as_deref(), Some("bob"));
    }

    #[test]
    fn test_set_and_clear() {
        let session = SessionDefault::new();
        session.set("bob");
        session.set("carol");
        assert_eq!(session.get().as_deref(), Some("carol"));

        session.clear();
        assert_eq!(session.get(), None);

        session.set("dave");
        session.set("");
        assert_eq!(session.get(), None);
    }
}
