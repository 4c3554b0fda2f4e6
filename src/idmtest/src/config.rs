//! Server configuration
//!
//! Environment variables:
//! - `PORT` - HTTP server port (default: 8080)
//! - `IDM_LOCATION` - location third-party caveats are addressed to
//!   (default: `http://127.0.0.1:<PORT>`)
//! - `IDM_DEFAULT_USER` - session default user (default: none)
//! - `IDM_USERS` - users to register, `name[:group,group...][;name...]`

use crate::error::{IdmError, Result};
use crate::types::User;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

/// Identity server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// HTTP port
    pub port: u16,

    /// Location third-party caveats are addressed to
    pub location: String,

    /// Session default user
    pub default_user: Option<String>,

    /// Users registered at startup
    pub users: Vec<User>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            location: default_location(DEFAULT_PORT),
            default_user: None,
            users: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| IdmError::InvalidConfig(format!("PORT must be a port number, got {:?}", raw)))?,
            None => DEFAULT_PORT,
        };

        let location = lookup("IDM_LOCATION")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default_location(port));

        let default_user = lookup("IDM_DEFAULT_USER")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let users = match lookup("IDM_USERS") {
            Some(raw) => parse_users(&raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            port,
            location,
            default_user,
            users,
        })
    }
}

fn default_location(port: u16) -> String {
    format!("http://127.0.0.1:{}", port)
}

/// Parses `name[:group,group...][;name...]`
///
/// Repeated names are kept as separate entries; registration merges them.
pub fn parse_users(raw: &str) -> Result<Vec<User>> {
    let mut users = Vec::new();

    for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, groups) = match entry.split_once(':') {
            Some((name, groups)) => (name.trim(), groups),
            None => (entry, ""),
        };
        if name.is_empty() {
            return Err(IdmError::InvalidConfig(format!("missing user name in {:?}", entry)));
        }

        let mut user = User::new(name);
        user.groups.extend(
            groups
                .split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string),
        );
        users.push(user);
    }

    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.location, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_full_config() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("IDM_DEFAULT_USER", "bob"),
            ("IDM_USERS", "bob:beatles,bobbins; alice"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.location, "http://127.0.0.1:9000");
        assert_eq!(config.default_user.as_deref(), Some("bob"));
        assert_eq!(config.users.len(), 2);
        assert_eq!(config.users[0].name, "bob");
        assert!(config.users[0].groups.contains("bobbins"));
        assert_eq!(config.users[1], User::new("alice"));
    }

    #[test]
    fn test_explicit_location() {
        let config =
            ServerConfig::from_lookup(lookup(&[("IDM_LOCATION", "https://idm.example.com")])).unwrap();
        assert_eq!(config.location, "https://idm.example.com");
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, IdmError::InvalidConfig(_)));
    }

    #[test]
    fn test_invalid_users() {
        assert!(matches!(
            parse_users(":admins"),
            Err(IdmError::InvalidConfig(_))
        ));
        assert!(parse_users(" ; ").unwrap().is_empty());
    }
}
