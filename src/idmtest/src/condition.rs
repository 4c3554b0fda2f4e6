//! Third-party caveat condition parsing
//!
//! Recognized grammar:
//!
//! ```text
//! is-authenticated-user
//! is-authenticated-user @<domain>
//! ```
//!
//! Domain validation only applies once the `@` marker is recognized; any
//! other trailing text makes the whole condition unknown.

use crate::error::{IdmError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Condition discharged by the identity service
pub const IS_AUTHENTICATED_USER: &str = "is-authenticated-user";

/// Alphanumeric-and-hyphen token, optionally dotted, with no leading hyphen
static DOMAIN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.\-]*$").expect("domain pattern is valid"));

/// Operation requested by a caveat condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// Caller must be a known, authenticated user
    IsAuthenticatedUser,
}

impl Operation {
    /// Condition keyword for this operation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IsAuthenticatedUser => IS_AUTHENTICATED_USER,
        }
    }
}

/// Structured form of a caveat condition
///
/// Only produced by [`parse_condition`], so a present domain always passes
/// [`validate_domain`]. Serializes as the condition string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParsedCondition {
    operation: Operation,
    domain: Option<String>,
}

impl ParsedCondition {
    /// Requested operation
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Domain qualifier, or an empty string when unqualified
    pub fn domain(&self) -> &str {
        self.domain.as_deref().unwrap_or_default()
    }

    /// Domain qualifier, if any
    pub fn domain_qualifier(&self) -> Option<&str> {
        self.domain.as_deref()
    }
}

impl TryFrom<String> for ParsedCondition {
    type Error = IdmError;

    fn try_from(condition: String) -> Result<Self> {
        parse_condition(&condition)
    }
}

impl From<ParsedCondition> for String {
    fn from(condition: ParsedCondition) -> Self {
        condition.to_string()
    }
}

impl fmt::Display for ParsedCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.domain {
            Some(domain) => write!(f, "{} @{}", self.operation.as_str(), domain),
            None => f.write_str(self.operation.as_str()),
        }
    }
}

impl FromStr for ParsedCondition {
    type Err = IdmError;

    fn from_str(s: &str) -> Result<Self> {
        parse_condition(s)
    }
}

/// Parses a raw third-party caveat condition
///
/// # Errors
///
/// - [`IdmError::UnknownCaveat`] with the full condition when the operation
///   is unrecognized or trailing text is not an `@`-introduced domain
/// - [`IdmError::InvalidDomain`] with the domain when it fails validation
pub fn parse_condition(condition: &str) -> Result<ParsedCondition> {
    let unknown = || IdmError::UnknownCaveat(condition.to_string());

    let rest = condition.strip_prefix(IS_AUTHENTICATED_USER).ok_or_else(unknown)?;
    if rest.is_empty() {
        return Ok(ParsedCondition {
            operation: Operation::IsAuthenticatedUser,
            domain: None,
        });
    }

    let domain = rest.strip_prefix(" @").ok_or_else(unknown)?;
    validate_domain(domain)?;

    Ok(ParsedCondition {
        operation: Operation::IsAuthenticatedUser,
        domain: Some(domain.to_string()),
    })
}

/// Checks domain syntax
pub fn validate_domain(domain: &str) -> Result<()> {
    if DOMAIN_PATTERN.is_match(domain) {
        Ok(())
    } else {
        Err(IdmError::InvalidDomain(domain.to_string()))
    }
}
