//! Identity resolution for discharge requests
//!
//! Two fixed resolution paths:
//!
//! - **Unauthenticated**: no identity is known yet, so the caller is handed
//!   the third-party caveat that routes it to this service.
//! - **Declared**: the identity is read back from the declared caveats of a
//!   verified discharge.
//!
//! Discharging a parsed condition binds the acting user (explicit caller,
//! else the session default) into a declared `username` caveat.

use crate::condition::{parse_condition, ParsedCondition, IS_AUTHENTICATED_USER};
use crate::error::{IdmError, Result};
use crate::session::SessionDefault;
use crate::types::{infer_declared, Caveat, DeclaredState, Identity, USERNAME_KEY};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Successful discharge resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discharge {
    /// Identity the discharge asserts
    pub identity: Identity,

    /// Caveats to add to the discharge macaroon
    pub caveats: Vec<Caveat>,
}

impl Discharge {
    /// Declared pairs carried by the discharge caveats
    pub fn declared(&self) -> DeclaredState {
        infer_declared(&self.caveats)
    }
}

/// Resolves identities for discharge and verification
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    /// Location third-party caveats are addressed to
    location: String,

    /// Default identity used when the caller supplies none
    session: Arc<SessionDefault>,
}

impl IdentityResolver {
    /// Create a resolver for the service at `location`
    pub fn new(location: impl Into<String>, session: Arc<SessionDefault>) -> Self {
        Self {
            location: location.into(),
            session,
        }
    }

    /// Location third-party caveats are addressed to
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Caveats that route an unauthenticated request to this service
    pub fn caveats_for_unauthenticated(&self) -> Vec<Caveat> {
        vec![Caveat::third_party(&self.location, IS_AUTHENTICATED_USER)]
    }

    /// Identity bound by the declared caveats of a verified discharge
    ///
    /// # Errors
    ///
    /// [`IdmError::MissingUsername`] when `username` is absent or empty.
    pub fn resolve_from_declared(&self, declared: &DeclaredState) -> Result<Identity> {
        match declared.get(USERNAME_KEY) {
            Some(username) if !username.is_empty() => Ok(Identity::new(username.as_str())),
            _ => Err(IdmError::MissingUsername(declared.clone())),
        }
    }

    /// Resolve the identity and declared caveats for a parsed condition
    ///
    /// # Errors
    ///
    /// [`IdmError::NoIdentity`] when there is neither a caller identity nor
    /// a session default.
    pub fn resolve_discharge(
        &self,
        condition: &ParsedCondition,
        caller: Option<&str>,
    ) -> Result<Discharge> {
        let username = self.session.acting_user(caller).ok_or(IdmError::NoIdentity)?;
        let identity = Identity::new(username).with_domain(condition.domain());
        let caveats = vec![Caveat::declared(USERNAME_KEY, &identity.bound_name())];

        Ok(Discharge { identity, caveats })
    }

    /// Parse a raw condition and resolve it in one step
    pub fn discharge(&self, condition: &str, caller: Option<&str>) -> Result<Discharge> {
        let parsed = parse_condition(condition)?;
        self.resolve_discharge(&parsed, caller)
    }
}
