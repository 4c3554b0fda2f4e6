//! Error types for the identity service

use crate::types::DeclaredState;
use thiserror::Error;

/// Identity service errors
///
/// Every variant is terminal for the request that produced it. None of them
/// invalidates the directory or session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdmError {
    /// Condition does not match the recognized caveat grammar
    #[error("unknown third party caveat {0:?}")]
    UnknownCaveat(String),

    /// Domain qualifier is syntactically invalid
    #[error("invalid domain {0:?}")]
    InvalidDomain(String),

    /// Declared state carries no usable username
    #[error("no declared user name in {0:?}")]
    MissingUsername(DeclaredState),

    /// Discharge requested with neither a caller identity nor a default user
    #[error("no identity available for discharge")]
    NoIdentity,

    /// Identity lookup failed in a backing service
    #[error("identity resolution failed: {0}")]
    ResolutionFailed(String),

    /// Server configuration could not be loaded
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl IdmError {
    /// Whether this error is a discharge refusal caused by the caller's input,
    /// as opposed to a failure of the service itself.
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            Self::UnknownCaveat(_) | Self::InvalidDomain(_) | Self::MissingUsername(_) | Self::NoIdentity
        )
    }
}

/// Result type for identity service operations
pub type Result<T> = std::result::Result<T, IdmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refusal_messages() {
        let err = IdmError::UnknownCaveat("is-authenticated-user +test-domain".to_string());
        assert_eq!(
            err.to_string(),
            r#"unknown third party caveat "is-authenticated-user +test-domain""#
        );

        let err = IdmError::InvalidDomain("-test-domain".to_string());
        assert_eq!(err.to_string(), r#"invalid domain "-test-domain""#);
    }

    #[test]
    fn test_refusal_classification() {
        assert!(IdmError::NoIdentity.is_refusal());
        assert!(IdmError::InvalidDomain("-x".to_string()).is_refusal());
        assert!(IdmError::MissingUsername(DeclaredState::new()).is_refusal());
        assert!(!IdmError::ResolutionFailed("backend down".to_string()).is_refusal());
        assert!(!IdmError::InvalidConfig("bad port".to_string()).is_refusal());
    }
}
