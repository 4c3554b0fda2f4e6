//! # idmtest
//!
//! In-memory identity and discharge service for testing clients of
//! third-party caveat macaroon authorization.
//!
//! ## Features
//!
//! - **Condition parsing** for `is-authenticated-user [@domain]`
//! - **Identity resolution** from an explicit caller, a session default user,
//!   or the declared caveats of a verified discharge
//! - **Group-membership ACL checks** with flat set-intersection semantics
//! - **HTTP transport** via axum for discharge, groups and ACL endpoints
//!
//! Macaroon signing and verification are left to the caller; this crate
//! produces the caveats a discharge macaroon should carry.
//!
//! ## Example
//!
//! ```rust
//! use idmtest::{IdmServer, Identity};
//!
//! let server = IdmServer::new("http://127.0.0.1:8080");
//! server.add_user("bob", ["beatles"]);
//! server.set_default_user("bob");
//!
//! let discharge = server.discharge("is-authenticated-user", None).unwrap();
//! assert_eq!(discharge.declared()["username"], "bob");
//!
//! assert!(server.allow(&Identity::new("bob"), &["beatles"]).unwrap());
//! ```

pub mod condition;
pub mod config;
pub mod directory;
pub mod error;
pub mod evaluator;
pub mod resolver;
pub mod server;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use condition::{parse_condition, Operation, ParsedCondition};
pub use config::ServerConfig;
pub use directory::UserDirectory;
pub use error::{IdmError, Result};
pub use evaluator::AccessEvaluator;
pub use resolver::{Discharge, IdentityResolver};
pub use server::IdmServer;
pub use session::SessionDefault;
pub use types::{infer_declared, Caveat, DeclaredState, Identity, User};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
