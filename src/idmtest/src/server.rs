//! Identity server facade and HTTP transport
//!
//! ## Endpoints
//!
//! - `POST /v1/discharger` - Discharge an `is-authenticated-user` condition
//! - `GET /v1/u/:user/groups` - Groups of a user
//! - `POST /v1/allow` - ACL check for an identity
//! - `GET /v1/caveats` - Caveats routing unauthenticated requests here
//! - `GET /health` - Health check
//!
//! The caller identity of a discharge is taken from the `X-Idm-User` header.
//! Without it the session default user applies.

use crate::config::ServerConfig;
use crate::directory::UserDirectory;
use crate::error::{IdmError, Result};
use crate::evaluator::AccessEvaluator;
use crate::resolver::{Discharge, IdentityResolver};
use crate::session::SessionDefault;
use crate::types::{Caveat, DeclaredState, Identity};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};

/// Header carrying an explicit caller identity
pub const CALLER_HEADER: &str = "x-idm-user";

/// In-memory identity server
///
/// Owns the shared directory and session default, and hands them to the
/// resolver and evaluator it builds.
#[derive(Debug)]
pub struct IdmServer {
    directory: Arc<UserDirectory>,
    session: Arc<SessionDefault>,
    resolver: IdentityResolver,
    evaluator: AccessEvaluator,
}

impl IdmServer {
    /// Create a server whose caveats are addressed to `location`
    pub fn new(location: impl Into<String>) -> Self {
        let directory = Arc::new(UserDirectory::new());
        let session = Arc::new(SessionDefault::new());

        Self {
            resolver: IdentityResolver::new(location, session.clone()),
            evaluator: AccessEvaluator::new(directory.clone()),
            directory,
            session,
        }
    }

    /// Create a server with the users and default user from `config`
    pub fn from_config(config: &ServerConfig) -> Self {
        let server = Self::new(config.location.clone());
        for user in &config.users {
            server.add_user(&user.name, user.groups.iter().cloned());
        }
        if let Some(name) = &config.default_user {
            server.set_default_user(name.clone());
        }
        server
    }

    /// Register a user, merging groups into any it already has
    pub fn add_user<I, S>(&self, name: &str, groups: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directory.register(name, groups);
    }

    /// Set the user assumed when a request carries no identity
    ///
    /// Replaces any default set earlier; an empty name clears it.
    pub fn set_default_user(&self, name: impl Into<String>) {
        self.session.set(name);
    }

    /// Sorted groups of `name`; empty for unknown users
    pub fn user_groups(&self, name: &str) -> Vec<String> {
        self.directory.groups(name).into_iter().collect()
    }

    /// Shared user directory
    pub fn directory(&self) -> &Arc<UserDirectory> {
        &self.directory
    }

    /// Shared session default
    pub fn session(&self) -> &Arc<SessionDefault> {
        &self.session
    }

    /// Identity resolver bound to this server's session
    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// Access evaluator bound to this server's directory
    pub fn evaluator(&self) -> &AccessEvaluator {
        &self.evaluator
    }

    /// Discharge a raw condition for `caller` (or the default user)
    pub fn discharge(&self, condition: &str, caller: Option<&str>) -> Result<Discharge> {
        self.resolver.discharge(condition, caller)
    }

    /// Check `identity` against `acl`
    pub fn allow<S: AsRef<str>>(&self, identity: &Identity, acl: &[S]) -> Result<bool> {
        self.evaluator.allow(identity, acl)
    }

    /// HTTP router serving this server
    pub fn router(self: Arc<Self>) -> Router {
        create_router(AppState {
            server: self,
            start_time: std::time::Instant::now(),
        })
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    server: Arc<IdmServer>,
    start_time: std::time::Instant,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// Application error type
#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Refused(IdmError),
    Internal(IdmError),
}

impl From<IdmError> for AppError {
    fn from(err: IdmError) -> Self {
        if err.is_refusal() {
            AppError::Refused(err)
        } else {
            AppError::Internal(err)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AppError::Refused(IdmError::NoIdentity) => (
                StatusCode::UNAUTHORIZED,
                "refused_discharge",
                format!("cannot discharge: {}", IdmError::NoIdentity),
            ),
            AppError::Refused(err) => (
                StatusCode::FORBIDDEN,
                "refused_discharge",
                format!("cannot discharge: {}", err),
            ),
            AppError::Internal(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                err.to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            code: code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Discharge request body
#[derive(Debug, Serialize, Deserialize)]
pub struct DischargeRequest {
    pub condition: String,
}

/// Discharge response body
#[derive(Debug, Serialize, Deserialize)]
pub struct DischargeResponse {
    pub identity: Identity,
    pub caveats: Vec<Caveat>,
    pub declared: DeclaredState,
}

/// ACL check request body
#[derive(Debug, Serialize, Deserialize)]
pub struct AllowRequest {
    pub username: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub acl: Vec<String>,
}

/// ACL check response body
#[derive(Debug, Serialize, Deserialize)]
pub struct AllowResponse {
    pub allowed: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
}

/// POST /v1/discharger
async fn discharge(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<DischargeRequest>,
) -> std::result::Result<Json<DischargeResponse>, AppError> {
    let caller = caller_identity(&headers)?;

    info!("Discharge request: condition={:?}, caller={:?}", req.condition, caller);

    let discharge = state
        .server
        .discharge(&req.condition, caller.as_deref())
        .map_err(|err| {
            warn!("Discharge refused: {}", err);
            err
        })?;

    info!("Discharged for {}", discharge.identity);

    Ok(Json(DischargeResponse {
        declared: discharge.declared(),
        identity: discharge.identity,
        caveats: discharge.caveats,
    }))
}

/// Explicit caller named by the `X-Idm-User` header
///
/// A header that is present but not UTF-8 is rejected rather than ignored,
/// so the session default never stands in for a caller that was named.
fn caller_identity(headers: &HeaderMap) -> std::result::Result<Option<String>, AppError> {
    let Some(value) = headers.get(CALLER_HEADER) else {
        return Ok(None);
    };

    let caller = String::from_utf8(value.as_bytes().to_vec()).map_err(|_| {
        warn!("Rejected undecodable {} header", CALLER_HEADER);
        AppError::BadRequest(format!("{} header is not valid UTF-8", CALLER_HEADER))
    })?;

    let caller = caller.trim();
    Ok((!caller.is_empty()).then(|| caller.to_string()))
}

/// GET /v1/u/:user/groups
async fn user_groups(State(state): State<AppState>, Path(user): Path<String>) -> Json<Vec<String>> {
    Json(state.server.user_groups(&user))
}

/// POST /v1/allow
async fn allow(
    State(state): State<AppState>,
    Json(req): Json<AllowRequest>,
) -> std::result::Result<Json<AllowResponse>, AppError> {
    let identity = Identity::new(req.username).with_domain(req.domain);
    let allowed = state.server.allow(&identity, &req.acl)?;

    info!(
        "ACL check: identity={}, acl={:?}, decision={}",
        identity,
        req.acl,
        if allowed { "ALLOW" } else { "DENY" }
    );

    Ok(Json(AllowResponse { allowed }))
}

/// GET /v1/caveats
async fn unauthenticated_caveats(State(state): State<AppState>) -> Json<Vec<Caveat>> {
    Json(state.server.resolver().caveats_for_unauthenticated())
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: crate::VERSION.to_string(),
    })
}

fn create_router(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http()
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/v1/discharger", post(discharge))
        .route("/v1/u/:user/groups", get(user_groups))
        .route("/v1/allow", post(allow))
        .route("/v1/caveats", get(unauthenticated_caveats))
        .route("/health", get(health_check))
        .layer(ServiceBuilder::new().layer(trace))
        .with_state(state)
}
