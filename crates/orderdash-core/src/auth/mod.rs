//! Authentication module for the cookie session and route access.
//!
//! This module provides:
//! - `UserSession`/`UserSessionStore`: the signed-in user, persisted to disk
//! - `AuthGuard`: the per-navigation server auth check and redirects
//! - `RouteMiddleware`: admin-only and owner-only route checks
//!
//! The session record survives restarts but is re-validated against the
//! server on every navigation.

pub mod guard;
pub mod middleware;
pub mod session;

pub use guard::{AuthGuard, AuthState, GuardDecision, GuardOutcome, AUTH_STATUS_PATH, HOME_ROUTE, LOGIN_ROUTE};
pub use middleware::{check_admin, is_user, RouteMiddleware};
pub use session::{UserSession, UserSessionStore};
