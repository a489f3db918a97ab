//! Global navigation guard.
//!
//! Before any page loads, the guard asks the server whether the current
//! cookie session is authenticated and redirects accordingly:
//!
//! - not authenticated (or the check failed) and not headed to the login
//!   page: go to the login page
//! - authenticated and headed to the login page: go home
//! - authenticated otherwise: continue, filling the `UserSession` if it has
//!   no identity yet
//!
//! The guard is the only writer of the `UserSession`.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::session::{UserSession, UserSessionStore};
use crate::api::{ApiError, RequestContext, Transport};
use crate::cache::KeyBuilder;

/// Endpoint reporting whether the cookie session is signed in
pub const AUTH_STATUS_PATH: &str = "/users/auth/status";

pub const LOGIN_ROUTE: &str = "/login";

pub const HOME_ROUTE: &str = "/";

/// Progress of the auth check for one navigation. Each navigation carries
/// its own state on the returned `GuardOutcome`; the guard keeps none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unchecked,
    Checking,
    Authenticated,
    Unauthenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub state: AuthState,
    pub decision: GuardDecision,
}

#[derive(Debug, Deserialize)]
struct AuthStatusResponse {
    data: Option<UserSession>,
}

enum AuthCheck {
    Authenticated(UserSession),
    Unauthenticated,
    Failed(ApiError),
}

pub struct AuthGuard {
    keys: KeyBuilder,
    transport: Arc<dyn Transport>,
    session: Arc<UserSessionStore>,
}

impl AuthGuard {
    pub fn new(keys: KeyBuilder, transport: Arc<dyn Transport>, session: Arc<UserSessionStore>) -> Self {
        Self {
            keys,
            transport,
            session,
        }
    }

    pub fn session(&self) -> &Arc<UserSessionStore> {
        &self.session
    }

    /// Run the check for a navigation to `to` (a path without query).
    pub async fn on_navigate(&self, to: &str, ctx: &RequestContext) -> GuardOutcome {
        debug!(to = to, state = ?AuthState::Checking, "Checking auth status");

        let outcome = match self.check_status(ctx).await {
            AuthCheck::Authenticated(payload) => self.authenticated(to, payload),
            AuthCheck::Unauthenticated => {
                // The server says signed out: drop the whole record
                if self.session.snapshot() != UserSession::default() {
                    if let Err(e) = self.session.reset() {
                        warn!(error = %e, "Failed to clear user session");
                    }
                }
                Self::unauthenticated(to)
            }
            AuthCheck::Failed(err) => {
                warn!(error = %err, "Auth status check failed, treating as signed out");
                Self::unauthenticated(to)
            }
        };

        debug!(to = to, state = ?outcome.state, decision = ?outcome.decision, "Navigation guarded");
        outcome
    }

    fn authenticated(&self, to: &str, mut payload: UserSession) -> GuardOutcome {
        let decision = if to == LOGIN_ROUTE {
            GuardDecision::Redirect(HOME_ROUTE.to_string())
        } else {
            if !self.session.snapshot().has_identity() {
                payload.is_authenticated = true;
                info!(user_id = ?payload.user_id, "Populating user session");
                if let Err(e) = self.session.replace(payload) {
                    warn!(error = %e, "Failed to persist user session");
                }
            }
            GuardDecision::Proceed
        };

        GuardOutcome {
            state: AuthState::Authenticated,
            decision,
        }
    }

    fn unauthenticated(to: &str) -> GuardOutcome {
        let decision = if to == LOGIN_ROUTE {
            GuardDecision::Proceed
        } else {
            GuardDecision::Redirect(LOGIN_ROUTE.to_string())
        };
        GuardOutcome {
            state: AuthState::Unauthenticated,
            decision,
        }
    }

    async fn check_status(&self, ctx: &RequestContext) -> AuthCheck {
        let url = self.keys.build(AUTH_STATUS_PATH);
        let body = match self.transport.get(url.as_str(), ctx).await {
            Ok(body) => body,
            Err(e) => return AuthCheck::Failed(e),
        };

        let response: AuthStatusResponse = match serde_json::from_str(&body) {
            Ok(response) => response,
            Err(e) => {
                return AuthCheck::Failed(ApiError::InvalidResponse(format!(
                    "Failed to parse auth status: {}",
                    e
                )))
            }
        };

        match response.data {
            Some(data) if data.is_authenticated => AuthCheck::Authenticated(data),
            _ => AuthCheck::Unauthenticated,
        }
    }
}
