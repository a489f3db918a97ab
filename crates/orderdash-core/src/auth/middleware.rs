//! Per-route authorization checks.
//!
//! These run after the auth guard has let a navigation through and only
//! read the `UserSession` snapshot.

use super::session::UserSession;
use crate::navigation::Route;

/// Route parameter holding the id of the user a page belongs to.
pub const USER_ID_PARAM: &str = "userId";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMiddleware {
    /// Only admins may enter.
    CheckAdmin,
    /// Admins, or the user whose id is in the route.
    IsUser,
}

impl RouteMiddleware {
    /// Returns true when navigation may continue.
    pub fn allows(&self, session: &UserSession, route: &Route) -> bool {
        match self {
            RouteMiddleware::CheckAdmin => check_admin(session),
            RouteMiddleware::IsUser => is_user(session, route),
        }
    }
}

pub fn check_admin(session: &UserSession) -> bool {
    session.is_admin()
}

pub fn is_user(session: &UserSession, route: &Route) -> bool {
    if session.is_admin() {
        return true;
    }
    match (session.user_id.as_deref(), route.param(USER_ID_PARAM)) {
        (Some(own), Some(target)) => own == target,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::navigation::Router;

    fn session(role: Role, user_id: &str) -> UserSession {
        UserSession {
            user_id: Some(user_id.to_string()),
            role: Some(role),
            is_authenticated: true,
            ..UserSession::default()
        }
    }

    fn route(path: &str) -> Route {
        Router::dashboard().resolve(path).unwrap().0
    }

    #[test]
    fn test_check_admin() {
        assert!(check_admin(&session(Role::Admin, "1")));
        assert!(!check_admin(&session(Role::User, "1")));
        assert!(!check_admin(&UserSession::default()));
    }

    #[test]
    fn test_is_user_owner_only() {
        let user = session(Role::User, "42");
        assert!(is_user(&user, &route("/users/42")));
        assert!(!is_user(&user, &route("/users/43")));
    }

    #[test]
    fn test_is_user_admin_sees_everyone() {
        let admin = session(Role::Admin, "1");
        assert!(is_user(&admin, &route("/users/43")));
    }

    #[test]
    fn test_is_user_without_identity_is_denied() {
        assert!(!is_user(&UserSession::default(), &route("/users/42")));
        // A route without the parameter never matches a plain user
        assert!(!is_user(&session(Role::User, "42"), &route("/orders")));
    }

    #[test]
    fn test_allows_dispatch() {
        let user = session(Role::User, "42");
        assert!(!RouteMiddleware::CheckAdmin.allows(&user, &route("/users")));
        assert!(RouteMiddleware::IsUser.allows(&user, &route("/users/42")));
    }
}
