//! Client-side navigation: route matching plus the guards that gate it.
//!
//! A navigation first passes the global `AuthGuard`, then the middleware
//! of the matched route. Redirects from the guard cancel the original
//! navigation.

use std::collections::HashMap;

use tracing::debug;

use crate::api::RequestContext;
use crate::auth::{AuthGuard, GuardDecision, RouteMiddleware};

/// A resolved destination: the concrete path plus the captured parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub pattern: &'static str,
    pub params: HashMap<String, String>,
}

impl Route {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct RouteDef {
    pub pattern: &'static str,
    pub middleware: Vec<RouteMiddleware>,
}

impl RouteDef {
    pub fn new(pattern: &'static str) -> Self {
        Self {
            pattern,
            middleware: Vec::new(),
        }
    }

    pub fn with(mut self, middleware: RouteMiddleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Match a query-free path, capturing `:name` segments.
    fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let pattern: Vec<&str> = segments(self.pattern).collect();
        let actual: Vec<&str> = segments(path).collect();
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (expected, got) in pattern.iter().zip(actual.iter()) {
            match expected.strip_prefix(':') {
                Some(name) => {
                    params.insert(name.to_string(), got.to_string());
                }
                None if expected == got => {}
                None => return None,
            }
        }
        Some(params)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Strip query string and fragment.
pub fn route_path(target: &str) -> &str {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    let path = &target[..end];
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<RouteDef>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, def: RouteDef) -> Self {
        self.routes.push(def);
        self
    }

    /// Routes of the order/customer dashboard.
    pub fn dashboard() -> Self {
        Self::new()
            .route(RouteDef::new("/"))
            .route(RouteDef::new("/login"))
            .route(RouteDef::new("/orders"))
            .route(RouteDef::new("/orders/:orderId"))
            .route(RouteDef::new("/customers"))
            .route(RouteDef::new("/customers/:customerId"))
            .route(RouteDef::new("/users").with(RouteMiddleware::CheckAdmin))
            .route(RouteDef::new("/users/:userId").with(RouteMiddleware::IsUser))
    }

    /// First route matching `target`, in registration order.
    pub fn resolve(&self, target: &str) -> Option<(Route, &[RouteMiddleware])> {
        let path = route_path(target);
        self.routes.iter().find_map(|def| {
            def.matches(path).map(|params| {
                let route = Route {
                    path: path.to_string(),
                    pattern: def.pattern,
                    params,
                };
                (route, def.middleware.as_slice())
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationResult {
    Proceed(Route),
    Redirect(String),
    /// A route middleware refused the navigation.
    Abort,
    NotFound(String),
}

pub struct Navigator {
    guard: AuthGuard,
    router: Router,
}

impl Navigator {
    pub fn new(guard: AuthGuard, router: Router) -> Self {
        Self { guard, router }
    }

    pub fn guard(&self) -> &AuthGuard {
        &self.guard
    }

    pub async fn navigate(&self, target: &str, ctx: &RequestContext) -> NavigationResult {
        let path = route_path(target);

        let outcome = self.guard.on_navigate(path, ctx).await;
        if let GuardDecision::Redirect(to) = outcome.decision {
            return NavigationResult::Redirect(to);
        }

        let Some((route, middleware)) = self.router.resolve(path) else {
            return NavigationResult::NotFound(path.to_string());
        };

        let session = self.guard.session().snapshot();
        if let Some(denied) = middleware.iter().find(|m| !m.allows(&session, &route)) {
            debug!(path = path, middleware = ?denied, "Navigation aborted by route middleware");
            return NavigationResult::Abort;
        }

        NavigationResult::Proceed(route)
    }
}
