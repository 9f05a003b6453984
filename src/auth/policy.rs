// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-route authorization policy and the gate that enforces it.
//!
//! The policy is a static table built once at startup:
//!
//! ```rust,ignore
//! let policy = AuthorizationPolicy::builder()
//!     .public(Method::GET, "/health")
//!     .authenticated(Method::GET, "/v1/users/me")
//!     .require_roles(Method::GET, "/v1/admin/revocations", [Role::Admin])
//!     .build();
//! ```
//!
//! Routes missing from the table require an authenticated principal.

use std::collections::{BTreeSet, HashMap};

use axum::http::Method;
use tracing::warn;

use super::{AuthError, RequestContext, Role};

/// Requirement used for routes that were never declared.
static DEFAULT_ACCESS: Access = Access::Authenticated;

/// Route identifier: HTTP method plus the router's path template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteId {
    method: Method,
    path: String,
}

impl RouteId {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// What a route requires of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Anyone, including anonymous callers
    Public,
    /// Any authenticated principal
    Authenticated,
    /// An authenticated principal holding at least one of these roles
    Roles(BTreeSet<Role>),
}

/// Read-only route → requirement table.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationPolicy {
    routes: HashMap<RouteId, Access>,
}

impl AuthorizationPolicy {
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    /// Requirement for the route, falling back to [`Access::Authenticated`].
    pub fn requirement(&self, method: &Method, path: &str) -> &Access {
        self.routes
            .get(&RouteId::new(method.clone(), path))
            .unwrap_or(&DEFAULT_ACCESS)
    }

    /// Number of declared routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Builder for [`AuthorizationPolicy`].
#[derive(Debug, Default)]
pub struct PolicyBuilder {
    routes: HashMap<RouteId, Access>,
}

impl PolicyBuilder {
    /// Open the route to anonymous callers.
    pub fn public(self, method: Method, path: &str) -> Self {
        self.declare(RouteId::new(method, path), Access::Public)
    }

    /// Require any authenticated principal.
    pub fn authenticated(self, method: Method, path: &str) -> Self {
        self.declare(RouteId::new(method, path), Access::Authenticated)
    }

    /// Require at least one of `roles`. An empty set means any principal.
    pub fn require_roles(
        self,
        method: Method,
        path: &str,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        let roles: BTreeSet<Role> = roles.into_iter().collect();
        let access = if roles.is_empty() {
            Access::Authenticated
        } else {
            Access::Roles(roles)
        };
        self.declare(RouteId::new(method, path), access)
    }

    fn declare(mut self, route: RouteId, access: Access) -> Self {
        if let Some(previous) = self.routes.insert(route.clone(), access) {
            warn!(%route, ?previous, "route requirement declared twice; last declaration wins");
        }
        self
    }

    pub fn build(self) -> AuthorizationPolicy {
        AuthorizationPolicy {
            routes: self.routes,
        }
    }
}

/// Role check run after authentication.
pub struct AuthorizationGate;

impl AuthorizationGate {
    /// Allow (`Ok`) or deny the request.
    ///
    /// Anonymous callers on a protected route get `MissingCredential` (401);
    /// authenticated callers without a matching role get `InsufficientRole`
    /// (403).
    pub fn check(context: &RequestContext, access: &Access) -> Result<(), AuthError> {
        match (access, context.principal()) {
            (Access::Public, _) => Ok(()),
            (_, None) => Err(AuthError::MissingCredential),
            (Access::Authenticated, Some(_)) => Ok(()),
            (Access::Roles(required), Some(principal)) => {
                if principal.has_any_role(required) {
                    Ok(())
                } else {
                    Err(AuthError::InsufficientRole)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Principal;

    fn admin_only() -> Access {
        Access::Roles([Role::Admin].into_iter().collect())
    }

    fn user() -> RequestContext {
        RequestContext::Authenticated(Principal::new("alice", [Role::User]))
    }

    #[test]
    fn user_on_admin_route_is_forbidden() {
        let result = AuthorizationGate::check(&user(), &admin_only());
        assert_eq!(result, Err(AuthError::InsufficientRole));
        assert!(!result.unwrap_err().is_authentication_failure());
    }

    #[test]
    fn anonymous_on_admin_route_is_unauthenticated() {
        let result = AuthorizationGate::check(&RequestContext::Anonymous, &admin_only());
        assert_eq!(result, Err(AuthError::MissingCredential));
        assert!(result.unwrap_err().is_authentication_failure());
    }

    #[test]
    fn matching_role_is_allowed() {
        let admin = RequestContext::Authenticated(Principal::new("root", [Role::Admin]));
        assert_eq!(AuthorizationGate::check(&admin, &admin_only()), Ok(()));
    }

    #[test]
    fn public_routes_allow_anonymous() {
        assert_eq!(
            AuthorizationGate::check(&RequestContext::Anonymous, &Access::Public),
            Ok(())
        );
        assert_eq!(
            AuthorizationGate::check(&RequestContext::Anonymous, &Access::Authenticated),
            Err(AuthError::MissingCredential)
        );
        assert_eq!(AuthorizationGate::check(&user(), &Access::Authenticated), Ok(()));
    }

    #[test]
    fn undeclared_routes_require_authentication() {
        let policy = AuthorizationPolicy::builder()
            .public(Method::GET, "/health")
            .build();

        assert_eq!(policy.requirement(&Method::GET, "/health"), &Access::Public);
        assert_eq!(
            policy.requirement(&Method::POST, "/health"),
            &Access::Authenticated
        );
        assert_eq!(
            policy.requirement(&Method::GET, "/v1/unknown"),
            &Access::Authenticated
        );
    }

    #[test]
    fn empty_role_set_means_authenticated() {
        let policy = AuthorizationPolicy::builder()
            .require_roles(Method::GET, "/v1/feed", Vec::<Role>::new())
            .build();
        assert_eq!(
            policy.requirement(&Method::GET, "/v1/feed"),
            &Access::Authenticated
        );
    }

    #[test]
    fn later_declaration_wins() {
        let policy = AuthorizationPolicy::builder()
            .public(Method::GET, "/v1/posts")
            .require_roles(Method::GET, "/v1/posts", [Role::User])
            .build();
        assert_eq!(policy.len(), 1);
        assert_eq!(
            policy.requirement(&Method::GET, "/v1/posts"),
            &Access::Roles([Role::User].into_iter().collect())
        );
    }
}
