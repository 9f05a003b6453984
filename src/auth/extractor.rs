// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors over the request-scoped authentication context.
//!
//! These never verify tokens themselves; they read what the
//! [`authenticate`](super::middleware::authenticate) stage attached to the
//! request.
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal is the caller's Principal
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, BearerToken, Principal, RequestContext};

/// Extractor for authenticated principals.
///
/// Rejects with `MissingCredential` when the request is anonymous.
pub struct Auth(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<RequestContext>() {
            Some(RequestContext::Authenticated(principal)) => Ok(Auth(principal.clone())),
            _ => Err(AuthError::MissingCredential),
        }
    }
}

/// Optional authentication extractor.
///
/// Yields `None` for anonymous requests instead of rejecting.
pub struct OptionalAuth(pub Option<Principal>);

impl<S: Send + Sync> FromRequestParts<S> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<RequestContext>()
            .and_then(RequestContext::principal)
            .cloned();
        Ok(OptionalAuth(principal))
    }
}

/// The verified token the caller authenticated with.
pub struct PresentedToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for PresentedToken {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BearerToken>()
            .map(|BearerToken(token)| PresentedToken(token.clone()))
            .ok_or(AuthError::MissingCredential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use axum::http::Request;

    fn empty_parts() -> Parts {
        Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn auth_requires_context() {
        let mut parts = empty_parts();
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingCredential)));
    }

    #[tokio::test]
    async fn auth_rejects_anonymous_context() {
        let mut parts = empty_parts();
        parts.extensions.insert(RequestContext::Anonymous);
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingCredential)));
    }

    #[tokio::test]
    async fn auth_reads_principal_from_extensions() {
        let mut parts = empty_parts();
        let principal = Principal::new("user_from_middleware", [Role::Admin]);
        parts
            .extensions
            .insert(RequestContext::Authenticated(principal.clone()));

        let Auth(extracted) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted, principal);
    }

    #[tokio::test]
    async fn optional_auth_returns_none_without_user() {
        let mut parts = empty_parts();
        let OptionalAuth(principal) = OptionalAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(principal.is_none());
    }

    #[tokio::test]
    async fn presented_token_requires_verified_token() {
        let mut parts = empty_parts();
        assert!(PresentedToken::from_request_parts(&mut parts, &())
            .await
            .is_err());

        parts.extensions.insert(BearerToken("a.b.c".to_string()));
        let PresentedToken(token) = PresentedToken::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(token, "a.b.c");
    }
}
