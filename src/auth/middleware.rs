// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization middleware stages for Axum.
//!
//! The stages run in a fixed order and each one can end the request early:
//!
//! 1. [`authenticate`]: extract the bearer credential, verify it, resolve the
//!    principal and attach a [`RequestContext`] to the request.
//! 2. [`authorize`]: look up the matched route in the [`AuthorizationPolicy`]
//!    and allow or deny.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/v1/users/me", get(users::get_current_user))
//!     .route_layer(
//!         ServiceBuilder::new()
//!             .layer(middleware::from_fn_with_state(state.clone(), authenticate))
//!             .layer(middleware::from_fn_with_state(state.clone(), authorize)),
//!     )
//!     .with_state(state);
//! ```
//!
//! [`AuthorizationPolicy`]: super::AuthorizationPolicy

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use super::identity::IdentityError;
use super::{AuthError, AuthorizationGate, BearerToken, Principal, RequestContext};
use crate::state::AppState;

/// Authentication stage.
///
/// No `Authorization` header yields an anonymous request. A header that is
/// present but unusable, or a token that fails verification, ends the
/// request with 401; it is never downgraded to anonymous.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers()) {
        Ok(token) => token,
        Err(e) => return reject(e),
    };

    let context = match token {
        None => RequestContext::Anonymous,
        Some(token) => match resolve_principal(&state, &token).await {
            Ok(principal) => {
                request.extensions_mut().insert(BearerToken(token));
                RequestContext::Authenticated(principal)
            }
            Err(e) => return reject(e),
        },
    };

    request.extensions_mut().insert(context);
    next.run(request).await
}

/// Authorization stage. Must run after [`authenticate`].
///
/// Requests that did not match a route pass through untouched so the router
/// can answer 404/405.
pub async fn authorize(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(route) = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
    else {
        return next.run(request).await;
    };

    // HEAD is served by GET handlers, so it shares their requirement.
    let method = if request.method() == Method::HEAD {
        Method::GET
    } else {
        request.method().clone()
    };
    let access = state.policy.requirement(&method, &route);

    let decision = match request.extensions().get::<RequestContext>() {
        Some(context) => AuthorizationGate::check(context, access),
        None => AuthorizationGate::check(&RequestContext::Anonymous, access),
    };

    match decision {
        Ok(()) => next.run(request).await,
        Err(e) => {
            debug!(%method, %route, reason = e.kind(), "request denied");
            e.into_response()
        }
    }
}

/// Extract the bearer token from `Authorization`.
///
/// Returns `Ok(None)` when the header is absent. The scheme is matched
/// case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| AuthError::MalformedToken)?;
    let (scheme, token) = value.split_once(' ').ok_or(AuthError::MalformedToken)?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::MalformedToken);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MalformedToken);
    }
    Ok(Some(token.to_string()))
}

/// Verify `token` and resolve its subject into a fresh principal.
async fn resolve_principal(state: &AppState, token: &str) -> Result<Principal, AuthError> {
    let claims = state.auth.verify(token).await?;

    state
        .identity
        .resolve(&claims.sub)
        .await
        .map_err(|e| match e {
            IdentityError::NotFound => AuthError::PrincipalNotFound,
            IdentityError::Unavailable(msg) => {
                error!(error = %msg, "Identity lookup failed; rejecting request");
                AuthError::StoreUnavailable
            }
        })
}

fn reject(error: AuthError) -> Response {
    debug!(reason = error.kind(), "request rejected");
    error.into_response()
}
