// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! Every authentication-class failure is rendered to the client with the same
//! `unauthenticated` body so that callers cannot probe which check rejected
//! their token. The precise variant is still available through
//! [`AuthError::kind`] for logs.

use axum::{
    http::{header::WWW_AUTHENTICATE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No credential was presented on a route that requires one
    #[error("no credential presented")]
    MissingCredential,
    /// Token or Authorization header is structurally invalid
    #[error("token is malformed")]
    MalformedToken,
    /// Token signature does not match the claims
    #[error("token signature is invalid")]
    SignatureInvalid,
    /// Token is past its expiry instant
    #[error("token has expired")]
    Expired,
    /// Token was explicitly revoked before its natural expiry
    #[error("token has been revoked")]
    Revoked,
    /// Token subject does not resolve to a known principal
    #[error("no principal found for token subject")]
    PrincipalNotFound,
    /// Revocation store could not answer in time
    #[error("revocation store unavailable")]
    StoreUnavailable,
    /// Principal is authenticated but holds none of the required roles
    #[error("principal lacks a required role")]
    InsufficientRole,
    /// Internal error
    #[error("internal authentication error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
    message: &'static str,
}

impl AuthError {
    /// Stable diagnostic code for this error. Intended for logs only.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::MalformedToken => "malformed_token",
            AuthError::SignatureInvalid => "signature_invalid",
            AuthError::Expired => "expired",
            AuthError::Revoked => "revoked",
            AuthError::PrincipalNotFound => "principal_not_found",
            AuthError::StoreUnavailable => "store_unavailable",
            AuthError::InsufficientRole => "insufficient_role",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Whether this error belongs to the authentication class (401).
    pub fn is_authentication_failure(&self) -> bool {
        self.status_code() == StatusCode::UNAUTHORIZED
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredential
            | AuthError::MalformedToken
            | AuthError::SignatureInvalid
            | AuthError::Expired
            | AuthError::Revoked
            | AuthError::PrincipalNotFound
            | AuthError::StoreUnavailable => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientRole => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_body(&self) -> AuthErrorBody {
        match self.status_code() {
            StatusCode::UNAUTHORIZED => AuthErrorBody {
                error: "unauthenticated",
                message: "A valid bearer token is required",
            },
            StatusCode::FORBIDDEN => AuthErrorBody {
                error: "forbidden",
                message: "Insufficient role for this operation",
            },
            _ => AuthErrorBody {
                error: "internal_error",
                message: "Authentication could not be completed",
            },
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.public_body());
        if status == StatusCode::UNAUTHORIZED {
            (status, [(WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(error: AuthError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body_bytes).unwrap())
    }

    #[tokio::test]
    async fn authentication_failures_share_one_body() {
        let (status, expired) = body_json(AuthError::Expired).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        for error in [
            AuthError::MissingCredential,
            AuthError::MalformedToken,
            AuthError::SignatureInvalid,
            AuthError::Revoked,
            AuthError::PrincipalNotFound,
            AuthError::StoreUnavailable,
        ] {
            let (status, body) = body_json(error).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, expired);
        }
        assert_eq!(expired["error"], "unauthenticated");
    }

    #[tokio::test]
    async fn insufficient_role_returns_403() {
        let (status, body) = body_json(AuthError::InsufficientRole).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");
        assert!(!AuthError::InsufficientRole.is_authentication_failure());
    }

    #[test]
    fn unauthorized_response_carries_challenge() {
        let response = AuthError::Revoked.into_response();
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn kind_is_distinct_per_variant() {
        assert_eq!(AuthError::SignatureInvalid.kind(), "signature_invalid");
        assert_eq!(AuthError::MalformedToken.kind(), "malformed_token");
        assert_ne!(AuthError::Expired.kind(), AuthError::Revoked.kind());
    }
}
