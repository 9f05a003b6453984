// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session endpoints: logout, plus token issuance for local development.

use axum::{extract::State, http::StatusCode};
use tracing::info;

use crate::auth::{Auth, AuthError, PresentedToken};
use crate::state::AppState;

/// Revoke the token used for this request.
///
/// The token is rejected from the next request on, even though it has not
/// expired yet.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Session",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Auth(principal): Auth,
    PresentedToken(token): PresentedToken,
) -> Result<StatusCode, AuthError> {
    state.auth.revoke_token(&token).await?;
    info!(user_id = %principal.id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(feature = "dev")]
pub use dev::{dev_token, DevTokenRequest, TokenResponse};

#[cfg(feature = "dev")]
mod dev {
    use axum::{extract::State, Json};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use tracing::warn;
    use utoipa::ToSchema;

    use crate::auth::IdentityError;
    use crate::error::ApiError;
    use crate::state::AppState;

    #[derive(Debug, Deserialize, ToSchema)]
    pub struct DevTokenRequest {
        /// Subject known to the identity resolver
        pub subject: String,
    }

    #[derive(Debug, Serialize, ToSchema)]
    pub struct TokenResponse {
        pub access_token: String,
        pub token_type: String,
        pub expires_at: DateTime<Utc>,
        pub expires_in: u64,
    }

    /// Issue a token for a known subject. Stands in for the login flow.
    pub async fn dev_token(
        State(state): State<AppState>,
        Json(request): Json<DevTokenRequest>,
    ) -> Result<Json<TokenResponse>, ApiError> {
        let subject = request.subject.trim();
        if subject.is_empty() {
            return Err(ApiError::bad_request("subject must not be empty"));
        }

        match state.identity.resolve(subject).await {
            Ok(_) => {}
            Err(IdentityError::NotFound) => {
                return Err(ApiError::not_found(format!("unknown subject: {subject}")))
            }
            Err(IdentityError::Unavailable(msg)) => return Err(ApiError::service_unavailable(msg)),
        }

        let issued = state.auth.issue_token(subject).map_err(|e| {
            warn!(error = %e, "Dev token issuance failed");
            ApiError::service_unavailable("token issuance failed")
        })?;
        let expires_at = issued
            .claims
            .expires_at()
            .ok_or_else(|| ApiError::service_unavailable("token expiry out of range"))?;

        Ok(Json(TokenResponse {
            access_token: issued.token,
            token_type: "Bearer".to_string(),
            expires_at,
            expires_in: state.auth.token_ttl().as_secs(),
        }))
    }
}
