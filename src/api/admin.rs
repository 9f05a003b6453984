// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin endpoints for operators.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::state::AppState;

/// Response for GET /v1/admin/revocations
#[derive(Debug, Serialize, ToSchema)]
pub struct RevocationStatsResponse {
    /// Revoked tokens that have not expired yet
    pub active_entries: usize,
    /// Configured token lifetime, which bounds how long an entry lives
    pub token_ttl_secs: u64,
}

/// Revocation store statistics.
#[utoipa::path(
    get,
    path = "/v1/admin/revocations",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Revocation statistics", body = RevocationStatsResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Forbidden - admin role required"),
        (status = 503, description = "Revocation store unavailable")
    )
)]
pub async fn revocation_stats(
    State(state): State<AppState>,
    Auth(admin): Auth,
) -> Result<Json<RevocationStatsResponse>, ApiError> {
    let active_entries = state
        .auth
        .revocations()
        .active_entries(Utc::now())
        .await
        .map_err(|e| {
            warn!(admin_id = %admin.id, error = %e, "Revocation stats unavailable");
            ApiError::service_unavailable("revocation store unavailable")
        })?;

    Ok(Json(RevocationStatsResponse {
        active_entries,
        token_ttl_secs: state.auth.token_ttl().as_secs(),
    }))
}
