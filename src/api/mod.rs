// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::Method,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{
        middleware::{authenticate, authorize},
        AuthorizationPolicy, Role,
    },
    state::AppState,
};

pub mod admin;
pub mod health;
pub mod session;
pub mod users;

pub const HEALTH_PATH: &str = "/health";
pub const LIVENESS_PATH: &str = "/health/live";
pub const CURRENT_USER_PATH: &str = "/v1/users/me";
pub const LOGOUT_PATH: &str = "/v1/auth/logout";
pub const REVOCATIONS_PATH: &str = "/v1/admin/revocations";
#[cfg(feature = "dev")]
pub const DEV_TOKEN_PATH: &str = "/v1/auth/dev-token";

/// Access requirements for every route served by [`router`].
pub fn policy() -> AuthorizationPolicy {
    let builder = AuthorizationPolicy::builder()
        .public(Method::GET, HEALTH_PATH)
        .public(Method::GET, LIVENESS_PATH)
        .authenticated(Method::GET, CURRENT_USER_PATH)
        .authenticated(Method::POST, LOGOUT_PATH)
        .require_roles(Method::GET, REVOCATIONS_PATH, [Role::Admin]);

    #[cfg(feature = "dev")]
    let builder = builder.public(Method::POST, DEV_TOKEN_PATH);

    builder.build()
}

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route(HEALTH_PATH, get(health::health))
        .route(LIVENESS_PATH, get(health::liveness))
        .route(CURRENT_USER_PATH, get(users::get_current_user))
        .route(LOGOUT_PATH, post(session::logout))
        .route(REVOCATIONS_PATH, get(admin::revocation_stats));

    #[cfg(feature = "dev")]
    let routes = routes.route(DEV_TOKEN_PATH, post(session::dev_token));

    // Authentication runs before authorization; both see the matched route.
    let routes = routes
        .route_layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn_with_state(state.clone(), authenticate))
                .layer(middleware::from_fn_with_state(state.clone(), authorize)),
        )
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        users::get_current_user,
        session::logout,
        admin::revocation_stats
    ),
    components(
        schemas(
            Role,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
            users::UserMeResponse,
            admin::RevocationStatsResponse
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Users", description = "Current principal"),
        (name = "Session", description = "Token lifecycle"),
        (name = "Admin", description = "Operator endpoints")
    )
)]
struct ApiDoc;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::auth::{
        AuthService, InMemoryRevocationStore, Role, SigningKey, StaticIdentityResolver, TokenCodec,
    };
    use crate::state::AppState;

    /// State with `alice` (USER) and `root` (ADMIN) known to the resolver.
    pub fn test_state() -> AppState {
        let key = SigningKey::from_bytes(&[42u8; 32]).unwrap();
        let codec = TokenCodec::new(key, Duration::from_secs(3600));
        let auth = AuthService::new(
            codec,
            Arc::new(InMemoryRevocationStore::new()),
            Duration::from_millis(250),
        );
        let identity = StaticIdentityResolver::new()
            .with_principal("alice", [Role::User])
            .with_principal("root", [Role::Admin]);
        AppState::new(auth, Arc::new(identity), super::policy())
    }

    pub fn bearer(state: &AppState, subject: &str) -> String {
        format!("Bearer {}", state.auth.issue_token(subject).unwrap().token)
    }
}
