// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end checks of the authentication pipeline through the router.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use civic_auth::{
    api::{policy, router, CURRENT_USER_PATH, HEALTH_PATH, LOGOUT_PATH, REVOCATIONS_PATH},
    auth::{AuthService, InMemoryRevocationStore, Role, SigningKey, StaticIdentityResolver, TokenCodec},
    state::AppState,
};
use serde_json::Value;
use tower::ServiceExt;

const UNAUTHENTICATED_BODY: &str =
    r#"{"error":"unauthenticated","message":"A valid bearer token is required"}"#;

fn state() -> AppState {
    let key = SigningKey::from_base64("MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=").unwrap();
    let auth = AuthService::new(
        TokenCodec::new(key, Duration::from_secs(3600)),
        Arc::new(InMemoryRevocationStore::new()),
        Duration::from_millis(250),
    );
    let identity = StaticIdentityResolver::new()
        .with_principal("alice@example.com", [Role::User])
        .with_principal("ops@example.com", [Role::Admin]);
    AppState::new(auth, Arc::new(identity), policy())
}

struct Reply {
    status: StatusCode,
    challenge: Option<String>,
    body: String,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

async fn call(app: &Router, method: Method, uri: &str, authorization: Option<&str>) -> Reply {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        request = request.header(header::AUTHORIZATION, value);
    }
    let response = app
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let challenge = response
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    Reply {
        status,
        challenge,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

fn bearer(state: &AppState, subject: &str) -> String {
    format!("Bearer {}", state.auth.issue_token(subject).unwrap().token)
}

fn assert_unauthenticated(reply: &Reply) {
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.challenge.as_deref(), Some("Bearer"));
    assert_eq!(reply.body, UNAUTHENTICATED_BODY);
}

#[tokio::test]
async fn health_is_public() {
    let app = router(state());
    let reply = call(&app, Method::GET, HEALTH_PATH, None).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["checks"]["revoked_tokens"], 0);
}

#[tokio::test]
async fn anonymous_request_to_admin_route_is_unauthenticated() {
    let app = router(state());
    let reply = call(&app, Method::GET, REVOCATIONS_PATH, None).await;
    assert_unauthenticated(&reply);
}

#[tokio::test]
async fn user_on_admin_route_is_forbidden() {
    let state = state();
    let token = bearer(&state, "alice@example.com");
    let app = router(state);

    let reply = call(&app, Method::GET, REVOCATIONS_PATH, Some(&token)).await;

    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.challenge, None);
    assert_eq!(reply.json()["error"], "forbidden");
}

#[tokio::test]
async fn admin_reaches_admin_route() {
    let state = state();
    let token = bearer(&state, "ops@example.com");
    let app = router(state);

    let reply = call(&app, Method::GET, REVOCATIONS_PATH, Some(&token)).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["token_ttl_secs"], 3600);
}

#[tokio::test]
async fn authenticated_user_sees_own_principal() {
    let state = state();
    let token = bearer(&state, "alice@example.com");
    let app = router(state);

    let reply = call(&app, Method::GET, CURRENT_USER_PATH, Some(&token)).await;

    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["user_id"], "alice@example.com");
    assert_eq!(body["roles"], serde_json::json!(["USER"]));
}

#[tokio::test]
async fn every_credential_failure_looks_the_same() {
    let state = state();
    let valid = state.auth.issue_token("alice@example.com").unwrap().token;
    let expired = state
        .auth
        .issue_token_at("alice@example.com", Utc::now() - chrono::Duration::hours(2))
        .unwrap()
        .token;
    let stranger = bearer(&state, "mallory@example.com");

    let mut tampered = valid.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let app = router(state);
    let cases = [
        "Basic YWxpY2U6c2VjcmV0".to_string(),
        "Bearer".to_string(),
        "Bearer not.a.token".to_string(),
        format!("Bearer {tampered}"),
        format!("Bearer {expired}"),
        stranger,
    ];

    for authorization in &cases {
        let reply = call(&app, Method::GET, CURRENT_USER_PATH, Some(authorization)).await;
        assert_unauthenticated(&reply);
    }
}

#[tokio::test]
async fn logout_revokes_token_for_later_requests() {
    let state = state();
    let token = bearer(&state, "alice@example.com");
    let app = router(state);

    let reply = call(&app, Method::POST, LOGOUT_PATH, Some(&token)).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);

    let reply = call(&app, Method::GET, CURRENT_USER_PATH, Some(&token)).await;
    assert_unauthenticated(&reply);

    let reply = call(&app, Method::GET, HEALTH_PATH, None).await;
    assert_eq!(reply.json()["checks"]["revoked_tokens"], 1);
}

#[tokio::test]
async fn revoking_one_token_leaves_others_valid() {
    let state = state();
    let first = bearer(&state, "alice@example.com");
    let second = bearer(&state, "alice@example.com");
    let app = router(state);

    call(&app, Method::POST, LOGOUT_PATH, Some(&first)).await;

    let reply = call(&app, Method::GET, CURRENT_USER_PATH, Some(&second)).await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn role_changes_apply_without_reissuing() {
    let state = state();
    let token = state.auth.issue_token("alice@example.com").unwrap().token;
    let promoted = AppState::new(
        state.auth.clone(),
        Arc::new(StaticIdentityResolver::new().with_principal("alice@example.com", [Role::Admin])),
        policy(),
    );
    let app = router(promoted);

    let reply = call(
        &app,
        Method::GET,
        REVOCATIONS_PATH,
        Some(&format!("Bearer {token}")),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
}
