// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token lifecycle entry points for the rest of the platform.
//!
//! Registration and login call [`AuthService::issue_token`] once the user's
//! credentials have been checked. Logout and account deletion call
//! [`AuthService::revoke_token`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::codec::{IssuedToken, TokenCodec};
use super::revocation::RevocationStore;
use super::verifier::TokenVerifier;
use super::{AuthError, TokenClaims};
use crate::config::AuthSettings;

/// Issues, verifies and revokes bearer tokens.
#[derive(Clone)]
pub struct AuthService {
    codec: Arc<TokenCodec>,
    verifier: TokenVerifier,
}

impl AuthService {
    /// Create a service around `codec` and `store`.
    pub fn new(codec: TokenCodec, store: Arc<dyn RevocationStore>, lookup_timeout: Duration) -> Self {
        let codec = Arc::new(codec);
        let verifier = TokenVerifier::new(Arc::clone(&codec), store, lookup_timeout);
        Self { codec, verifier }
    }

    /// Create a service from validated settings.
    pub fn from_settings(settings: &AuthSettings, store: Arc<dyn RevocationStore>) -> Self {
        let codec = TokenCodec::new(settings.signing_key.clone(), settings.token_ttl);
        Self::new(codec, store, settings.revocation_timeout)
    }

    /// Issue a token for `subject`, valid from now.
    pub fn issue_token(&self, subject: &str) -> Result<IssuedToken, AuthError> {
        self.issue_token_at(subject, Utc::now())
    }

    /// Issue a token for `subject` as of `now`.
    pub fn issue_token_at(&self, subject: &str, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let issued = self.codec.issue(subject, now)?;
        debug!(
            subject,
            jti = %issued.claims.jti,
            exp_ms = issued.claims.exp_ms,
            "token issued"
        );
        Ok(issued)
    }

    /// Verify `token` against the current time.
    pub async fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.verifier.verify(token, Utc::now()).await
    }

    /// Verify `token` as of `now`.
    pub async fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        self.verifier.verify(token, now).await
    }

    /// Revoke `token` until it would have expired.
    pub async fn revoke_token(&self, token: &str) -> Result<(), AuthError> {
        self.verifier.revoke(token, Utc::now()).await
    }

    /// Revoke `token` as of `now`.
    pub async fn revoke_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<(), AuthError> {
        self.verifier.revoke(token, now).await
    }

    /// Lifetime of issued tokens.
    pub fn token_ttl(&self) -> Duration {
        self.codec.ttl()
    }

    /// The revocation store.
    pub fn revocations(&self) -> &Arc<dyn RevocationStore> {
        self.verifier.store()
    }
}
