// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token verification: signature, expiry, then revocation.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use super::codec::TokenCodec;
use super::revocation::RevocationStore;
use super::{AuthError, TokenClaims};

/// Combines the codec and the revocation store into one decision.
#[derive(Clone)]
pub struct TokenVerifier {
    codec: Arc<TokenCodec>,
    store: Arc<dyn RevocationStore>,
    lookup_timeout: Duration,
}

impl TokenVerifier {
    /// Create a verifier. Store calls are bounded by `lookup_timeout`.
    pub fn new(
        codec: Arc<TokenCodec>,
        store: Arc<dyn RevocationStore>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            codec,
            store,
            lookup_timeout,
        }
    }

    /// Verify `token` at `now`, returning its claims.
    ///
    /// Checks run in order and stop at the first failure: decode and
    /// signature, expiry, revocation. A failed check writes no state.
    pub async fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        let claims = self.codec.decode(token)?;

        if self.codec.is_expired(&claims, now) {
            return Err(AuthError::Expired);
        }

        let revoked = tokio::time::timeout(self.lookup_timeout, self.store.is_revoked(&claims.jti, now))
            .await
            .map_err(|_| {
                error!(
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "Revocation lookup timed out; rejecting request"
                );
                AuthError::StoreUnavailable
            })?
            .map_err(|e| {
                error!(error = %e, "Revocation lookup failed; rejecting request");
                AuthError::StoreUnavailable
            })?;

        if revoked {
            debug!(jti = %claims.jti, "token is revoked");
            return Err(AuthError::Revoked);
        }

        Ok(claims)
    }

    /// Revoke `token` until its natural expiry.
    ///
    /// The token's signature must be valid. Revoking an expired token is a
    /// no-op success, as is revoking an already-revoked one.
    pub async fn revoke(&self, token: &str, now: DateTime<Utc>) -> Result<(), AuthError> {
        let claims = self.codec.decode(token)?;

        let Some(ttl) = claims.remaining_lifetime(now) else {
            debug!(jti = %claims.jti, "token already expired; nothing to revoke");
            return Ok(());
        };

        tokio::time::timeout(self.lookup_timeout, self.store.revoke(&claims.jti, ttl, now))
            .await
            .map_err(|_| {
                error!(
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "Revocation write timed out"
                );
                AuthError::StoreUnavailable
            })?
            .map_err(|e| {
                error!(error = %e, "Revocation write failed");
                AuthError::StoreUnavailable
            })?;

        debug!(jti = %claims.jti, subject = %claims.sub, "token revoked");
        Ok(())
    }

    /// The revocation store backing this verifier.
    pub fn store(&self) -> &Arc<dyn RevocationStore> {
        &self.store
    }
}
