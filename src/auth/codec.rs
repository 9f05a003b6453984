// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token encoding, signing and signature verification.
//!
//! Tokens are compact JWS strings signed with HS256. The header carries
//! `kid = "v1"` naming the key/format version; tokens of any other version or
//! algorithm are rejected.
//!
//! Expiry is deliberately not validated by `jsonwebtoken` here. Callers pass
//! `now` explicitly and use [`TokenCodec::is_expired`], which keeps the
//! boundary exact and testable.

use std::time::Duration;

use base64ct::{Base64Unpadded, Encoding};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::{AuthError, TokenClaims};
use crate::config::ConfigError;

/// Signing algorithm for every issued token.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Key/format version written to the `kid` header.
pub const TOKEN_FORMAT_VERSION: &str = "v1";

/// Minimum decoded length of the signing key (256 bits for HS256).
pub const MIN_SIGNING_KEY_BYTES: usize = 32;

/// Server-held HMAC key.
#[derive(Clone)]
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    /// Build a key from raw key material.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() < MIN_SIGNING_KEY_BYTES {
            return Err(ConfigError::KeyTooShort {
                min: MIN_SIGNING_KEY_BYTES,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        })
    }

    /// Build a key from standard-alphabet base64. Trailing padding is optional.
    pub fn from_base64(encoded: &str) -> Result<Self, ConfigError> {
        let unpadded = encoded.trim().trim_end_matches('=');
        let bytes = Base64Unpadded::decode_vec(unpadded).map_err(|_| ConfigError::KeyEncoding)?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

/// A freshly issued token together with the claims it carries.
#[derive(Clone)]
pub struct IssuedToken {
    /// Encoded token string handed to the client
    pub token: String,
    /// Claims embedded in `token`
    pub claims: TokenClaims,
}

/// Issues and decodes signed tokens.
pub struct TokenCodec {
    key: SigningKey,
    ttl: Duration,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec issuing tokens valid for `ttl`.
    pub fn new(key: SigningKey, ttl: Duration) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            key,
            ttl,
            validation,
        }
    }

    /// Lifetime of issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` at `now`.
    ///
    /// The token expires exactly `ttl` after `now`, to the millisecond. `iat`
    /// is `now` truncated to the whole second.
    pub fn issue(&self, subject: &str, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let expires_at = TimeDelta::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AuthError::Internal("token lifetime out of range".to_string()))?;
        let exp_ms = expires_at.timestamp_millis();
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: exp_ms.div_euclid(1000),
            exp_ms,
            jti: Uuid::new_v4().to_string(),
        };

        let mut header = Header::new(TOKEN_ALGORITHM);
        header.kid = Some(TOKEN_FORMAT_VERSION.to_string());

        let token = encode(&header, &claims, &self.key.encoding)
            .map_err(|e| AuthError::Internal(format!("failed to sign token: {e}")))?;

        Ok(IssuedToken { token, claims })
    }

    /// Decode `token` and verify its signature.
    ///
    /// Does not check expiry or revocation.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        if token.split('.').count() != 3 || token.split('.').any(str::is_empty) {
            return Err(AuthError::MalformedToken);
        }

        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        if header.alg != TOKEN_ALGORITHM || header.kid.as_deref() != Some(TOKEN_FORMAT_VERSION) {
            return Err(AuthError::SignatureInvalid);
        }

        // The signature is checked before the claims are decoded, so a base64
        // error here is a damaged signature or claims segment. Both are
        // treated as tampering.
        decode::<TokenClaims>(token, &self.key.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::Base64(_) => {
                    AuthError::SignatureInvalid
                }
                _ => AuthError::MalformedToken,
            })
    }

    /// Whether `claims` are expired at `now` (`now >= exp`).
    pub fn is_expired(&self, claims: &TokenClaims, now: DateTime<Utc>) -> bool {
        claims.is_expired(now)
    }
}
