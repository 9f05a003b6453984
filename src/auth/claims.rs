// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the resolved principal.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::roles::Role;

/// Claims carried by every issued token.
///
/// `iat` and `exp` are whole Unix seconds, as in standard JWT `NumericDate`,
/// with `exp` rounded down. `exp_ms` is the exact expiry and is the one
/// checked on verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user identifier handed to the identity resolver)
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp in whole seconds
    pub exp: i64,

    /// Expiration timestamp in milliseconds (exclusive)
    pub exp_ms: i64,

    /// Token ID, the key under which revocations are recorded
    pub jti: String,
}

impl TokenClaims {
    /// Whether the token is expired at `now`.
    ///
    /// The expiry instant itself is already expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() >= self.exp_ms
    }

    /// Time left until expiry, or `None` if the token is already expired.
    ///
    /// `now + remaining_lifetime(now)` lands exactly on [`Self::expires_at`].
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Option<Duration> {
        let expires_at = self.expires_at()?;
        if self.is_expired(now) {
            return None;
        }
        (expires_at - now).to_std().ok().filter(|ttl| !ttl.is_zero())
    }

    /// Expiry as a UTC datetime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.exp_ms)
    }
}

/// Authenticated identity attached to a single request.
///
/// Built fresh from the verified token subject on every request and dropped
/// with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Canonical user ID
    pub id: String,

    /// Roles granted to the user
    pub roles: BTreeSet<Role>,
}

impl Principal {
    /// Create a principal from an ID and a list of roles.
    pub fn new(id: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            id: id.into(),
            roles: roles.into_iter().collect(),
        }
    }

    /// Check if the principal holds the given role.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Check if the principal holds at least one of `required`.
    pub fn has_any_role(&self, required: &BTreeSet<Role>) -> bool {
        !self.roles.is_disjoint(required)
    }
}
