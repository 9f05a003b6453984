// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Revocation store for tokens invalidated before their natural expiry.
//!
//! An entry only has to live as long as the token it blocks, so every
//! revocation carries a TTL equal to the token's remaining lifetime.
//!
//! ## Clock
//!
//! Entry deadlines are wall-clock instants computed from the `now` the caller
//! passes in, the same clock token expiry is judged on. An entry therefore
//! expires exactly when the token it blocks does, even if the system clock is
//! stepped in between.
//!
//! ## Consistency
//!
//! [`InMemoryRevocationStore`] is linearizable: a lookup observes every
//! `revoke` call that returned before the lookup started. Backends that
//! replicate asynchronously must bound their lag; the verifier treats any
//! lookup failure or timeout as "unavailable" and rejects the request.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

/// Upper bound applied to revocation TTLs before computing deadlines.
const MAX_ENTRY_TTL: Duration = Duration::from_secs(366 * 24 * 3600);

/// Map size past which a revoke also purges expired entries.
///
/// Below it, expired entries are left to the background sweeper.
const PURGE_THRESHOLD: usize = 10_000;

/// Revocation store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RevocationError {
    /// The backing store cannot currently answer
    #[error("revocation store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for revoked token keys.
///
/// Implementations must tolerate many concurrent readers against rare
/// writers. Every call takes the caller's `now`; an entry lives from the
/// `now` it was revoked at until `ttl` later.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Revoke `token_key` for `ttl` starting at `now`.
    ///
    /// Idempotent: revoking a key that is already revoked succeeds without
    /// changing anything. A zero `ttl` is a no-op.
    async fn revoke(
        &self,
        token_key: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<(), RevocationError>;

    /// Whether `token_key` is revoked at `now`.
    async fn is_revoked(&self, token_key: &str, now: DateTime<Utc>)
        -> Result<bool, RevocationError>;

    /// Drop entries expired at `now`. Returns the number removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, RevocationError>;

    /// Number of entries still live at `now`.
    async fn active_entries(&self, now: DateTime<Utc>) -> Result<usize, RevocationError>;
}

/// A single revocation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationEntry {
    /// When the revocation was recorded
    pub revoked_at: DateTime<Utc>,
    /// Deadline after which the entry is ignored and may be purged
    pub expires_at: DateTime<Utc>,
}

impl RevocationEntry {
    fn new(now: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = TimeDelta::from_std(ttl.min(MAX_ENTRY_TTL))
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            revoked_at: now,
            expires_at,
        }
    }

    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// In-process revocation store with passive per-key expiry.
///
/// Backed by a sharded [`DashMap`], so a revoke only locks the shard holding
/// its key and lookups elsewhere proceed.
#[derive(Default)]
pub struct InMemoryRevocationStore {
    entries: DashMap<String, RevocationEntry>,
}

impl InMemoryRevocationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the entry for `token_key`, if live at `now`.
    pub fn entry(&self, token_key: &str, now: DateTime<Utc>) -> Option<RevocationEntry> {
        self.entries
            .get(token_key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value().clone())
    }

    fn purge(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(self.entries.len())
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(
        &self,
        token_key: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<(), RevocationError> {
        if ttl.is_zero() {
            return Ok(());
        }

        if self.entries.len() >= PURGE_THRESHOLD {
            let removed = self.purge(now);
            debug!(removed, "revocation map over threshold; purged expired entries");
        }

        match self.entries.entry(token_key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    debug!(token_key, "token already revoked");
                } else {
                    occupied.insert(RevocationEntry::new(now, ttl));
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(RevocationEntry::new(now, ttl));
            }
        }
        Ok(())
    }

    async fn is_revoked(
        &self,
        token_key: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, RevocationError> {
        Ok(self.entry(token_key, now).is_some())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, RevocationError> {
        Ok(self.purge(now))
    }

    async fn active_entries(&self, now: DateTime<Utc>) -> Result<usize, RevocationError> {
        Ok(self.entries.iter().filter(|entry| entry.is_live(now)).count())
    }
}
