// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Revocation Sweeper
//!
//! Background task that periodically drops expired revocation entries.
//!
//! Lookups already ignore expired entries, so the sweeper only bounds
//! memory: a burst of logouts followed by a quiet period would otherwise keep
//! dead entries around until the next revoke call.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::RevocationStore;

/// Background purger for a revocation store.
pub struct RevocationSweeper {
    store: Arc<dyn RevocationStore>,
    interval: Duration,
}

impl RevocationSweeper {
    /// Create a sweeper running every `interval`.
    pub fn new(store: Arc<dyn RevocationStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Revocation sweeper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Revocation sweeper shutting down");
                    return;
                }
            }

            self.sweep_step().await;
        }
    }

    /// Execute one sweep. Returns the number of entries removed.
    pub async fn sweep_step(&self) -> usize {
        match self.store.purge_expired(Utc::now()).await {
            Ok(0) => 0,
            Ok(removed) => {
                debug!(removed, "Revocation sweeper: purged expired entries");
                removed
            }
            Err(e) => {
                warn!(error = %e, "Revocation sweeper: purge failed");
                0
            }
        }
    }
}
