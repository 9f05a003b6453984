// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, sync::Arc};

use civic_auth::{
    api::{policy, router},
    auth::{AuthService, InMemoryRevocationStore, StaticIdentityResolver},
    config::{AuthSettings, DEV_USERS_ENV, LOG_FORMAT_ENV},
    state::AppState,
    sweeper::RevocationSweeper,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    // Refuse to start without a usable signing key.
    let settings = match AuthSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid authentication configuration");
            std::process::exit(1);
        }
    };
    info!(settings = ?settings, "Loaded authentication settings");

    let identity = match StaticIdentityResolver::from_list(
        &env::var(DEV_USERS_ENV).unwrap_or_default(),
    ) {
        Ok(identity) => identity,
        Err(e) => {
            error!(error = %e, "Invalid principal list");
            std::process::exit(1);
        }
    };
    if identity.is_empty() {
        warn!("{DEV_USERS_ENV} is empty; every token will fail identity resolution");
    }

    let store = Arc::new(InMemoryRevocationStore::new());
    let auth = AuthService::from_settings(&settings, store.clone());
    let state = AppState::new(auth, Arc::new(identity), policy());
    let app = router(state);

    let shutdown = CancellationToken::new();
    let sweeper = RevocationSweeper::new(store, settings.sweep_interval);
    let sweeper_handle = tokio::spawn(sweeper.run(shutdown.clone()));

    // Parse bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = match format!("{host}:{port}").parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(%host, port, error = %e, "Failed to parse bind address");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "Failed to bind listener");
            std::process::exit(1);
        }
    };

    info!(%addr, "Civic Auth server listening (docs at /docs)");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
    {
        error!(error = %e, "HTTP server failed");
    }

    shutdown.cancel();
    let _ = sweeper_handle.await;
    info!("Server stopped");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => builder.json().try_init(),
        _ => builder.try_init(),
    };
    if let Err(e) = result {
        eprintln!("Failed to install tracing subscriber: {e}");
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
        }
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();
}
