// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

use std::{env, net::SocketAddr, path::PathBuf};

use tracing::info;
use tracing_subscriber::EnvFilter;

use microtask_server::api::router;
use microtask_server::auth::AuthKeys;
use microtask_server::config::{
    ACCESS_TOKEN_SECRET_ENV, DATA_DIR_ENV, DEFAULT_HOST, DEFAULT_PORT, HOST_ENV, LOG_FORMAT_ENV,
    PORT_ENV,
};
use microtask_server::providers::StripeClient;
use microtask_server::state::AppState;
use microtask_server::storage::{DocumentStorage, StoragePaths};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let format = env::var(LOG_FORMAT_ENV).unwrap_or_default();
    if format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let paths = match env::var(DATA_DIR_ENV) {
        Ok(dir) => StoragePaths::new(PathBuf::from(dir)),
        Err(_) => StoragePaths::default(),
    };
    let mut storage = DocumentStorage::new(paths);
    storage
        .initialize()
        .expect("Failed to initialize document storage");
    info!(root = %storage.paths().root().display(), "Document storage initialized");

    let secret = env::var(ACCESS_TOKEN_SECRET_ENV)
        .unwrap_or_else(|_| panic!("{ACCESS_TOKEN_SECRET_ENV} must be set"));
    let auth = AuthKeys::from_secret(&secret);

    let stripe = if StripeClient::is_configured() {
        let client = StripeClient::from_env().expect("Failed to build Stripe client");
        info!("Stripe payment client configured");
        Some(client)
    } else {
        info!("STRIPE_SECRET_KEY not set; payment endpoints will answer 503");
        None
    };

    let state = AppState::new(storage, auth, stripe);
    let app = router(state);

    let host = env::var(HOST_ENV).unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port: u16 = env::var(PORT_ENV)
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    info!("Microtask server listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Shutdown signal received");
}
