// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kite_score_server::api::router;
use kite_score_server::config::{Config, LOG_FORMAT_ENV};
use kite_score_server::state::{AppState, RateLimitSettings};
use kite_score_server::storage::{FileRateStore, JsonStore, StoragePaths};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "pretty".to_string());
    if format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    // Fails fast on a forgeable attestation secret in production.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let mut storage = JsonStore::new(StoragePaths::new(&config.data_dir));
    storage
        .initialize()
        .expect("failed to initialize storage directories");

    let rate_store = FileRateStore::new(std::sync::Arc::new(storage.clone()));
    let rate_settings = RateLimitSettings {
        limit: config.rate_limit_per_minute,
        window: std::time::Duration::from_secs(60),
    };

    let state = AppState::new(storage, config.signing.clone(), rate_store, rate_settings);
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    info!(addr = %addr, "Kite score server listening (docs at /docs)");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal_token.cancel();
        }
    });

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await
    .expect("HTTP server failed");
}
