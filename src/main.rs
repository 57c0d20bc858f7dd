// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Distance Leaderboard API Server
//!
//! Accepts distance submissions and serves gender-partitioned rankings
//! from a lock-guarded JSON document on disk.

use distance_leaderboard::{config::Config, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Distance Leaderboard API");

    let state = AppState::open(config.clone())?;
    let snapshot = state.store.read_or_empty().await;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        upload_dir = %config.upload_dir.display(),
        records = snapshot.len(),
        next_id = snapshot.next_id,
        "Record store loaded"
    );

    if state.store.lock().is_locked() {
        tracing::warn!(
            path = %state.store.lock().path().display(),
            "Lock marker present at startup; submissions will time out until it is released"
        );
    }

    // Build router
    let app = distance_leaderboard::routes::create_router(Arc::new(state));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("distance_leaderboard=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
