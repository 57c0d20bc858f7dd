// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Distance leaderboard: gender-partitioned rankings over a file-backed store
//!
//! Submissions (bike, treadmill and rowing distances plus a proof photo) are
//! appended to a single JSON document guarded by a marker-file lock. Rankings,
//! personal lookups, statistics and backups are computed from snapshots of it.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{RecordStore, StoreError};
use services::{PhotoError, PhotoStore};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: RecordStore,
    pub photos: PhotoStore,
}

impl AppState {
    /// Open the record store and photo directory named by `config`.
    pub fn open(config: Config) -> Result<Self, StartupError> {
        let store = RecordStore::open_with_lock_options(
            &config.data_dir,
            config.lock_options,
        )?;
        let photos = PhotoStore::open(&config.upload_dir)?;
        Ok(Self {
            config,
            store,
            photos,
        })
    }
}

/// Errors opening on-disk state at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Failed to open record store: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to open upload directory: {0}")]
    Photos(#[from] PhotoError),
}
