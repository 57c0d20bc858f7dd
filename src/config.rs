// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::db::LockOptions;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Directory holding the leaderboard document and its lock marker
    pub data_dir: PathBuf,
    /// Directory for uploaded photos
    pub upload_dir: PathBuf,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Request body limit for submissions
    pub max_upload_bytes: usize,
    /// How long a submission waits for the store lock
    pub lock_options: LockOptions,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: parse_var("PORT")?.unwrap_or(DEFAULT_PORT),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES")?.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            lock_options: lock_options_from_env()?,
        })
    }

    /// Config for tests, rooted in a scratch directory.
    pub fn test_default(root: &Path) -> Self {
        Self {
            port: 0,
            data_dir: root.join("data"),
            upload_dir: root.join("uploads"),
            frontend_url: "http://localhost:5173".to_string(),
            max_upload_bytes: 1024 * 1024,
            lock_options: LockOptions {
                retry_interval: Duration::from_millis(10),
                max_attempts: 5,
            },
        }
    }
}

fn lock_options_from_env() -> Result<LockOptions, ConfigError> {
    let defaults = LockOptions::default();
    Ok(LockOptions {
        retry_interval: parse_var("LOCK_RETRY_INTERVAL_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_interval),
        max_attempts: parse_var("LOCK_MAX_ATTEMPTS")?.unwrap_or(defaults.max_attempts),
    })
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
