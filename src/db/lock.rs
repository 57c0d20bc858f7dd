// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marker-file lock serializing mutations of the leaderboard document.
//!
//! Two layers of exclusion:
//! - callers inside this process queue on an async mutex (no polling);
//! - the mutex holder then creates a marker file with create-only-if-absent
//!   semantics, so other processes sharing the data directory are excluded too.
//!
//! The marker is removed when the [`LockGuard`] is dropped, on every exit
//! path of the critical section.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;

use crate::time_utils::format_utc_rfc3339;

const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(100);
const DEFAULT_MAX_ATTEMPTS: u32 = 50;

/// Retry budget for acquiring the lock.
#[derive(Debug, Clone, Copy)]
pub struct LockOptions {
    /// Wait between marker creation attempts
    pub retry_interval: Duration,
    /// Attempts before giving up
    pub max_attempts: u32,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            retry_interval: DEFAULT_RETRY_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl LockOptions {
    /// Total time a caller may wait before `LockError::Timeout`.
    pub fn budget(&self) -> Duration {
        self.retry_interval * self.max_attempts
    }
}

/// Lock acquisition errors.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Timed out acquiring lock {path} after {waited:?}")]
    Timeout { path: PathBuf, waited: Duration },

    #[error("Lock marker I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Named lock backed by a marker file.
///
/// Cheap to clone; clones share the same in-process queue.
#[derive(Debug, Clone)]
pub struct FileLock {
    path: PathBuf,
    options: LockOptions,
    local: Arc<Mutex<()>>,
}

impl FileLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, LockOptions::default())
    }

    pub fn with_options(path: impl Into<PathBuf>, options: LockOptions) -> Self {
        Self {
            path: path.into(),
            options,
            local: Arc::new(Mutex::new(())),
        }
    }

    /// Marker file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the marker currently exists (held by this or another process).
    pub fn is_locked(&self) -> bool {
        self.path.exists()
    }

    /// Acquire the lock, waiting at most `options.budget()`.
    ///
    /// On timeout nothing is left behind: no marker is created and the
    /// in-process queue position is given up.
    pub async fn acquire(&self) -> Result<LockGuard, LockError> {
        let started = Instant::now();
        let budget = self.options.budget();

        let local = tokio::time::timeout(budget, self.local.clone().lock_owned())
            .await
            .map_err(|_| self.timeout(started))?;

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.create_marker() {
                Ok(()) => {
                    tracing::trace!(path = %self.path.display(), attempts, "Lock acquired");
                    return Ok(LockGuard {
                        path: self.path.clone(),
                        _local: local,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if attempts >= self.options.max_attempts
                        || started.elapsed() + self.options.retry_interval > budget
                    {
                        tracing::warn!(
                            path = %self.path.display(),
                            attempts,
                            "Lock marker still present, giving up"
                        );
                        return Err(self.timeout(started));
                    }
                    tokio::time::sleep(self.options.retry_interval).await;
                }
                Err(source) => {
                    return Err(LockError::Io {
                        path: self.path.clone(),
                        source,
                    })
                }
            }
        }
    }

    fn create_marker(&self) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)?;

        // Informational only; a failure here must not leave the marker behind.
        if let Err(e) = writeln!(
            file,
            "{} {}",
            std::process::id(),
            format_utc_rfc3339(Utc::now())
        ) {
            let _ = std::fs::remove_file(&self.path);
            return Err(e);
        }
        Ok(())
    }

    fn timeout(&self, started: Instant) -> LockError {
        LockError::Timeout {
            path: self.path.clone(),
            waited: started.elapsed(),
        }
    }
}

/// Proof of lock ownership. Dropping it releases the lock.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
    _local: OwnedMutexGuard<()>,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // Marker goes first; the in-process mutex is released after this returns.
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove lock marker"
                );
            }
        }
    }
}
