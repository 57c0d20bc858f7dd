// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File-backed leaderboard store.
//!
//! The whole leaderboard lives in one JSON document. Every write replaces the
//! document atomically (temp file + rename), so readers never observe a
//! partially written file and take no lock. Mutations are serialized by a
//! [`FileLock`] held across the entire read-modify-write.
//!
//! Critical sections run on their own task, which owns the lock guard. A
//! caller that stops waiting (client disconnect, timeout) does not release
//! the lock while a write is still in flight.

use std::fs::File;
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;

use crate::db::lock::{FileLock, LockError, LockOptions};
use crate::models::{NewRecord, Record, StoreDocument};

const DOCUMENT_FILE: &str = "leaderboard.json";
const LOCK_SUFFIX: &str = "lock";

/// Store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("Store document {path} is malformed: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize store document: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Durable storage for the leaderboard document.
#[derive(Debug, Clone)]
pub struct RecordStore {
    document_path: PathBuf,
    lock: FileLock,
}

impl RecordStore {
    /// Open (or prepare) the store inside `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_lock_options(data_dir, LockOptions::default())
    }

    pub fn open_with_lock_options(
        data_dir: impl AsRef<Path>,
        options: LockOptions,
    ) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir).map_err(|source| StoreError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;

        let document_path = data_dir.join(DOCUMENT_FILE);
        let lock = FileLock::with_options(
            document_path.with_extension(format!("json.{LOCK_SUFFIX}")),
            options,
        );

        tracing::info!(path = %document_path.display(), "Record store opened");
        Ok(Self {
            document_path,
            lock,
        })
    }

    /// Path of the JSON document.
    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    /// The lock guarding mutations.
    pub fn lock(&self) -> &FileLock {
        &self.lock
    }

    // ─── Reads ───────────────────────────────────────────────────

    /// Load the current snapshot.
    ///
    /// A missing document is an empty store. A malformed one is reported as
    /// [`StoreError::Corrupt`] so the caller decides whether to fall back.
    pub async fn read(&self) -> Result<StoreDocument, StoreError> {
        match tokio::fs::read(&self.document_path).await {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                    path: self.document_path.clone(),
                    source,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(StoreDocument::default()),
            Err(source) => Err(StoreError::Io {
                path: self.document_path.clone(),
                source,
            }),
        }
    }

    /// Load the current snapshot, substituting an empty store on failure.
    ///
    /// Fallback policy for read-only views only: a corrupt or unreadable
    /// document is logged and presented as empty. It is never written back,
    /// since mutations go through [`RecordStore::append`], which refuses to
    /// build on a document it cannot parse.
    pub async fn read_or_empty(&self) -> StoreDocument {
        match self.read().await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.document_path.display(),
                    "Store unreadable, serving empty leaderboard"
                );
                StoreDocument::default()
            }
        }
    }

    // ─── Writes ──────────────────────────────────────────────────

    /// Replace the whole document with `snapshot`.
    ///
    /// `lastUpdated` is refreshed. Returns the snapshot as persisted.
    pub async fn write(&self, snapshot: StoreDocument) -> Result<StoreDocument, StoreError> {
        self.with_lock(move |store| async move { store.persist(snapshot).await })
            .await
    }

    /// Append a new submission and return the stored record.
    pub async fn append(&self, new: NewRecord) -> Result<Record, StoreError> {
        let (record, _) = self.append_with_snapshot(new).await?;
        Ok(record)
    }

    /// Append a new submission, returning the record and the snapshot it was
    /// committed in.
    ///
    /// Read, id assignment and persist all happen under one lock acquisition,
    /// so concurrent appends can never build on the same snapshot.
    pub async fn append_with_snapshot(
        &self,
        new: NewRecord,
    ) -> Result<(Record, StoreDocument), StoreError> {
        self.with_lock(move |store| async move {
            let mut doc = store.read().await?;
            let record = doc.push(new, Utc::now());
            let doc = store.persist(doc).await?;

            tracing::info!(
                id = record.id,
                name = %record.name,
                gender = %record.gender,
                total_distance = record.total_distance,
                records = doc.len(),
                "Record appended"
            );
            Ok((record, doc))
        })
        .await
    }

    /// Run `f` on a spawned task while holding the store lock.
    ///
    /// The task owns the guard, so the section runs to completion and the
    /// lock is released afterwards even if the returned future is dropped.
    /// The lock is released however `f` finishes.
    pub async fn with_lock<F, Fut, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(RecordStore) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, StoreError>> + Send + 'static,
        T: Send + 'static,
    {
        let guard = self.lock.acquire().await?;
        let store = self.clone();

        tokio::spawn(async move {
            let _guard = guard;
            f(store).await
        })
        .await?
    }

    /// Serialize and atomically replace the document. Caller holds the lock.
    async fn persist(&self, mut doc: StoreDocument) -> Result<StoreDocument, StoreError> {
        doc.last_updated = Utc::now();
        let bytes = serde_json::to_vec_pretty(&doc).map_err(StoreError::Serialize)?;
        let len = bytes.len();

        let target = self.document_path.clone();
        let result = tokio::task::spawn_blocking(move || {
            replace_atomically(&target, |file| file.write_all(&bytes))
        })
        .await?;

        if let Err(source) = result {
            tracing::error!(
                error = %source,
                path = %self.document_path.display(),
                "Failed to persist store, previous document kept"
            );
            return Err(StoreError::Io {
                path: self.document_path.clone(),
                source,
            });
        }

        tracing::debug!(
            records = doc.len(),
            next_id = doc.next_id,
            bytes = len,
            "Store persisted"
        );
        Ok(doc)
    }
}

/// Replace `target` with whatever `write` produces, or leave it untouched.
///
/// The content goes to a uniquely named temp file in the same directory,
/// is synced, then renamed over `target`. Any error before the rename
/// removes the temp file. The rename is the commit point: a failed
/// directory sync afterwards is only logged.
fn replace_atomically<F>(target: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir)?;
    write(temp.as_file_mut())?;
    temp.as_file_mut().flush()?;
    temp.as_file().sync_all()?;
    temp.persist(target).map_err(|e| e.error)?;

    if let Err(e) = sync_dir(dir) {
        tracing::warn!(
            error = %e,
            dir = %dir.display(),
            "Failed to sync data directory after rename"
        );
    }
    Ok(())
}

/// Make a completed rename durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
