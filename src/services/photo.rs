// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage for evidentiary photos attached to submissions.

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic"];
const HASH_PREFIX_LEN: usize = 16;

/// Writes uploaded photos into a directory and hands back references.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    /// Open the upload directory, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PhotoError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(PhotoError::Io)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist a photo and return the reference stored on the record.
    ///
    /// The file name is `<unix-millis>-<sha256 prefix>.<ext>`, so the
    /// client-supplied name never reaches the filesystem.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, PhotoError> {
        if bytes.is_empty() {
            return Err(PhotoError::Empty);
        }
        let ext = extension(original_name)?;

        let digest = hex::encode(Sha256::digest(bytes));
        let file_name = format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            &digest[..HASH_PREFIX_LEN],
            ext
        );

        tokio::fs::write(self.dir.join(&file_name), bytes)
            .await
            .map_err(PhotoError::Io)?;

        tracing::debug!(file = %file_name, size = bytes.len(), "Photo saved");
        Ok(self.reference(&file_name))
    }

    /// Delete a previously saved photo (used when its record was not stored).
    pub async fn remove(&self, reference: &str) -> Result<(), PhotoError> {
        let file_name = Path::new(reference)
            .file_name()
            .ok_or_else(|| PhotoError::InvalidReference(reference.to_string()))?;

        match tokio::fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PhotoError::Io(e)),
        }
    }

    fn reference(&self, file_name: &str) -> String {
        let dir_name = self
            .dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("uploads");
        format!("{}/{}", dir_name, file_name)
    }
}

/// Lowercased, allow-listed extension of an uploaded file name.
fn extension(original_name: &str) -> Result<String, PhotoError> {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| PhotoError::UnsupportedType(original_name.to_string()))?;

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(PhotoError::UnsupportedType(original_name.to_string()))
    }
}

/// Errors from photo operations.
#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    #[error("Photo file is empty")]
    Empty,

    #[error("Unsupported photo type: {0}")]
    UnsupportedType(String),

    #[error("Invalid photo reference: {0}")]
    InvalidReference(String),

    #[error("Failed to store photo: {0}")]
    Io(#[source] io::Error),
}
