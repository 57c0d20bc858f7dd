// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer (single JSON document guarded by a marker-file lock).

pub mod lock;
pub mod record_store;

pub use lock::{FileLock, LockError, LockGuard, LockOptions};
pub use record_store::{RecordStore, StoreError};
