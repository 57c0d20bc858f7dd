// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The persisted leaderboard document.
//!
//! Stored as a single JSON file:
//! `{ "records": [...], "nextId": 4, "lastUpdated": "2025-03-01T09:30:00Z" }`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{NewRecord, Record};

/// Full snapshot of the leaderboard.
///
/// `records` are kept in submission order and never reordered on disk.
/// `next_id` is persisted so ids are never reused across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default = "first_id")]
    pub next_id: u64,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

fn first_id() -> u64 {
    1
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_id: first_id(),
            last_updated: Utc::now(),
        }
    }
}

impl StoreDocument {
    /// Assign the next id to a new submission and append it.
    ///
    /// Returns a copy of the stored record.
    pub fn push(&mut self, new: NewRecord, submitted_at: DateTime<Utc>) -> Record {
        // Repair a counter that fell behind hand-edited data rather than reuse an id.
        let max_existing = self.records.iter().map(|r| r.id).max().unwrap_or(0);
        let id = self.next_id.max(max_existing + 1);

        let record = new.into_record(id, submitted_at);
        self.records.push(record.clone());
        self.next_id = id + 1;
        record
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
