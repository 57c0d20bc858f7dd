// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ranking presentation types.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Gender, Record};

/// A record with its 1-based rank inside its gender partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RankedRecord {
    pub rank: usize,
    #[serde(flatten)]
    pub record: Record,
}

/// Redacted ranking entry for the public board.
///
/// Measurements are replaced with a fixed placeholder and only the
/// submission date is kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PublicEntry {
    pub rank: usize,
    pub name: String,
    pub gender: Gender,
    pub bike: &'static str,
    pub treadmill: &'static str,
    pub rowing: &'static str,
    pub total_distance: &'static str,
    /// `YYYY-MM-DD`
    pub submitted_date: String,
}

/// Aggregate leaderboard statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Statistics {
    pub total_participants: usize,
    pub male_count: usize,
    pub female_count: usize,
    /// Mean total distance, rounded to 2 decimal places
    pub average_distance: f64,
    /// Maximum total distance, rounded to 2 decimal places
    pub max_distance: f64,
}
