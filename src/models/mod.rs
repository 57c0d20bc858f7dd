// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod ranking;
pub mod record;
pub mod store;

pub use ranking::{PublicEntry, RankedRecord, Statistics};
pub use record::{Gender, NewRecord, Record};
pub use store::StoreDocument;
