// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard submission model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Gender partition a submission is ranked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Wire value (`male` / `female`).
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Localized label shown to participants.
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "남성",
            Gender::Female => "여성",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized gender value.
#[derive(Debug, thiserror::Error)]
#[error("Invalid gender '{0}' (expected 'male' or 'female')")]
pub struct InvalidGender(pub String);

impl FromStr for Gender {
    type Err = InvalidGender;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(InvalidGender(other.to_string())),
        }
    }
}

/// Stored leaderboard record.
///
/// Immutable once created: `total_distance` is fixed at creation time and
/// always equals `bike + treadmill + rowing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Record {
    /// Assigned from the store's `nextId` counter
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    /// Participant name (trimmed)
    pub name: String,
    pub gender: Gender,
    /// Bike distance
    pub bike: f64,
    /// Treadmill distance
    pub treadmill: f64,
    /// Rowing distance
    pub rowing: f64,
    /// Sum of the three measurements
    pub total_distance: f64,
    /// Opaque reference to the evidentiary photo
    pub photo: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub submitted_at: DateTime<Utc>,
}

/// Validated fields for a new submission, before an id is assigned.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub name: String,
    pub gender: Gender,
    pub bike: f64,
    pub treadmill: f64,
    pub rowing: f64,
    pub photo: String,
}

impl NewRecord {
    /// Materialize the record with its id and creation timestamp.
    pub fn into_record(self, id: u64, submitted_at: DateTime<Utc>) -> Record {
        let total_distance = self.bike + self.treadmill + self.rowing;
        Record {
            id,
            name: self.name,
            gender: self.gender,
            bike: self.bike,
            treadmill: self.treadmill,
            rowing: self.rowing,
            total_distance,
            photo: self.photo,
            submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_parse() {
        assert_eq!("male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!(" female ".parse::<Gender>().unwrap(), Gender::Female);
        assert!("Male".parse::<Gender>().is_err());
        assert!("".parse::<Gender>().is_err());
    }

    #[test]
    fn test_total_distance_is_sum() {
        let new = NewRecord {
            name: "Kim".to_string(),
            gender: Gender::Female,
            bike: 12.5,
            treadmill: 3.25,
            rowing: 4.0,
            photo: "uploads/a.jpg".to_string(),
        };

        let record = new.into_record(7, Utc::now());

        assert_eq!(record.id, 7);
        assert_eq!(record.total_distance, 19.75);
    }

    #[test]
    fn test_record_wire_format() {
        let record = NewRecord {
            name: "Lee".to_string(),
            gender: Gender::Male,
            bike: 1.0,
            treadmill: 2.0,
            rowing: 3.0,
            photo: "uploads/b.png".to_string(),
        }
        .into_record(1, "2025-03-01T09:30:00Z".parse().unwrap());

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["gender"], "male");
        assert_eq!(json["totalDistance"], 6.0);
        assert_eq!(json["submittedAt"], "2025-03-01T09:30:00Z");
    }
}
