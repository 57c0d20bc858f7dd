// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ranking and statistics over a store snapshot.
//!
//! Everything here is pure: callers pass the records they read from the
//! store and get presentation data back.

use crate::models::{Gender, PublicEntry, RankedRecord, Record, Statistics};
use crate::time_utils::format_date;

/// Placeholder shown instead of measurements on the public board.
pub const MASK: &str = "***";

/// Rank one gender partition by total distance, highest first.
///
/// Ties keep submission order (stable sort, no secondary key).
pub fn rank(records: &[Record], gender: Gender) -> Vec<RankedRecord> {
    let mut partition: Vec<&Record> = records.iter().filter(|r| r.gender == gender).collect();
    partition.sort_by(|a, b| b.total_distance.total_cmp(&a.total_distance));

    partition
        .into_iter()
        .enumerate()
        .map(|(i, record)| RankedRecord {
            rank: i + 1,
            record: record.clone(),
        })
        .collect()
}

/// Redact a ranked list for public display.
pub fn public_view(ranked: &[RankedRecord]) -> Vec<PublicEntry> {
    ranked
        .iter()
        .map(|entry| PublicEntry {
            rank: entry.rank,
            name: entry.record.name.clone(),
            gender: entry.record.gender,
            bike: MASK,
            treadmill: MASK,
            rowing: MASK,
            total_distance: MASK,
            submitted_date: format_date(entry.record.submitted_at),
        })
        .collect()
}

/// Unredacted leader of a ranked list, if any.
pub fn first_place(ranked: &[RankedRecord]) -> Option<RankedRecord> {
    ranked.first().cloned()
}

/// Most recent record submitted under `name`, ranked within its gender.
///
/// "Most recent" is the last match in storage order.
pub fn my_record(records: &[Record], name: &str) -> Option<RankedRecord> {
    let name = name.trim();
    let latest = records.iter().rev().find(|r| r.name == name)?;

    rank(records, latest.gender)
        .into_iter()
        .find(|entry| entry.record.id == latest.id)
}

/// Participant counts and total-distance aggregates.
pub fn statistics(records: &[Record]) -> Statistics {
    let count = |gender: Gender| records.iter().filter(|r| r.gender == gender).count();

    let (sum, max) = records
        .iter()
        .fold((0.0_f64, 0.0_f64), |(sum, max), r| {
            (sum + r.total_distance, max.max(r.total_distance))
        });
    let average = if records.is_empty() {
        0.0
    } else {
        sum / records.len() as f64
    };

    Statistics {
        total_participants: records.len(),
        male_count: count(Gender::Male),
        female_count: count(Gender::Female),
        average_distance: round2(average),
        max_distance: round2(max),
    }
}

/// Round to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewRecord;
    use chrono::{DateTime, Utc};

    fn record(id: u64, name: &str, gender: Gender, total: f64) -> Record {
        let submitted_at: DateTime<Utc> = "2025-03-01T09:30:00Z".parse().unwrap();
        NewRecord {
            name: name.to_string(),
            gender,
            bike: total / 2.0,
            treadmill: total / 4.0,
            rowing: total / 4.0,
            photo: format!("uploads/{}.jpg", id),
        }
        .into_record(id, submitted_at)
    }

    fn sample() -> Vec<Record> {
        vec![
            record(1, "A", Gender::Male, 10.0),
            record(2, "B", Gender::Male, 30.0),
            record(3, "C", Gender::Female, 20.0),
        ]
    }

    #[test]
    fn test_rank_by_gender() {
        let records = sample();

        let male = rank(&records, Gender::Male);
        let female = rank(&records, Gender::Female);

        let male: Vec<(usize, &str)> = male
            .iter()
            .map(|e| (e.rank, e.record.name.as_str()))
            .collect();
        assert_eq!(male, vec![(1, "B"), (2, "A")]);
        assert_eq!(female.len(), 1);
        assert_eq!(female[0].rank, 1);
        assert_eq!(female[0].record.name, "C");
    }

    #[test]
    fn test_rank_ties_keep_submission_order() {
        let records = vec![
            record(1, "first", Gender::Female, 15.0),
            record(2, "second", Gender::Female, 15.0),
            record(3, "third", Gender::Female, 15.0),
        ];

        let names: Vec<String> = rank(&records, Gender::Female)
            .into_iter()
            .map(|e| e.record.name)
            .collect();

        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_public_view_masks_measurements() {
        let records = sample();
        let view = public_view(&rank(&records, Gender::Male));

        assert_eq!(view.len(), 2);
        for entry in &view {
            assert_eq!(entry.bike, MASK);
            assert_eq!(entry.treadmill, MASK);
            assert_eq!(entry.rowing, MASK);
            assert_eq!(entry.total_distance, MASK);
            assert_eq!(entry.submitted_date, "2025-03-01");
        }
        assert_eq!(view[0].name, "B");
        assert_eq!(view[0].rank, 1);
    }

    #[test]
    fn test_first_place_is_unredacted() {
        let records = sample();

        let leader = first_place(&rank(&records, Gender::Male)).unwrap();

        assert_eq!(leader.record.name, "B");
        assert_eq!(leader.record.bike, 15.0);
        assert_eq!(leader.record.treadmill, 7.5);
        assert_eq!(leader.record.rowing, 7.5);
        assert_eq!(leader.record.total_distance, 30.0);
    }

    #[test]
    fn test_first_place_empty_partition() {
        let records = vec![record(1, "A", Gender::Male, 10.0)];
        assert!(first_place(&rank(&records, Gender::Female)).is_none());
    }

    #[test]
    fn test_my_record_uses_latest_submission() {
        let records = vec![
            record(1, "A", Gender::Male, 50.0),
            record(2, "B", Gender::Male, 30.0),
            record(3, "A", Gender::Male, 10.0),
        ];

        let mine = my_record(&records, " A ").unwrap();

        assert_eq!(mine.record.id, 3);
        assert_eq!(mine.rank, 3);
    }

    #[test]
    fn test_my_record_not_found() {
        assert!(my_record(&sample(), "nobody").is_none());
        assert!(my_record(&[], "A").is_none());
    }

    #[test]
    fn test_statistics() {
        let stats = statistics(&sample());

        assert_eq!(stats.total_participants, 3);
        assert_eq!(stats.male_count, 2);
        assert_eq!(stats.female_count, 1);
        assert_eq!(stats.average_distance, 20.0);
        assert_eq!(stats.max_distance, 30.0);
    }

    #[test]
    fn test_statistics_empty() {
        let stats = statistics(&[]);

        assert_eq!(stats.total_participants, 0);
        assert_eq!(stats.male_count, 0);
        assert_eq!(stats.female_count, 0);
        assert_eq!(stats.average_distance, 0.0);
        assert_eq!(stats.max_distance, 0.0);
    }

    #[test]
    fn test_statistics_rounds_to_two_places() {
        let records = vec![
            record(1, "A", Gender::Male, 10.0),
            record(2, "B", Gender::Female, 10.0),
            record(3, "C", Gender::Female, 11.0),
        ];

        let stats = statistics(&records);

        assert_eq!(stats.average_distance, 10.33);
        assert_eq!(stats.max_distance, 11.0);
    }
}
