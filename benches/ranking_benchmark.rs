// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion};
use distance_leaderboard::models::{Gender, NewRecord, Record};
use distance_leaderboard::services::ranking;
use std::hint::black_box;

const PARTICIPANTS: u64 = 5_000;

fn make_records(count: u64) -> Vec<Record> {
    let now = Utc::now();
    (1..=count)
        .map(|id| {
            // Spread totals with plenty of ties to exercise the stable sort
            let base = (id * 7919 % 500) as f64;
            NewRecord {
                name: format!("Participant {}", id % 1_000),
                gender: if id % 3 == 0 {
                    Gender::Female
                } else {
                    Gender::Male
                },
                bike: base,
                treadmill: base / 2.0,
                rowing: base / 4.0,
                photo: format!("uploads/{}.jpg", id),
            }
            .into_record(id, now)
        })
        .collect()
}

fn benchmark_ranking(c: &mut Criterion) {
    let records = make_records(PARTICIPANTS);

    let mut group = c.benchmark_group("leaderboard");

    group.bench_function("rank_male_partition", |b| {
        b.iter(|| ranking::rank(black_box(&records), Gender::Male))
    });

    group.bench_function("public_view_both_partitions", |b| {
        b.iter(|| {
            let male = ranking::rank(black_box(&records), Gender::Male);
            let female = ranking::rank(black_box(&records), Gender::Female);
            (ranking::public_view(&male), ranking::public_view(&female))
        })
    });

    group.bench_function("my_record_lookup", |b| {
        b.iter(|| ranking::my_record(black_box(&records), black_box("Participant 42")))
    });

    group.bench_function("statistics", |b| {
        b.iter(|| ranking::statistics(black_box(&records)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_ranking);
criterion_main!(benches);
