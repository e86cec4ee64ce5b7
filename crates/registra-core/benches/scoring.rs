use criterion::{black_box, criterion_group, criterion_main, Criterion};
use uuid::Uuid;

use registra_core::scheme::{plan_configuration, SchemeEntry, DEFAULT_SCHEME};
use registra_core::score::{ScoreEntry, WeightedScoreSet};

fn seven_slot_set() -> WeightedScoreSet {
    let values = [15.0, 14.0, 18.0, 16.0, 17.0, 19.0, 15.0];
    WeightedScoreSet::new(
        DEFAULT_SCHEME
            .iter()
            .zip(values.iter())
            .map(|(slot, v)| ScoreEntry {
                label: slot.label.to_string(),
                weight_percent: slot.weight_percent,
                value: *v,
            })
            .collect(),
    )
}

fn bench_weighted_sum(c: &mut Criterion) {
    let sets: Vec<WeightedScoreSet> = (0..1_000).map(|_| seven_slot_set()).collect();
    c.bench_function("weighted_sum_1000_enrollments", |b| {
        b.iter(|| {
            let total: f64 = sets.iter().map(|s| black_box(s).weighted_sum()).sum();
            black_box(total)
        })
    });

    c.bench_function("rounded_grade", |b| {
        let set = seven_slot_set();
        b.iter(|| black_box(&set).rounded())
    });
}

fn bench_plan_configuration(c: &mut Criterion) {
    let course = Uuid::new_v4();
    let entries: Vec<SchemeEntry> = DEFAULT_SCHEME
        .iter()
        .enumerate()
        .map(|(i, slot)| SchemeEntry {
            id: None,
            label: slot.label.to_string(),
            weight_percent: slot.weight_percent,
            display_order: i as u32 + 1,
            active: true,
        })
        .collect();

    c.bench_function("plan_first_time_configuration", |b| {
        b.iter(|| plan_configuration(black_box(course), &[], black_box(&entries)).unwrap())
    });
}

criterion_group!(benches, bench_weighted_sum, bench_plan_configuration);
criterion_main!(benches);
