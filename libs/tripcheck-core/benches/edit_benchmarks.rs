use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;
use tripcheck_core::test_utils::{create_test_database_and_connect, sample_stored_trip};
use tripcheck_core::{
    add_group, add_task, decode_trip, encode_trip, update_task_field, validation_issues,
    SequentialIds, TaskField, Trip,
};

/// A trip with `days` groups of ten tasks each
fn large_trip(days: usize) -> Trip {
    let ids = SequentialIds::new("b");
    let mut trip = Trip::blank(&ids);
    trip.name = "Benchmark tour".to_string();
    trip.date = "2026-03-01".to_string();
    for _ in 1..days {
        trip = add_group(&trip, &ids);
    }
    let group_ids: Vec<String> = trip.groups.iter().map(|g| g.id.clone()).collect();
    for group_id in &group_ids {
        for _ in 1..10 {
            trip = add_task(&trip, group_id, &ids);
        }
    }
    trip
}

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation_issues");

    for days in [1, 10, 50] {
        let trip = large_trip(days);
        group.throughput(Throughput::Elements(trip.task_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(days), &trip, |b, trip| {
            b.iter(|| validation_issues(black_box(trip)));
        });
    }

    group.finish();
}

fn bench_edits(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_edits");

    for days in [1, 10, 50] {
        let trip = large_trip(days);
        let last_group = trip.groups[days - 1].id.clone();
        let last_task = trip.groups[days - 1].tasks[0].id.clone();
        let ids = SequentialIds::new("n");

        group.bench_with_input(BenchmarkId::new("add_task", days), &trip, |b, trip| {
            b.iter(|| add_task(black_box(trip), &last_group, &ids));
        });
        group.bench_with_input(
            BenchmarkId::new("update_task_field", days),
            &trip,
            |b, trip| {
                b.iter(|| {
                    update_task_field(
                        black_box(trip),
                        &last_task,
                        TaskField::Name("Headcount".to_string()),
                    )
                });
            },
        );
    }

    group.finish();
}

fn bench_wire(c: &mut Criterion) {
    let trip = large_trip(10);
    let encoded = encode_trip(&trip).unwrap();

    c.bench_function("encode_trip_10_days", |b| {
        b.iter(|| encode_trip(black_box(&trip)).unwrap());
    });
    c.bench_function("decode_trip_10_days", |b| {
        b.iter(|| decode_trip(black_box(&encoded), &SequentialIds::default()).unwrap());
    });
}

fn bench_save_trip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (db, _dir) = rt.block_on(create_test_database_and_connect()).unwrap();
    let stored = sample_stored_trip();

    c.bench_function("save_trip", |b| {
        b.iter(|| rt.block_on(db.save_trip(black_box(&stored))).unwrap());
    });
}

criterion_group!(
    benches,
    bench_validation,
    bench_edits,
    bench_wire,
    bench_save_trip
);
criterion_main!(benches);
