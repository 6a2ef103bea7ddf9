use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pivrot::{
    engine::OrderEngine,
    transform::{PivotRotation, SequenceTransform},
};

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("pivot_rotation");
    for n in [100usize, 1_000, 10_000] {
        let input: Vec<usize> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| PivotRotation.apply(black_box(input)))
        });
    }
    group.finish();
}

fn bench_record(c: &mut Criterion) {
    let engine = OrderEngine::new();
    let mut group = c.benchmark_group("record");
    for n in [1_000usize, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| engine.record(black_box(n)))
        });
    }
    group.finish();
}

fn bench_check_order(c: &mut Criterion) {
    let engine = OrderEngine::new();
    // orders 1680 and 1584
    let records: Vec<_> = [54usize, 56]
        .into_iter()
        .filter_map(|n| engine.record(n).ok())
        .collect();
    c.bench_function("check_order", |b| {
        b.iter(|| {
            for record in &records {
                let _ = black_box(engine.check_order(record));
            }
        })
    });
}

criterion_group!(benches, bench_transform, bench_record, bench_check_order);
criterion_main!(benches);
