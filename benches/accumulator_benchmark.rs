use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jass_core::accumulator::AccumulatorTable;
use jass_core::core::types::DocId;

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("accumulator_add");
    for capacity in [1_000usize, 100_000, 1_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &capacity| {
            let mut table = AccumulatorTable::new(capacity, None);
            b.iter(|| {
                for d in 0..1000u32 {
                    table.add(DocId::new(d % capacity as u32), black_box(1));
                }
                table.reset();
            });
        });
    }
    group.finish();
}

fn bench_reset(c: &mut Criterion) {
    let mut group = c.benchmark_group("accumulator_reset");
    for capacity in [10_000usize, 1_000_000, 10_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &capacity| {
            let mut table = AccumulatorTable::new(capacity, None);
            for d in 0..capacity as u32 {
                table.add(DocId::new(d), 1);
            }
            b.iter(|| {
                table.reset();
                black_box(table.add(DocId::new(0), 1));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_add, bench_reset);
criterion_main!(benches);
