//! In-memory backend benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tabula_bench::{generate_widgets, generate_widgets_from};
use tabula_core::{MemoryStore, MemoryUnitOfWork, Table, UnitOfWork};
use tabula_testkit::{widget, Widget};

/// Benchmark staging inserts and saving them.
fn bench_add_and_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_add_and_save");

    for count in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let widgets = generate_widgets(count);

            b.iter(|| {
                let mut uow = MemoryUnitOfWork::with_store(MemoryStore::new());
                {
                    let mut table = uow.table::<Widget>().unwrap();
                    for widget in &widgets {
                        table.add(black_box(widget.clone())).unwrap();
                    }
                }
                black_box(uow.save().unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark updates located by linear scan.
fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_update");

    for count in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let mut uow = MemoryUnitOfWork::with_store(MemoryStore::new());
            uow.populate_table(generate_widgets(count)).unwrap();
            let mut table = uow.table::<Widget>().unwrap();
            let last = count as u32 - 1;

            b.iter(|| {
                table.update(black_box(widget(last, "renamed"))).unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark a filtered, ordered query.
fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_query");

    for count in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let mut uow = MemoryUnitOfWork::with_store(MemoryStore::new());
            uow.populate_table(generate_widgets(count)).unwrap();
            let table = uow.table::<Widget>().unwrap();

            b.iter(|| {
                let ids: Vec<u32> = table
                    .query()
                    .unwrap()
                    .filter_by(|w| w.id % 2 == 0)
                    .order_by_desc(|w| w.id)
                    .select(|w| w.id)
                    .collect();
                black_box(ids);
            });
        });
    }

    group.finish();
}

/// Benchmark reseeding a table from a populated store after save.
fn bench_reseed(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_reseed");

    for count in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let mut uow = MemoryUnitOfWork::with_store(MemoryStore::new());
            uow.populate_table(generate_widgets(count)).unwrap();
            let mut next = count;

            b.iter(|| {
                let fresh = generate_widgets_from(next, 1);
                next += 1;
                {
                    let mut table = uow.table::<Widget>().unwrap();
                    for widget in fresh {
                        table.add(widget).unwrap();
                    }
                }
                black_box(uow.save().unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_add_and_save,
    bench_update,
    bench_query,
    bench_reseed
);
criterion_main!(benches);
