//! Relational adapter benchmarks over the in-process driver.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tabula_bench::generate_widgets;
use tabula_core::{MemoryDatabase, RelationalUnitOfWork, Table, UnitOfWork};
use tabula_testkit::{post, Post, Widget};

/// Benchmark staging inserts and submitting them.
fn bench_insert_and_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("relational_insert_and_save");

    for count in [10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let widgets = generate_widgets(count);

            b.iter(|| {
                let mut uow = RelationalUnitOfWork::new(MemoryDatabase::created().connect());
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

/// Benchmark save with a commit observer attached.
fn bench_observed_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("relational_observed_save");

    for count in [10, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let widgets = generate_widgets(count);

            b.iter(|| {
                let mut uow = RelationalUnitOfWork::new(MemoryDatabase::created().connect());
                uow.on_commit(|_, changes| {
                    black_box(changes.counts());
                });
                {
                    let mut table = uow.table::<Widget>().unwrap();
                    for widget in &widgets {
                        table.add(widget.clone()).unwrap();
                    }
                }
                black_box(uow.save().unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark soft deletion through the decorator.
fn bench_soft_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("relational_soft_delete");

    for count in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let posts: Vec<Post> = (0..count as u32).map(|id| post(id, "title")).collect();

            b.iter(|| {
                let database = MemoryDatabase::created();
                database.seed(posts.clone()).unwrap();
                let mut uow = RelationalUnitOfWork::new(database.connect());
                let removed = uow
                    .table::<Post>()
                    .unwrap()
                    .remove_where(&|p| p.id % 2 == 0)
                    .unwrap();
                black_box(removed);
                black_box(uow.save().unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_and_save,
    bench_observed_save,
    bench_soft_delete
);
criterion_main!(benches);
