// Criterion benchmarks for echomesh-cluster
//
// Run benchmarks with:
//   cargo bench -p echomesh-cluster

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use echomesh_cluster::{RoutingPool, Worker, WorkerHandle, WorkerId};

fn handles(count: u64) -> Vec<WorkerHandle> {
    // Selection never delivers, so the worker halves can be dropped.
    (0..count)
        .map(|id| {
            let (handle, _worker) = Worker::channel(WorkerId(id));
            handle
        })
        .collect()
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("select");

    for pool_size in [2u64, 5, 10, 20].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(pool_size),
            pool_size,
            |b, &count| {
                let pool = RoutingPool::new();
                for handle in handles(count) {
                    pool.add(handle);
                }
                b.iter(|| black_box(&pool).select());
            },
        );
    }

    group.finish();
}

fn bench_add_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_remove");

    group.bench_function("add", |b| {
        b.iter(|| {
            let pool = RoutingPool::new();
            for handle in handles(10) {
                pool.add(black_box(handle));
            }
        });
    });

    group.bench_function("remove_absent", |b| {
        let pool = RoutingPool::new();
        for handle in handles(10) {
            pool.add(handle);
        }
        b.iter(|| pool.remove(black_box(WorkerId(9999))));
    });

    group.finish();
}

fn bench_concurrent_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_select");

    group.bench_function("4_threads", |b| {
        let pool = std::sync::Arc::new(RoutingPool::new());
        for handle in handles(3) {
            pool.add(handle);
        }

        b.iter(|| {
            let threads: Vec<_> = (0..4)
                .map(|_| {
                    let pool = std::sync::Arc::clone(&pool);
                    std::thread::spawn(move || {
                        for _ in 0..10 {
                            black_box(pool.select());
                        }
                    })
                })
                .collect();

            for thread in threads {
                thread.join().unwrap();
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_select, bench_add_remove, bench_concurrent_select);
criterion_main!(benches);
