//! Allocation-path benchmarks
//!
//! Exercises the routing fast path, block recycling, the escalation path
//! and realloc against small firmware-sized families.

use blockpool::{MemoryConfig, PoolFamily};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn bench_alloc_free_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("alloc_free");
    group.throughput(Throughput::Elements(1));

    group.bench_function("fixed_smallest_class", |b| {
        let family = PoolFamily::new(
            MemoryConfig::fixed().with_max_pools(4).with_blocks_per_pool(64),
        )
        .unwrap();

        b.iter(|| {
            let p = family.alloc(black_box(8)).unwrap();
            unsafe { family.free(p.as_ptr()) };
        });
    });

    group.bench_function("dynamic_smallest_class", |b| {
        let family = PoolFamily::new(
            MemoryConfig::default().with_max_pools(4).with_blocks_per_pool(64),
        )
        .unwrap();

        b.iter(|| {
            let p = family.alloc(black_box(8)).unwrap();
            unsafe { family.free(p.as_ptr()) };
        });
    });

    group.bench_function("on_demand_warm_class", |b| {
        let family = PoolFamily::new(
            MemoryConfig::on_demand().with_max_pools(4).with_blocks_per_pool(64),
        )
        .unwrap();
        // Warm the class so iterations measure lookup, not creation.
        let warm = family.alloc(300).unwrap();
        unsafe { family.free(warm.as_ptr()) };

        b.iter(|| {
            let p = family.alloc(black_box(300)).unwrap();
            unsafe { family.free(p.as_ptr()) };
        });
    });

    group.finish();
}

fn bench_escalation(c: &mut Criterion) {
    let mut group = c.benchmark_group("escalation");
    group.throughput(Throughput::Elements(1));

    group.bench_function("worst_case_walk", |b| {
        let family = PoolFamily::new(
            MemoryConfig::fixed().with_max_pools(8).with_blocks_per_pool(1),
        )
        .unwrap();
        // Exhaust everything below the largest class so each allocation
        // walks the whole registry.
        let held: Vec<_> = (0..7).map(|_| family.alloc(8).unwrap()).collect();

        b.iter(|| {
            let p = family.alloc(black_box(8)).unwrap();
            unsafe { family.free(p.as_ptr()) };
        });

        for p in held {
            unsafe { family.free(p.as_ptr()) };
        }
    });

    group.finish();
}

fn bench_realloc(c: &mut Criterion) {
    let mut group = c.benchmark_group("realloc");
    group.throughput(Throughput::Elements(1));

    group.bench_function("grow_one_class", |b| {
        let family = PoolFamily::new(
            MemoryConfig::fixed().with_max_pools(4).with_blocks_per_pool(64),
        )
        .unwrap();

        b.iter(|| {
            let p = family.alloc(black_box(8)).unwrap();
            let q = unsafe { family.realloc(p.as_ptr(), black_box(20)) }.unwrap();
            unsafe { family.free(q.as_ptr()) };
        });
    });

    group.finish();
}

criterion_group!(benches, bench_alloc_free_cycle, bench_escalation, bench_realloc);
criterion_main!(benches);
