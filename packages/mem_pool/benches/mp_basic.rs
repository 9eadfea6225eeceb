//! Basic benchmarks for the `mem_pool` package.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use mem_pool::{InstanceRegistry, PoolConfig, PoolRegistry, RawPool, ReleasePolicy};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

const BUFFER_CAPACITY: usize = 4096;

fn new_buffer() -> Vec<u8> {
    Vec::with_capacity(BUFFER_CAPACITY)
}

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("mp_create");

    group.bench_function("empty", |b| {
        b.iter(|| {
            drop(black_box(RawPool::new(PoolConfig::unbounded(0), new_buffer)));
        });
    });

    group.bench_function("pre_allocate_1000", |b| {
        b.iter(|| {
            drop(black_box(RawPool::new(
                PoolConfig::bounded(1_000, 1_000),
                new_buffer,
            )));
        });
    });

    group.finish();

    let mut group = c.benchmark_group("mp_cycle");

    group.bench_function("raw", |b| {
        let mut pool = RawPool::new(PoolConfig::bounded(1, 1), new_buffer);

        b.iter(|| {
            let key = pool.acquire().expect("one free element is always available");
            pool.get_mut(key)
                .expect("key was just acquired")
                .push(black_box(1));
            pool.release(key)
        });
    });

    group.bench_function("instance", |b| {
        let registry = InstanceRegistry::<Vec<u8>>::new();
        let pool = registry.create(PoolConfig::bounded(1, 1), new_buffer);

        b.iter(|| {
            let handle = pool
                .acquire(ReleasePolicy::Auto)
                .expect("one free element is always available");
            handle.with_mut(|buffer| buffer.push(black_box(1)))
        });
    });

    group.bench_function("singleton", |b| {
        let registry = PoolRegistry::new();
        registry
            .create(PoolConfig::bounded(1, 1), new_buffer)
            .expect("fresh registry has no pool for this type");
        let pool = registry
            .get::<Vec<u8>>()
            .expect("pool was just created");

        b.iter(|| {
            let handle = pool
                .acquire(ReleasePolicy::Auto)
                .expect("one free element is always available");
            handle.with_mut(|buffer| buffer.push(black_box(1)))
        });
    });

    group.finish();

    let mut group = c.benchmark_group("mp_grow");

    group.bench_function("unbounded_1000", |b| {
        b.iter(|| {
            let mut pool = RawPool::new(PoolConfig::unbounded(0), new_buffer);

            for _ in 0..1_000 {
                black_box(pool.acquire());
            }

            pool
        });
    });

    group.finish();
}
