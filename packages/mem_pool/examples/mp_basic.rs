//! Demonstrates instance and singleton pools of reusable buffers.
//!
//! The subscriber prints debug-level pool events, including the clamped pre-allocation and the
//! rejected second singleton creation.

use std::{iter, thread};

use mem_pool::{InstancePool, PoolConfig, PoolRegistry, ReleasePolicy};
use timing::time_scope;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== InstancePool: buffers shared between threads ===");

    time_scope!("instance pool demo");

    let pool = InstancePool::builder()
        .pre_allocate(2)
        .max_allocation(4)
        .build(|| Vec::<u8>::with_capacity(1024));

    let workers = (0..4_u8)
        .map(|worker| {
            let pool = pool.clone();

            thread::spawn(move || {
                let Some(buffer) = pool.acquire(ReleasePolicy::Auto) else {
                    println!("worker {worker}: pool exhausted");
                    return;
                };

                let len = buffer
                    .with_mut(|b| {
                        b.extend(iter::repeat_n(worker, usize::from(worker) + 1));
                        b.len()
                    })
                    .expect("handle was just acquired");

                println!("worker {worker}: filled {len} bytes");
            })
        })
        .collect::<Vec<_>>();

    for worker in workers {
        worker.join().expect("worker thread panicked");
    }

    println!(
        "allocated: {}, free: {}, used: {}",
        pool.allocated_count(),
        pool.free_count(),
        pool.used_count()
    );

    println!("=== SingletonPool: one pool per type ===");

    let registry = PoolRegistry::global();

    registry
        .create(PoolConfig::bounded(8, 2), String::new)
        .expect("first creation succeeds");

    // Logged and rejected, the first pool stays in place.
    if let Err(e) = registry.create(PoolConfig::bounded(1, 1), String::new) {
        println!("second creation failed: {e}");
    }

    let strings = registry.get::<String>().expect("pool was created above");
    println!("pre-allocation was clamped to {}", strings.allocated_count());

    let greeting = strings
        .acquire(ReleasePolicy::Manual)
        .expect("pool has free elements");
    greeting
        .with_mut(|s| s.push_str("hello"))
        .expect("handle was just acquired");

    println!("used before manual release: {}", strings.used_count());
    strings.release(greeting.key());
    println!("used after manual release: {}", strings.used_count());
}
