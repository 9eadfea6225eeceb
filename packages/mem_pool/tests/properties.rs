//! Integration tests for the `mem_pool` package.
//!
//! These verify the pool guarantees that hold across the public API: sizing and accounting,
//! release semantics, reset on reuse, concurrent exhaustion and the lifetime rules of the
//! instance and singleton variants.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mem_pool::{
    Error, InstanceRegistry, PoolConfig, PoolRegistry, RawPool, ReleasePolicy, Reset,
};
use testing::{run_concurrently, with_watchdog};

fn assert_accounting<T: Reset>(pool: &RawPool<T>) {
    assert_eq!(
        pool.allocated_count(),
        pool.free_count() + pool.used_count()
    );

    if pool.max_count() != 0 {
        assert!(pool.allocated_count() <= pool.max_count());
    }
}

#[test]
fn creation_pre_allocates_free_elements() {
    for (pre, max) in [(0, 1), (1, 1), (3, 10), (10, 10)] {
        let pool = RawPool::new(PoolConfig::bounded(pre, max), String::new);

        assert_eq!(pool.allocated_count(), pre);
        assert_eq!(pool.free_count(), pre);
        assert_eq!(pool.used_count(), 0);
        assert_eq!(pool.pre_allocated_count(), pre);
    }
}

#[test]
fn accounting_holds_after_every_operation() {
    let mut pool = RawPool::new(PoolConfig::bounded(2, 5), Vec::<u8>::new);
    let mut held = Vec::new();

    for step in 0..40_usize {
        if step % 3 == 2 {
            if let Some(key) = held.pop() {
                assert!(pool.release(key));
            }
        } else if let Some(key) = pool.acquire() {
            held.push(key);
        }

        assert_accounting(&pool);
    }

    assert_eq!(pool.allocated_count(), 5);
}

#[test]
fn releasing_unknown_elements_changes_nothing() {
    let mut pool = RawPool::new(PoolConfig::bounded(1, 2), String::new);
    let mut other = RawPool::new(PoolConfig::bounded(1, 2), String::new);

    let key = pool.acquire().unwrap();
    let foreign = other.acquire().unwrap();

    assert!(!pool.release(foreign));
    assert_eq!(pool.used_count(), 1);

    assert!(pool.release(key));
    assert!(!pool.release(key));

    assert_eq!(pool.used_count(), 0);
    assert_eq!(pool.free_count(), 1);
    assert_accounting(&pool);
}

#[test]
fn concurrent_acquires_respect_the_cap() {
    with_watchdog(|| {
        for _ in 0..50 {
            let registry = InstanceRegistry::<String>::new();
            let pool = registry.create(PoolConfig::bounded(0, 2), String::new);

            let results = run_concurrently(3, {
                let pool = pool.clone();
                move |_| pool.acquire_key()
            });

            let succeeded = results.iter().filter(|key| key.is_some()).count();

            assert_eq!(succeeded, 2);
            assert_eq!(pool.allocated_count(), 2);
            assert_eq!(pool.used_count(), 2);
        }
    });
}

#[test]
fn concurrent_churn_keeps_accounting_consistent() {
    with_watchdog(|| {
        let registry = InstanceRegistry::<Vec<usize>>::new();
        let pool = registry.create(PoolConfig::bounded(2, 4), Vec::new);
        let acquired = Arc::new(AtomicUsize::new(0));

        run_concurrently(8, {
            let pool = pool.clone();
            let acquired = Arc::clone(&acquired);

            move |thread_index| {
                for _ in 0..500 {
                    let Some(handle) = pool.acquire(ReleasePolicy::Auto) else {
                        continue;
                    };

                    acquired.fetch_add(1, Ordering::Relaxed);

                    handle
                        .with_mut(|v| {
                            // A freshly acquired element must always be in its reset state.
                            assert!(v.is_empty());
                            v.push(thread_index);
                        })
                        .unwrap();
                }
            }
        });

        assert!(acquired.load(Ordering::Relaxed) > 0);
        assert_eq!(pool.used_count(), 0);
        assert_eq!(pool.free_count(), pool.allocated_count());
        assert!(pool.allocated_count() <= 4);
    });
}

#[test]
fn reuse_observes_reset_state() {
    let registry = InstanceRegistry::<String>::new();
    let pool = registry.create(PoolConfig::bounded(1, 1), String::new);

    let handle = pool.acquire(ReleasePolicy::Auto).unwrap();
    handle.with_mut(|s| s.push_str("left over")).unwrap();
    drop(handle);

    let handle = pool.acquire(ReleasePolicy::Auto).unwrap();
    assert_eq!(handle.with(Clone::clone).unwrap(), "");
}

#[test]
fn custom_reset_runs_on_release() {
    #[derive(Default)]
    struct Connection {
        in_transaction: bool,
        resets: usize,
    }

    impl Reset for Connection {
        fn reset(&mut self) {
            self.in_transaction = false;
            self.resets += 1;
        }
    }

    let registry = InstanceRegistry::<Connection>::new();
    let pool = registry.create(PoolConfig::bounded(1, 1), Connection::default);

    let conn = pool.acquire(ReleasePolicy::Auto).unwrap();
    conn.with_mut(|c| c.in_transaction = true).unwrap();
    drop(conn);

    let conn = pool.acquire(ReleasePolicy::Auto).unwrap();
    let (in_transaction, resets) = conn.with(|c| (c.in_transaction, c.resets)).unwrap();

    assert!(!in_transaction);
    assert_eq!(resets, 1);
}

#[test]
fn instance_pool_lives_through_outstanding_handles() {
    let registry = InstanceRegistry::<Vec<u8>>::new();
    let pool = registry.create(PoolConfig::bounded(1, 1), Vec::new);
    let pool_id = pool.id();

    let handle = pool.acquire(ReleasePolicy::Auto).unwrap();
    drop(pool);

    // Creating another pool prunes unreferenced pools, but this one is still referenced.
    let _other = registry.create(PoolConfig::unbounded(0), Vec::new);
    assert!(registry.contains(pool_id));

    handle.with_mut(|v| v.push(1)).unwrap();
    assert_eq!(handle.pool().used_count(), 1);

    drop(handle);

    let _third = registry.create(PoolConfig::unbounded(0), Vec::new);
    assert!(!registry.contains(pool_id));
}

#[test]
fn second_singleton_creation_leaves_pool_unchanged() {
    let registry = PoolRegistry::new();

    registry
        .create(PoolConfig::bounded(2, 3), || String::from("first"))
        .unwrap();

    let pool = registry.get::<String>().unwrap();
    let held = pool.acquire(ReleasePolicy::Auto).unwrap();

    let result = registry.create(PoolConfig::bounded(0, 100), || String::from("second"));
    assert!(matches!(result, Err(Error::AlreadyCreated { .. })));

    assert_eq!(pool.allocated_count(), 2);
    assert_eq!(pool.used_count(), 1);
    assert_eq!(pool.max_count(), 3);
    assert_eq!(held.with(Clone::clone).unwrap(), "first");
}

// The two variants treat pool lifetime differently: an instance handle keeps its pool alive,
// while a singleton handle does not. These two tests pin down that asymmetry.

#[test]
fn instance_handle_keeps_pool_alive() {
    let registry = InstanceRegistry::<String>::new();
    let pool = registry.create(PoolConfig::bounded(1, 1), String::new);
    let handle = pool.acquire(ReleasePolicy::Auto).unwrap();

    drop(pool);
    assert_eq!(registry.prune(), 0);

    assert!(handle.with(String::len).is_ok());
}

#[test]
fn singleton_handle_does_not_keep_pool_alive() {
    let registry = PoolRegistry::new();
    registry
        .create(PoolConfig::bounded(1, 1), String::new)
        .unwrap();

    let handle = registry
        .get::<String>()
        .unwrap()
        .acquire(ReleasePolicy::Auto)
        .unwrap();

    assert!(registry.destroy::<String>());

    assert!(matches!(handle.with(String::len), Err(Error::PoolDestroyed)));
    drop(handle);
}

#[test]
fn singleton_rejects_unbounded_but_instance_accepts_it() {
    let registry = PoolRegistry::new();
    assert!(matches!(
        registry.create(PoolConfig::unbounded(0), String::new),
        Err(Error::InvalidConfig { .. })
    ));

    let instances = InstanceRegistry::<String>::new();
    let pool = instances.create(PoolConfig::unbounded(0), String::new);

    let handles = (0..100)
        .map(|_| pool.acquire(ReleasePolicy::Auto).unwrap())
        .collect::<Vec<_>>();

    assert_eq!(pool.allocated_count(), 100);
    drop(handles);
    assert_eq!(pool.free_count(), 100);
}

#[test]
fn every_element_is_dropped_once_with_its_pool() {
    static DROPS: AtomicUsize = AtomicUsize::new(0);

    struct Tracked;

    impl Reset for Tracked {
        fn reset(&mut self) {}
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            DROPS.fetch_add(1, Ordering::Relaxed);
        }
    }

    let registry = InstanceRegistry::<Tracked>::new();
    let pool = registry.create(PoolConfig::bounded(3, 5), || Tracked);

    let _a = pool.acquire(ReleasePolicy::Manual).unwrap();
    let _b = pool.acquire(ReleasePolicy::Auto).unwrap();
    let _c = pool.acquire(ReleasePolicy::Auto).unwrap();
    let _d = pool.acquire(ReleasePolicy::Auto).unwrap();

    drop(pool);
    drop((_a, _b, _c, _d));
    assert_eq!(DROPS.load(Ordering::Relaxed), 0);

    assert_eq!(registry.prune(), 1);
    assert_eq!(DROPS.load(Ordering::Relaxed), 4);
}
