use std::fmt;
use std::sync::{Arc, Weak};

use crate::shared::SharedPool;
use crate::{Error, ItemKey, ReleasePolicy, Reset, Result};

/// A handle to an element checked out from a [`SingletonPool`][crate::SingletonPool].
///
/// Unlike [`Pooled`][crate::Pooled], this handle does not keep its pool alive. The pool belongs
/// to its [`PoolRegistry`][crate::PoolRegistry] and may be torn down while handles are still
/// outstanding. Once that has happened:
///
/// * [`with()`][Self::with] and [`with_mut()`][Self::with_mut] return
///   [`Error::PoolDestroyed`].
/// * Dropping the handle does nothing, even with [`ReleasePolicy::Auto`].
///
/// Clones refer to the same checkout and the element is released when the last one is dropped.
///
/// # Example
///
/// ```
/// use mem_pool::{Error, PoolConfig, PoolRegistry, ReleasePolicy};
///
/// let registry = PoolRegistry::new();
/// registry.create(PoolConfig::bounded(1, 1), String::new).unwrap();
///
/// let pool = registry.get::<String>().unwrap();
/// let handle = pool.acquire(ReleasePolicy::Auto).unwrap();
/// handle.with_mut(|s| s.push_str("hello")).unwrap();
///
/// drop(pool);
/// registry.destroy::<String>();
///
/// assert!(matches!(handle.with(String::len), Err(Error::PoolDestroyed)));
/// ```
pub struct SingletonPooled<T: Reset> {
    inner: Arc<SingletonPooledInner<T>>,
}

struct SingletonPooledInner<T: Reset> {
    pool: Weak<SharedPool<T>>,

    key: ItemKey,

    policy: ReleasePolicy,
}

impl<T: Reset> SingletonPooled<T> {
    pub(crate) fn new(pool: &Arc<SharedPool<T>>, key: ItemKey, policy: ReleasePolicy) -> Self {
        Self {
            inner: Arc::new(SingletonPooledInner {
                pool: Arc::downgrade(pool),
                key,
                policy,
            }),
        }
    }

    /// The key of the checkout this handle represents.
    #[must_use]
    pub fn key(&self) -> ItemKey {
        self.inner.key
    }

    /// What happens when the last clone of this handle is dropped.
    #[must_use]
    pub fn policy(&self) -> ReleasePolicy {
        self.inner.policy
    }

    /// Whether the pool that owns the element still exists.
    #[must_use]
    pub fn is_pool_alive(&self) -> bool {
        self.inner.pool.strong_count() != 0
    }

    /// Calls `f` with shared access to the element while holding the pool lock.
    ///
    /// # Errors
    ///
    /// [`Error::PoolDestroyed`] if the pool has been torn down. [`Error::StaleHandle`] if the
    /// element has already been released through the pool.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        self.pool()?
            .with_item(self.inner.key, f)
            .ok_or(Error::StaleHandle)
    }

    /// Calls `f` with exclusive access to the element while holding the pool lock.
    ///
    /// # Errors
    ///
    /// [`Error::PoolDestroyed`] if the pool has been torn down. [`Error::StaleHandle`] if the
    /// element has already been released through the pool.
    ///
    /// # Panics
    ///
    /// If `f` panics, the panic poisons the pool lock and every later operation on the pool
    /// panics as well. Dropping handles stays safe.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        self.pool()?
            .with_item_mut(self.inner.key, f)
            .ok_or(Error::StaleHandle)
    }

    fn pool(&self) -> Result<Arc<SharedPool<T>>> {
        self.inner.pool.upgrade().ok_or(Error::PoolDestroyed)
    }
}

impl<T: Reset> Clone for SingletonPooled<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Reset> Drop for SingletonPooledInner<T> {
    fn drop(&mut self) {
        if !self.policy.releases_on_drop() {
            return;
        }

        if let Some(pool) = self.pool.upgrade() {
            pool.release_from_drop(self.key);
        }
    }
}

impl<T: Reset> fmt::Debug for SingletonPooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingletonPooled")
            .field("key", &self.inner.key)
            .field("policy", &self.inner.policy)
            .field("pool_alive", &self.is_pool_alive())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::panic::{self, AssertUnwindSafe};

    use static_assertions::assert_impl_all;
    use tracing_test::traced_test;

    use super::*;
    use crate::{PoolConfig, PoolRegistry, SingletonPool};

    assert_impl_all!(SingletonPooled<String>: Send, Sync, Clone);

    fn registry_with_strings(pre: usize, max: usize) -> (PoolRegistry, SingletonPool<String>) {
        let registry = PoolRegistry::new();
        registry
            .create(PoolConfig::bounded(pre, max), String::new)
            .unwrap();
        let pool = registry.get::<String>().unwrap();
        (registry, pool)
    }

    #[test]
    fn auto_handle_releases_on_drop() {
        let (_registry, pool) = registry_with_strings(0, 2);

        let handle = pool.acquire(ReleasePolicy::Auto).unwrap();
        handle.with_mut(|s| s.push_str("dirty")).unwrap();
        assert_eq!(pool.used_count(), 1);

        drop(handle);
        assert_eq!(pool.used_count(), 0);

        let again = pool.acquire_existing(ReleasePolicy::Auto).unwrap();
        assert!(again.with(String::is_empty).unwrap());
    }

    #[test]
    fn manual_handle_needs_explicit_release() {
        let (_registry, pool) = registry_with_strings(1, 1);

        let handle = pool.acquire(ReleasePolicy::Manual).unwrap();
        let key = handle.key();
        drop(handle);

        assert_eq!(pool.used_count(), 1);
        assert!(pool.release(key));
        assert_eq!(pool.used_count(), 0);
    }

    #[test]
    fn clones_release_once() {
        let (_registry, pool) = registry_with_strings(0, 1);

        let handle = pool.acquire(ReleasePolicy::Auto).unwrap();
        let clone = handle.clone();

        drop(handle);
        assert_eq!(pool.used_count(), 1);

        drop(clone);
        assert_eq!(pool.used_count(), 0);
    }

    #[test]
    fn released_by_key_makes_handle_stale() {
        let (_registry, pool) = registry_with_strings(0, 1);

        let handle = pool.acquire(ReleasePolicy::Auto).unwrap();
        assert!(pool.release(handle.key()));

        assert!(matches!(handle.with(String::len), Err(Error::StaleHandle)));

        let other = pool.acquire(ReleasePolicy::Auto).unwrap();
        drop(handle);

        assert!(other.with(String::len).is_ok());
        assert_eq!(pool.used_count(), 1);
    }

    #[test]
    fn handle_does_not_keep_pool_alive() {
        let (registry, pool) = registry_with_strings(1, 1);

        let handle = pool.acquire(ReleasePolicy::Auto).unwrap();
        assert!(handle.is_pool_alive());

        drop(pool);
        assert!(registry.destroy::<String>());

        assert!(!handle.is_pool_alive());
        assert!(matches!(handle.with(String::len), Err(Error::PoolDestroyed)));
        assert!(matches!(
            handle.with_mut(|s| s.push('x')),
            Err(Error::PoolDestroyed)
        ));

        // Dropping after teardown is a no-op.
        drop(handle);
    }

    #[test]
    fn accessor_keeps_destroyed_pool_alive() {
        let (registry, pool) = registry_with_strings(1, 1);

        let handle = pool.acquire(ReleasePolicy::Auto).unwrap();
        assert!(registry.destroy::<String>());

        // The accessor still holds the pool.
        assert!(handle.is_pool_alive());
        handle.with_mut(|s| s.push('x')).unwrap();

        drop(handle);
        assert_eq!(pool.used_count(), 0);
    }

    #[test]
    fn debug_output_reports_liveness() {
        let (_registry, pool) = registry_with_strings(0, 1);
        let handle = pool.acquire(ReleasePolicy::Auto).unwrap();

        let output = format!("{handle:?}");

        assert!(output.contains("SingletonPooled"));
        assert!(output.contains("pool_alive: true"));
    }

    #[traced_test]
    #[test]
    fn drop_after_panic_in_closure_skips_release() {
        let (_registry, pool) = registry_with_strings(0, 1);
        let handle = pool.acquire(ReleasePolicy::Auto).unwrap();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            handle.with_mut(|_| -> usize { panic!("element update failed") })
        }));
        assert!(result.is_err());

        drop(handle);

        assert!(logs_contain("pool lock is poisoned"));
        assert!(panic::catch_unwind(AssertUnwindSafe(|| pool.used_count())).is_err());
    }
}
