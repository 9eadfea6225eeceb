use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, MutexGuard};

use crate::{Error, InstancePool, ItemKey, RawPool, ReleasePolicy, Reset, Result};

/// A handle to an element checked out from an [`InstancePool`].
///
/// The handle holds a strong reference to its pool, so the pool and the element stay alive for
/// as long as the handle does, even if every other reference to the pool has been dropped.
///
/// Handles can be cloned. All clones refer to the same checkout, and the element is released
/// when the last clone is dropped if the handle was acquired with [`ReleasePolicy::Auto`]. With
/// [`ReleasePolicy::Manual`] dropping the handle does nothing and the caller must pass
/// [`key()`][Self::key] to [`InstancePool::release()`].
///
/// # Element access
///
/// The element lives inside the pool and is only reachable under the pool lock - through
/// [`with()`][Self::with], [`with_mut()`][Self::with_mut] or the guard returned by
/// [`lock()`][Self::lock]. Do not call into the same pool while holding the guard or from inside
/// the closures, as the pool lock is not reentrant.
///
/// A panic inside one of the closures, in [`Reset::reset()`] or while the guard is held poisons
/// the pool lock. Every later operation on the pool then panics. Dropping a handle never panics:
/// a handle dropped during a panic or after the pool was poisoned leaves its element checked out.
///
/// # Example
///
/// ```
/// use mem_pool::{InstancePool, ReleasePolicy};
///
/// let pool = InstancePool::builder().max_allocation(1).build(String::new);
///
/// let handle = pool.acquire(ReleasePolicy::Auto).unwrap();
///
/// {
///     let mut text = handle.lock().unwrap();
///     text.push_str("hello");
/// }
///
/// assert_eq!(handle.with(|s| s.len()).unwrap(), 5);
///
/// drop(handle);
///
/// // Released and reset.
/// let handle = pool.acquire(ReleasePolicy::Auto).unwrap();
/// assert!(handle.with(String::is_empty).unwrap());
/// ```
pub struct Pooled<T: Reset> {
    inner: Arc<PooledInner<T>>,
}

struct PooledInner<T: Reset> {
    /// Keeps the pool alive for as long as the element is checked out through this handle.
    pool: InstancePool<T>,

    key: ItemKey,

    policy: ReleasePolicy,
}

impl<T: Reset> Pooled<T> {
    pub(crate) fn new(pool: InstancePool<T>, key: ItemKey, policy: ReleasePolicy) -> Self {
        Self {
            inner: Arc::new(PooledInner { pool, key, policy }),
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

    /// The pool the element was checked out from.
    #[must_use]
    pub fn pool(&self) -> &InstancePool<T> {
        &self.inner.pool
    }

    /// Whether the element is still checked out under this handle's key.
    ///
    /// Only becomes `false` if the key was explicitly released through the pool.
    #[must_use]
    pub fn is_checked_out(&self) -> bool {
        self.inner.pool.shared().lock().is_checked_out(self.inner.key)
    }

    /// Calls `f` with shared access to the element while holding the pool lock.
    ///
    /// # Errors
    ///
    /// [`Error::StaleHandle`] if the element has already been released through the pool.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        self.inner
            .pool
            .with_item(self.inner.key, f)
            .ok_or(Error::StaleHandle)
    }

    /// Calls `f` with exclusive access to the element while holding the pool lock.
    ///
    /// # Errors
    ///
    /// [`Error::StaleHandle`] if the element has already been released through the pool.
    ///
    /// # Panics
    ///
    /// If `f` panics, the panic poisons the pool lock and every later operation on the pool
    /// panics as well.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        self.inner
            .pool
            .with_item_mut(self.inner.key, f)
            .ok_or(Error::StaleHandle)
    }

    /// Locks the pool and returns a guard that dereferences to the element.
    ///
    /// The whole pool stays locked until the guard is dropped.
    ///
    /// # Errors
    ///
    /// [`Error::StaleHandle`] if the element has already been released through the pool.
    pub fn lock(&self) -> Result<ItemGuard<'_, T>> {
        let raw = self.inner.pool.shared().lock();

        if !raw.is_checked_out(self.inner.key) {
            return Err(Error::StaleHandle);
        }

        Ok(ItemGuard {
            raw,
            key: self.inner.key,
        })
    }
}

impl<T: Reset> Clone for Pooled<T> {
    /// Creates another handle to the same checkout.
    ///
    /// The element is released only when the last clone is dropped.
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Reset> Drop for PooledInner<T> {
    fn drop(&mut self) {
        // Arc guarantees this runs once, after the last handle clone is gone.
        if self.policy.releases_on_drop() {
            self.pool.shared().release_from_drop(self.key);
        }
    }
}

impl<T: Reset> fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pooled")
            .field("pool", &self.inner.pool.id())
            .field("key", &self.inner.key)
            .field("policy", &self.inner.policy)
            .finish()
    }
}

/// Exclusive access to a checked-out element, holding the pool lock while alive.
///
/// Returned by [`Pooled::lock()`].
pub struct ItemGuard<'a, T> {
    raw: MutexGuard<'a, RawPool<T>>,
    key: ItemKey,
}

impl<T: Reset> Deref for ItemGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.raw
            .get(self.key)
            .expect("guard is only created for a checked-out key and holds the lock that keeps it so")
    }
}

impl<T: Reset> DerefMut for ItemGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.raw
            .get_mut(self.key)
            .expect("guard is only created for a checked-out key and holds the lock that keeps it so")
    }
}

impl<T: Reset + fmt::Debug> fmt::Debug for ItemGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemGuard")
            .field("key", &self.key)
            .field("item", &**self)
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::thread;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;
    use crate::{InstanceRegistry, PoolConfig};

    assert_impl_all!(Pooled<String>: Send, Sync, Clone);
    assert_not_impl_any!(ItemGuard<'static, String>: Send);

    fn pool_of_strings(config: PoolConfig) -> InstancePool<String> {
        InstanceRegistry::<String>::new().create(config, String::new)
    }

    #[test]
    fn auto_handle_releases_on_drop() {
        let pool = pool_of_strings(PoolConfig::bounded(0, 1));

        let handle = pool.acquire(ReleasePolicy::Auto).unwrap();
        assert_eq!(pool.used_count(), 1);

        drop(handle);
        assert_eq!(pool.used_count(), 0);
        assert_eq!(pool.free_count(), 1);
    }

    #[test]
    fn manual_handle_does_not_release_on_drop() {
        let pool = pool_of_strings(PoolConfig::bounded(0, 1));

        let handle = pool.acquire(ReleasePolicy::Manual).unwrap();
        let key = handle.key();
        assert_eq!(handle.policy(), ReleasePolicy::Manual);
        drop(handle);

        assert_eq!(pool.used_count(), 1);
        assert!(pool.acquire(ReleasePolicy::Auto).is_none());

        assert!(pool.release(key));
        assert_eq!(pool.used_count(), 0);
    }

    #[test]
    fn clones_release_once_after_last_drop() {
        let pool = pool_of_strings(PoolConfig::bounded(0, 2));

        let handle = pool.acquire(ReleasePolicy::Auto).unwrap();
        let clone = handle.clone();

        drop(handle);
        assert_eq!(pool.used_count(), 1);
        clone.with_mut(|s| s.push('x')).unwrap();

        drop(clone);
        assert_eq!(pool.used_count(), 0);
    }

    #[test]
    fn explicit_release_makes_handle_stale() {
        let pool = pool_of_strings(PoolConfig::bounded(0, 1));

        let handle = pool.acquire(ReleasePolicy::Auto).unwrap();
        assert!(pool.release(handle.key()));

        assert!(!handle.is_checked_out());
        assert!(matches!(handle.with(String::len), Err(Error::StaleHandle)));
        assert!(matches!(handle.lock(), Err(Error::StaleHandle)));

        // The slot is acquired again by someone else - the stale handle must not release it.
        let other = pool.acquire(ReleasePolicy::Auto).unwrap();
        drop(handle);

        assert!(other.is_checked_out());
        assert_eq!(pool.used_count(), 1);
    }

    #[test]
    fn guard_gives_mutable_access() {
        let pool = pool_of_strings(PoolConfig::bounded(0, 1));
        let handle = pool.acquire(ReleasePolicy::Auto).unwrap();

        {
            let mut guard = handle.lock().unwrap();
            guard.push_str("abc");
            assert_eq!(guard.len(), 3);
        }

        assert_eq!(handle.with(Clone::clone).unwrap(), "abc");
    }

    #[test]
    fn handle_reports_its_pool() {
        let pool = pool_of_strings(PoolConfig::unbounded(0));
        let handle = pool.acquire(ReleasePolicy::Auto).unwrap();

        assert!(handle.pool().ptr_eq(&pool));
        assert_eq!(handle.key().pool_id(), pool.id());

        let output = format!("{handle:?}");
        assert!(output.contains("Pooled"));
    }

    #[test]
    fn panic_in_closure_poisons_pool_without_aborting() {
        let pool = pool_of_strings(PoolConfig::bounded(0, 2));
        let bystander = pool.acquire(ReleasePolicy::Auto).unwrap();

        let worker_pool = pool.clone();
        let worker = thread::spawn(move || {
            let handle = worker_pool.acquire(ReleasePolicy::Auto).unwrap();
            handle
                .with_mut(|_| -> usize { panic!("element update failed") })
                .unwrap()
        });

        // The worker's handle is dropped while unwinding.
        assert!(worker.join().is_err());

        let poisoned = pool.clone();
        assert!(thread::spawn(move || poisoned.used_count()).join().is_err());

        drop(bystander);
    }
}
