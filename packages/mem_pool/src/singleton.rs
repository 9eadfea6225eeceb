use std::any::{Any, TypeId, type_name};
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::{Arc, LazyLock, Mutex};

use tracing::{debug, warn};

use crate::constants::ERR_POISONED_LOCK;
use crate::shared::SharedPool;
use crate::{
    Error, Factory, ItemKey, PoolBuilder, PoolConfig, PoolId, RawPool, ReleasePolicy, Reset,
    Result, SingletonPooled,
};

static GLOBAL: LazyLock<PoolRegistry> = LazyLock::new(PoolRegistry::new);

/// Holds at most one pool per element type.
///
/// A pool must be explicitly created with [`create()`][Self::create] before it can be looked up
/// with [`get()`][Self::get]. Creation is rejected if the configuration is unbounded or if a pool
/// for the same element type already exists; the existing pool is left untouched in that case.
///
/// The registry owns its pools. A pool is torn down when it is removed with
/// [`destroy()`][Self::destroy] (or the registry itself is dropped) and no [`SingletonPool`]
/// accessor for it remains. Handles to elements do not keep the pool alive - see
/// [`SingletonPooled`] for what happens to them after teardown.
///
/// # Example
///
/// ```
/// use mem_pool::{PoolConfig, PoolRegistry, ReleasePolicy};
///
/// let registry = PoolRegistry::new();
///
/// registry.create(PoolConfig::bounded(2, 8), Vec::<u8>::new).unwrap();
///
/// // Creating it again fails and keeps the first pool.
/// assert!(registry.create(PoolConfig::bounded(0, 1), Vec::<u8>::new).is_err());
///
/// let pool = registry.get::<Vec<u8>>().unwrap();
/// assert_eq!(pool.max_count(), 8);
///
/// let buffer = pool.acquire(ReleasePolicy::Auto).unwrap();
/// buffer.with_mut(|b| b.push(42)).unwrap();
/// ```
pub struct PoolRegistry {
    /// Values are `Arc<SharedPool<T>>` for the `T` whose `TypeId` is the key.
    pools: Mutex<foldhash::HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl PoolRegistry {
    /// Creates an empty registry, independent of the process-wide one.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pools: Mutex::new(foldhash::HashMap::default()),
        }
    }

    /// The process-wide registry. It is created on first use and lives until the process exits.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Returns a builder whose configuration can be turned into a singleton pool with
    /// [`PoolBuilder::build_singleton()`].
    pub fn builder<T: Reset>() -> PoolBuilder<T> {
        PoolBuilder::new()
    }

    /// Creates the pool for element type `T`.
    ///
    /// The factory is used for pre-allocation and for every later growth of the pool. A
    /// pre-allocation larger than the cap is clamped to the cap, with a warning logged.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] if `max_allocation` is zero, as singleton pools must be bounded.
    /// [`Error::AlreadyCreated`] if the registry already holds a pool for `T`. Both are also
    /// logged as warnings.
    pub fn create<T, F>(&self, config: PoolConfig, factory: F) -> Result<()>
    where
        T: Reset + Send + 'static,
        F: Factory<T> + 'static,
    {
        if config.is_unbounded() {
            warn!(
                element = type_name::<T>(),
                "refusing to create an unbounded singleton pool"
            );

            return Err(Error::InvalidConfig {
                problem: format!(
                    "singleton pool for '{}' must have a non-zero max_allocation",
                    type_name::<T>()
                ),
            });
        }

        if self.contains::<T>() {
            return Err(Self::already_created::<T>());
        }

        // Pre-allocation runs the factory, which is kept outside the registry lock.
        let shared = Arc::new(SharedPool::new(RawPool::new(config, factory)));

        let mut pools = self.pools.lock().expect(ERR_POISONED_LOCK);

        match pools.entry(TypeId::of::<T>()) {
            Entry::Occupied(_) => Err(Self::already_created::<T>()),
            Entry::Vacant(entry) => {
                debug!(
                    element = type_name::<T>(),
                    pool = %shared.id(),
                    "created singleton pool"
                );

                entry.insert(shared);
                Ok(())
            }
        }
    }

    fn already_created<T>() -> Error {
        warn!(
            element = type_name::<T>(),
            "singleton pool already exists, keeping the existing one"
        );

        Error::AlreadyCreated {
            type_name: type_name::<T>(),
        }
    }

    /// Looks up the pool for element type `T`.
    ///
    /// # Errors
    ///
    /// [`Error::NotCreated`] if no pool for `T` has been created, or it has been destroyed.
    pub fn get<T>(&self) -> Result<SingletonPool<T>>
    where
        T: Reset + Send + 'static,
    {
        let pools = self.pools.lock().expect(ERR_POISONED_LOCK);

        let Some(entry) = pools.get(&TypeId::of::<T>()) else {
            warn!(
                element = type_name::<T>(),
                "singleton pool requested before it was created"
            );

            return Err(Error::NotCreated {
                type_name: type_name::<T>(),
            });
        };

        let shared = Arc::clone(entry)
            .downcast::<SharedPool<T>>()
            .expect("registry entries are always keyed by the TypeId of their element type");

        Ok(SingletonPool { shared })
    }

    /// Whether a pool for element type `T` exists.
    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.pools
            .lock()
            .expect(ERR_POISONED_LOCK)
            .contains_key(&TypeId::of::<T>())
    }

    /// Removes the pool for element type `T` from the registry, returning whether there was one.
    ///
    /// The pool is torn down once no [`SingletonPool`] accessor for it remains. After that,
    /// outstanding element handles report [`Error::PoolDestroyed`]. A new pool for `T` may be
    /// created right away.
    pub fn destroy<T: 'static>(&self) -> bool {
        // Bound to a local so the pool is dropped outside the registry lock.
        let removed = self
            .pools
            .lock()
            .expect(ERR_POISONED_LOCK)
            .remove(&TypeId::of::<T>());

        let Some(removed) = removed else {
            return false;
        };

        debug!(element = type_name::<T>(), "destroyed singleton pool");
        drop(removed);

        true
    }

    /// Number of element types with a pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.lock().expect(ERR_POISONED_LOCK).len()
    }

    /// Whether the registry holds no pools.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.lock().expect(ERR_POISONED_LOCK).is_empty()
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PoolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.pools.lock().expect(ERR_POISONED_LOCK).len();

        f.debug_struct("PoolRegistry").field("pools", &len).finish()
    }
}

/// Accessor for the pool of one element type in a [`PoolRegistry`].
///
/// Obtained from [`PoolRegistry::get()`]. The accessor keeps the pool alive while it exists, so
/// hold on to it only as long as the pool is being used - a pool removed from its registry is
/// not torn down until the last accessor is dropped.
///
/// Offers the same operations as [`InstancePool`][crate::InstancePool] but hands out
/// [`SingletonPooled`] handles, which do not keep the pool alive.
pub struct SingletonPool<T> {
    shared: Arc<SharedPool<T>>,
}

impl<T: Reset> SingletonPool<T> {
    /// The identity of this pool.
    #[must_use]
    pub fn id(&self) -> PoolId {
        self.shared.id()
    }

    /// Checks out an element, growing the pool through its factory if needed and allowed.
    ///
    /// Returns `None` without blocking if the pool is exhausted.
    #[must_use]
    pub fn acquire(&self, policy: ReleasePolicy) -> Option<SingletonPooled<T>> {
        let key = self.acquire_key()?;
        Some(SingletonPooled::new(&self.shared, key, policy))
    }

    /// Checks out an element, growing the pool through `constructor` if needed and allowed.
    #[must_use]
    pub fn acquire_with<C>(
        &self,
        policy: ReleasePolicy,
        constructor: C,
    ) -> Option<SingletonPooled<T>>
    where
        C: FnOnce() -> T,
    {
        let key = self.acquire_key_with(constructor)?;
        Some(SingletonPooled::new(&self.shared, key, policy))
    }

    /// Checks out an already allocated free element without ever growing the pool.
    #[must_use]
    pub fn acquire_existing(&self, policy: ReleasePolicy) -> Option<SingletonPooled<T>> {
        let key = self.shared.lock().acquire_existing()?;
        Some(SingletonPooled::new(&self.shared, key, policy))
    }

    /// Checks out an element without wrapping it in a handle.
    #[must_use]
    pub fn acquire_key(&self) -> Option<ItemKey> {
        self.shared.lock().acquire()
    }

    /// Checks out an element without wrapping it in a handle, growing the pool through
    /// `constructor` if needed and allowed.
    #[must_use]
    pub fn acquire_key_with<C>(&self, constructor: C) -> Option<ItemKey>
    where
        C: FnOnce() -> T,
    {
        self.shared.lock().acquire_with(constructor)
    }

    /// Resets the element and returns it to the pool.
    ///
    /// Returns `false` and does nothing if the key does not name an element that is currently
    /// checked out from this pool.
    pub fn release(&self, key: ItemKey) -> bool {
        self.shared.release(key)
    }

    /// Calls `f` with shared access to a checked-out element while holding the pool lock.
    pub fn with_item<R>(&self, key: ItemKey, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.shared.with_item(key, f)
    }

    /// Calls `f` with exclusive access to a checked-out element while holding the pool lock.
    pub fn with_item_mut<R>(&self, key: ItemKey, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.shared.with_item_mut(key, f)
    }

    /// Number of elements the pool has created.
    #[must_use]
    pub fn allocated_count(&self) -> usize {
        self.shared.lock().allocated_count()
    }

    /// The allocation cap.
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.shared.lock().max_count()
    }

    /// Number of elements currently checked out.
    #[must_use]
    pub fn used_count(&self) -> usize {
        self.shared.lock().used_count()
    }

    /// Number of allocated elements available for checkout.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.shared.lock().free_count()
    }

    /// Whether two accessors refer to the same pool.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<T> Clone for SingletonPool<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for SingletonPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingletonPool")
            .field("shared", &self.shared)
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::ptr;

    use static_assertions::assert_impl_all;
    use tracing_test::traced_test;

    use super::*;

    assert_impl_all!(PoolRegistry: Send, Sync);
    assert_impl_all!(SingletonPool<String>: Send, Sync, Clone);

    #[test]
    fn create_then_get() {
        let registry = PoolRegistry::new();

        registry
            .create(PoolConfig::bounded(2, 4), String::new)
            .unwrap();

        let pool = registry.get::<String>().unwrap();

        assert_eq!(pool.allocated_count(), 2);
        assert_eq!(pool.free_count(), 2);
        assert_eq!(pool.used_count(), 0);
        assert_eq!(pool.max_count(), 4);
        assert!(registry.contains::<String>());
        assert_eq!(registry.len(), 1);
    }

    #[traced_test]
    #[test]
    fn unbounded_singleton_is_rejected() {
        let registry = PoolRegistry::new();

        let result = registry.create(PoolConfig::unbounded(1), String::new);

        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
        assert!(registry.is_empty());
        assert!(logs_contain("refusing to create an unbounded singleton pool"));
    }

    #[traced_test]
    #[test]
    fn second_create_keeps_existing_pool() {
        let registry = PoolRegistry::new();

        registry
            .create(PoolConfig::bounded(1, 3), String::new)
            .unwrap();

        let result = registry.create(PoolConfig::bounded(5, 10), || String::from("other"));
        assert!(matches!(result, Err(Error::AlreadyCreated { .. })));
        assert!(logs_contain("keeping the existing one"));

        let pool = registry.get::<String>().unwrap();
        assert_eq!(pool.allocated_count(), 1);
        assert_eq!(pool.max_count(), 3);
    }

    #[test]
    fn get_before_create_fails() {
        let registry = PoolRegistry::new();

        assert!(matches!(
            registry.get::<String>(),
            Err(Error::NotCreated { .. })
        ));
    }

    #[test]
    fn pre_allocation_is_clamped() {
        let registry = PoolRegistry::new();

        registry
            .create(PoolConfig::bounded(9, 2), Vec::<u8>::new)
            .unwrap();

        let pool = registry.get::<Vec<u8>>().unwrap();
        assert_eq!(pool.allocated_count(), 2);
    }

    #[test]
    fn pools_are_per_element_type() {
        let registry = PoolRegistry::new();

        registry
            .create(PoolConfig::bounded(0, 1), String::new)
            .unwrap();
        registry
            .create(PoolConfig::bounded(0, 1), Vec::<u8>::new)
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_ne!(
            registry.get::<String>().unwrap().id(),
            registry.get::<Vec<u8>>().unwrap().id()
        );
    }

    #[test]
    fn get_returns_same_pool() {
        let registry = PoolRegistry::new();

        registry
            .create(PoolConfig::bounded(0, 1), String::new)
            .unwrap();

        let a = registry.get::<String>().unwrap();
        let b = registry.get::<String>().unwrap();

        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn exhausted_pool_returns_none() {
        let registry = PoolRegistry::new();

        registry
            .create(PoolConfig::bounded(0, 1), String::new)
            .unwrap();
        let pool = registry.get::<String>().unwrap();

        let _held = pool.acquire(ReleasePolicy::Auto).unwrap();
        assert!(pool.acquire(ReleasePolicy::Auto).is_none());
        assert!(pool.acquire_existing(ReleasePolicy::Auto).is_none());
    }

    #[test]
    fn keys_round_trip() {
        let registry = PoolRegistry::new();

        registry
            .create(PoolConfig::bounded(0, 2), Vec::<u32>::new)
            .unwrap();
        let pool = registry.get::<Vec<u32>>().unwrap();

        let key = pool.acquire_key_with(|| vec![1, 2]).unwrap();
        assert_eq!(pool.with_item(key, Vec::len), Some(2));

        pool.with_item_mut(key, |v| v.push(3)).unwrap();
        assert_eq!(pool.with_item(key, Vec::len), Some(3));

        assert!(pool.release(key));
        assert!(!pool.release(key));
        assert_eq!(pool.free_count(), 1);
    }

    #[test]
    fn destroy_allows_recreation() {
        let registry = PoolRegistry::new();

        registry
            .create(PoolConfig::bounded(1, 1), String::new)
            .unwrap();

        assert!(registry.destroy::<String>());
        assert!(!registry.destroy::<String>());
        assert!(!registry.contains::<String>());

        registry
            .create(PoolConfig::bounded(0, 5), String::new)
            .unwrap();
        assert_eq!(registry.get::<String>().unwrap().max_count(), 5);
    }

    #[test]
    fn builder_creates_singleton() {
        let registry = PoolRegistry::new();

        PoolRegistry::builder::<String>()
            .max_allocation(2)
            .build_singleton(&registry, String::new)
            .unwrap();

        assert!(registry.contains::<String>());
    }

    #[test]
    fn global_registry_is_one_instance() {
        assert!(ptr::eq(PoolRegistry::global(), PoolRegistry::global()));
    }
}
