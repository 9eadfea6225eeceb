use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::constants::ERR_POISONED_LOCK;
use crate::shared::SharedPool;
use crate::{
    Factory, ItemKey, PoolBuilder, PoolConfig, PoolId, Pooled, RawPool, ReleasePolicy, Reset,
    type_map,
};

/// A thread-safe object pool with its own identity, any number of which may exist for the same
/// element type.
///
/// This type is a cloneable reference to a shared pool. The pool stays alive while any clone of
/// it or any [`Pooled`] handle to one of its elements exists. Pools are created through an
/// [`InstanceRegistry`], which also holds a reference to every pool it created until the next
/// creation call finds that nothing else refers to it anymore.
///
/// # Thread safety
///
/// All operations, including access to elements through handles, take the pool lock for their
/// duration. Pools and handles can be freely shared between threads if the element type is
/// [`Send`].
///
/// # Example
///
/// ```
/// use std::thread;
///
/// use mem_pool::{InstancePool, ReleasePolicy};
///
/// let pool = InstancePool::builder().max_allocation(4).build(Vec::<u8>::new);
///
/// let worker_pool = pool.clone();
/// let worker = thread::spawn(move || {
///     let buffer = worker_pool.acquire(ReleasePolicy::Auto).unwrap();
///     buffer.with_mut(|b| b.extend_from_slice(b"payload")).unwrap();
///     buffer.with(Vec::len).unwrap()
/// });
///
/// assert_eq!(worker.join().unwrap(), 7);
///
/// // The worker's handle was dropped, so the buffer is back in the pool.
/// assert_eq!(pool.used_count(), 0);
/// assert_eq!(pool.free_count(), 1);
/// ```
pub struct InstancePool<T> {
    shared: Arc<SharedPool<T>>,
}

impl<T: Reset> InstancePool<T> {
    /// Returns a builder for configuring and creating an instance pool.
    pub fn builder() -> PoolBuilder<T> {
        PoolBuilder::new()
    }

    fn from_shared(shared: Arc<SharedPool<T>>) -> Self {
        Self { shared }
    }

    /// The identity of this pool.
    #[must_use]
    pub fn id(&self) -> PoolId {
        self.shared.id()
    }

    /// Checks out an element, growing the pool through its factory if needed and allowed.
    ///
    /// Returns `None` without blocking if the pool is bounded and exhausted.
    #[must_use]
    pub fn acquire(&self, policy: ReleasePolicy) -> Option<Pooled<T>> {
        let key = self.acquire_key()?;
        Some(Pooled::new(self.clone(), key, policy))
    }

    /// Checks out an element, growing the pool through `constructor` if needed and allowed.
    ///
    /// The constructor runs under the pool lock and only if the pool actually grows.
    #[must_use]
    pub fn acquire_with<C>(&self, policy: ReleasePolicy, constructor: C) -> Option<Pooled<T>>
    where
        C: FnOnce() -> T,
    {
        let key = self.acquire_key_with(constructor)?;
        Some(Pooled::new(self.clone(), key, policy))
    }

    /// Checks out an already allocated free element without ever growing the pool.
    #[must_use]
    pub fn acquire_existing(&self, policy: ReleasePolicy) -> Option<Pooled<T>> {
        let key = self.shared.lock().acquire_existing()?;
        Some(Pooled::new(self.clone(), key, policy))
    }

    /// Checks out an element without wrapping it in a handle.
    ///
    /// The caller is responsible for passing the key to [`release()`][Self::release] when done.
    /// Elements reached through bare keys are accessed via [`with_item()`][Self::with_item] and
    /// [`with_item_mut()`][Self::with_item_mut].
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
    ///
    /// Returns `None` if the key does not name an element currently checked out from this pool.
    pub fn with_item<R>(&self, key: ItemKey, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.shared.with_item(key, f)
    }

    /// Calls `f` with exclusive access to a checked-out element while holding the pool lock.
    ///
    /// Returns `None` if the key does not name an element currently checked out from this pool.
    pub fn with_item_mut<R>(&self, key: ItemKey, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.shared.with_item_mut(key, f)
    }

    /// Number of elements the pool has created.
    #[must_use]
    pub fn allocated_count(&self) -> usize {
        self.shared.lock().allocated_count()
    }

    /// The allocation cap, zero meaning unbounded.
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

    /// Whether two references point to the same pool.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    pub(crate) fn shared(&self) -> &SharedPool<T> {
        &self.shared
    }
}

impl<T> Clone for InstancePool<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for InstancePool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstancePool")
            .field("shared", &self.shared)
            .finish()
    }
}

/// Creates instance pools and keeps each one alive until nothing outside the registry refers to
/// it.
///
/// Every [`create()`][Self::create] call first drops the registry's reference to any pool that
/// is referenced by nothing else - no [`InstancePool`] clone and no outstanding [`Pooled`] handle.
/// Such a pool is destroyed right there, together with its elements.
///
/// Use [`InstanceRegistry::global()`] for the process-wide registry of an element type, or
/// [`InstanceRegistry::new()`] for an independent one (e.g. in tests).
///
/// # Example
///
/// ```
/// use mem_pool::{InstanceRegistry, PoolConfig, ReleasePolicy};
///
/// let registry = InstanceRegistry::<String>::new();
///
/// let pool = registry.create(PoolConfig::bounded(1, 1), String::new);
/// let handle = pool.acquire(ReleasePolicy::Auto).unwrap();
///
/// // The handle keeps the pool alive after the last pool reference is gone.
/// drop(pool);
/// handle.with_mut(|s| s.push_str("still usable")).unwrap();
/// assert_eq!(registry.prune(), 0);
///
/// drop(handle);
/// assert_eq!(registry.prune(), 1);
/// assert!(registry.is_empty());
/// ```
pub struct InstanceRegistry<T> {
    pools: Mutex<foldhash::HashMap<PoolId, Arc<SharedPool<T>>>>,
}

impl<T: Reset + Send + 'static> InstanceRegistry<T> {
    /// Returns the process-wide registry for element type `T`, creating it on first use.
    #[must_use]
    pub fn global() -> Arc<Self> {
        type_map::global(Self::new)
    }
}

impl<T: Reset> InstanceRegistry<T> {
    /// Creates an empty registry, independent of the process-wide one.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pools: Mutex::new(foldhash::HashMap::default()),
        }
    }

    /// Creates a new pool, first pruning pools that nothing outside the registry refers to.
    ///
    /// A pre-allocation larger than the cap of a bounded pool is clamped to the cap, with a
    /// warning logged. A `max_allocation` of zero creates an unbounded pool.
    pub fn create<F>(&self, config: PoolConfig, factory: F) -> InstancePool<T>
    where
        F: Factory<T> + 'static,
    {
        let shared = Arc::new(SharedPool::new(RawPool::new(config, factory)));

        let mut pools = self.pools.lock().expect(ERR_POISONED_LOCK);

        Self::prune_locked(&mut pools);
        pools.insert(shared.id(), Arc::clone(&shared));

        InstancePool::from_shared(shared)
    }

    /// Drops the registry's reference to every pool that nothing else refers to, returning how
    /// many pools were dropped.
    pub fn prune(&self) -> usize {
        let mut pools = self.pools.lock().expect(ERR_POISONED_LOCK);
        Self::prune_locked(&mut pools)
    }

    fn prune_locked(pools: &mut foldhash::HashMap<PoolId, Arc<SharedPool<T>>>) -> usize {
        let before = pools.len();

        // A strong count of one means only the registry entry itself is left. Nobody else can
        // create a new reference from that state because the registry never hands its own out.
        pools.retain(|_, shared| Arc::strong_count(shared) > 1);

        let pruned = before.saturating_sub(pools.len());

        if pruned != 0 {
            debug!(pruned, remaining = pools.len(), "pruned unreferenced instance pools");
        }

        pruned
    }

    /// Number of pools the registry currently keeps alive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.lock().expect(ERR_POISONED_LOCK).len()
    }

    /// Whether the registry keeps no pools alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.lock().expect(ERR_POISONED_LOCK).is_empty()
    }

    /// Whether the registry still holds the pool with the given identity.
    #[must_use]
    pub fn contains(&self, id: PoolId) -> bool {
        self.pools.lock().expect(ERR_POISONED_LOCK).contains_key(&id)
    }
}

impl<T: Reset> Default for InstanceRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for InstanceRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.pools.lock().expect(ERR_POISONED_LOCK).len();

        f.debug_struct("InstanceRegistry")
            .field("pools", &len)
            .finish()
    }
}
