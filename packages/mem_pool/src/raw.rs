use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, trace};

use crate::{Factory, ItemKey, PoolConfig, PoolId, Reset};

/// The pool engine: a growable backing store of elements partitioned into a free set and a used
/// set.
///
/// This type is not thread-safe on its own - every operation takes `&mut self`. The managed pool
/// types ([`InstancePool`][crate::InstancePool] and [`SingletonPool`][crate::SingletonPool])
/// wrap it in a mutex and hand out auto-releasing handles. Use the raw engine directly when the
/// pool is owned by a single thread or is already protected by some outer lock.
///
/// # Ordering
///
/// The free set is an ordered sequence. Acquire takes from the front, newly created elements are
/// pushed to the front (so a growth step hands out the element it just created) and released
/// elements are pushed to the back. Released elements are therefore reused round-robin rather
/// than the most recently released one being handed out again immediately.
///
/// # Example
///
/// ```
/// use mem_pool::{PoolConfig, RawPool};
///
/// let mut pool = RawPool::new(PoolConfig::bounded(1, 2), String::new);
///
/// let first = pool.acquire().unwrap();
/// let second = pool.acquire().unwrap();
/// assert!(pool.acquire().is_none()); // Exhausted.
///
/// pool.get_mut(first).unwrap().push_str("scratch");
///
/// assert!(pool.release(first));
/// assert!(!pool.release(first)); // Already released - no-op.
///
/// let again = pool.acquire().unwrap();
/// assert_eq!(pool.get(again).unwrap(), ""); // Reset on release.
/// # assert!(pool.release(second));
/// ```
pub struct RawPool<T> {
    id: PoolId,

    /// Every element the pool has ever created, in creation order. Slots are never removed, so
    /// an index stays valid for the lifetime of the pool.
    slots: Vec<Slot<T>>,

    /// Indices of the slots that are available for checkout.
    free: VecDeque<usize>,

    /// Number of slots that are checked out. Always `slots.len() - free.len()`.
    used: usize,

    config: PoolConfig,

    factory: Box<dyn Factory<T>>,
}

struct Slot<T> {
    item: T,

    /// Bumped on every checkout, invalidating keys from earlier checkouts.
    generation: u64,

    checked_out: bool,
}

impl<T: Reset> RawPool<T> {
    /// Creates a pool and eagerly constructs the configured number of pre-allocated elements.
    ///
    /// A pre-allocation larger than the cap of a bounded pool is clamped to the cap, with a
    /// warning logged.
    #[must_use]
    pub fn new<F>(config: PoolConfig, factory: F) -> Self
    where
        F: Factory<T> + 'static,
    {
        let config = config.sanitized();

        let mut pool = Self {
            id: PoolId::next(),
            slots: Vec::with_capacity(config.pre_allocate()),
            free: VecDeque::with_capacity(config.pre_allocate()),
            used: 0,
            config,
            factory: Box::new(factory),
        };

        for _ in 0..config.pre_allocate() {
            let item = pool.factory.create();
            pool.allocate(item);
        }

        debug!(
            pool = %pool.id,
            pre_allocated = config.pre_allocate(),
            max_allocation = config.max_allocation(),
            "created object pool"
        );

        pool
    }

    /// The identity of this pool. Every key the pool issues carries it.
    #[must_use]
    pub fn id(&self) -> PoolId {
        self.id
    }

    /// The sanitized configuration the pool was created with.
    #[must_use]
    pub fn config(&self) -> PoolConfig {
        self.config
    }

    /// Checks out an element, creating one with the pool's factory if no free element exists
    /// and the cap allows it.
    ///
    /// Returns `None` without blocking if the pool is bounded and every element is checked out.
    pub fn acquire(&mut self) -> Option<ItemKey> {
        if self.free.is_empty() && self.can_grow() {
            let item = self.factory.create();
            self.allocate(item);
        }

        self.check_out_front()
    }

    /// Checks out an element, creating one with `constructor` instead of the pool's factory if no
    /// free element exists and the cap allows it.
    ///
    /// The constructor is only called when the pool actually grows. Otherwise an existing free
    /// element is handed out and the constructor is dropped unused.
    pub fn acquire_with<C>(&mut self, constructor: C) -> Option<ItemKey>
    where
        C: FnOnce() -> T,
    {
        if self.free.is_empty() && self.can_grow() {
            self.allocate(constructor());
        }

        self.check_out_front()
    }

    /// Checks out an already allocated free element. Never grows the pool.
    pub fn acquire_existing(&mut self) -> Option<ItemKey> {
        self.check_out_front()
    }

    /// Resets a checked-out element and returns it to the free set.
    ///
    /// Returns `false` and does nothing if the key does not name a currently checked-out element
    /// of this pool - the element was already released, the key belongs to another pool, or the
    /// slot has been released and acquired again since the key was issued.
    pub fn release(&mut self, key: ItemKey) -> bool {
        let Some(slot) = self.checked_out_slot_mut(key) else {
            trace!(pool = %self.id, ?key, "ignoring release of an element that is not checked out");
            return false;
        };

        slot.item.reset();
        slot.checked_out = false;

        self.free.push_back(key.index());

        // Cannot underflow - we just found a checked-out slot, so at least one was counted.
        self.used = self.used.wrapping_sub(1);

        true
    }

    /// Shared access to a checked-out element. `None` if the key is not currently checked out.
    #[must_use]
    pub fn get(&self, key: ItemKey) -> Option<&T> {
        if key.pool_id() != self.id {
            return None;
        }

        self.slots
            .get(key.index())
            .filter(|slot| slot.checked_out && slot.generation == key.generation())
            .map(|slot| &slot.item)
    }

    /// Exclusive access to a checked-out element. `None` if the key is not currently checked out.
    #[must_use]
    pub fn get_mut(&mut self, key: ItemKey) -> Option<&mut T> {
        self.checked_out_slot_mut(key).map(|slot| &mut slot.item)
    }

    /// Whether the key names a currently checked-out element of this pool.
    #[must_use]
    pub fn is_checked_out(&self, key: ItemKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of elements the pool has created. Elements are never destroyed before the pool.
    #[must_use]
    pub fn allocated_count(&self) -> usize {
        self.slots.len()
    }

    /// The allocation cap, zero meaning unbounded.
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.config.max_allocation()
    }

    /// Number of elements created together with the pool.
    #[must_use]
    pub fn pre_allocated_count(&self) -> usize {
        self.config.pre_allocate()
    }

    /// Number of elements currently checked out.
    #[must_use]
    pub fn used_count(&self) -> usize {
        self.used
    }

    /// Number of allocated elements available for checkout.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    fn can_grow(&self) -> bool {
        self.config.is_unbounded() || self.slots.len() < self.config.max_allocation()
    }

    fn allocate(&mut self, item: T) {
        let index = self.slots.len();

        self.slots.push(Slot {
            item,
            generation: 0,
            checked_out: false,
        });

        // New elements go to the front so the growth step that created one hands it out.
        self.free.push_front(index);

        trace!(pool = %self.id, index, "allocated pool element");
    }

    fn check_out_front(&mut self) -> Option<ItemKey> {
        let index = self.free.pop_front()?;

        let slot = self
            .slots
            .get_mut(index)
            .expect("the free set only ever holds indices of allocated slots");

        debug_assert!(!slot.checked_out, "free slot {index} was marked as checked out");

        slot.generation = slot.generation.wrapping_add(1);
        slot.checked_out = true;

        let key = ItemKey::new(self.id, index, slot.generation);

        // Cannot overflow - the count is bounded by the number of slots.
        self.used = self.used.wrapping_add(1);

        Some(key)
    }

    fn checked_out_slot_mut(&mut self, key: ItemKey) -> Option<&mut Slot<T>> {
        if key.pool_id() != self.id {
            return None;
        }

        self.slots
            .get_mut(key.index())
            .filter(|slot| slot.checked_out && slot.generation == key.generation())
    }
}

impl<T> Drop for RawPool<T> {
    #[cfg_attr(test, mutants::skip)] // Only logs.
    fn drop(&mut self) {
        // The backing store drops every element exactly once right after this, whether it is
        // free or still checked out.
        if self.used != 0 {
            debug!(
                pool = %self.id,
                still_checked_out = self.used,
                "dropping object pool while elements are still checked out"
            );
        }
    }
}

impl<T> fmt::Debug for RawPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawPool")
            .field("id", &self.id)
            .field("allocated", &self.slots.len())
            .field("free", &self.free.len())
            .field("used", &self.used)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
