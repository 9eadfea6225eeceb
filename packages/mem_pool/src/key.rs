use std::fmt;
use std::sync::atomic::{self, AtomicU64};

/// Process-unique identity of one pool engine.
///
/// Every pool gets a fresh identity when it is constructed, even if it replaces an earlier pool
/// of the same element type. Instance registries are keyed by it and every [`ItemKey`] carries
/// it, so keys handed out by one pool are never accepted by another.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PoolId(u64);

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

impl PoolId {
    pub(crate) fn next() -> Self {
        // Relaxed is enough, we only need uniqueness, not ordering with other memory operations.
        Self(NEXT_POOL_ID.fetch_add(1, atomic::Ordering::Relaxed))
    }

    /// The raw numeric value of the identity.
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool-{}", self.0)
    }
}

/// Identifies one checkout of one element of one pool.
///
/// The key names the slot in the pool's backing store plus the generation of the slot at the
/// time of checkout. Every checkout bumps the generation, so a key becomes stale as soon as the
/// element is released - releasing it again, or releasing it after someone else has acquired
/// the same element, is a no-op.
///
/// Keys are plain values and can be freely copied, compared and sent between threads.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ItemKey {
    pool_id: PoolId,
    index: usize,
    generation: u64,
}

impl ItemKey {
    #[must_use]
    pub(crate) fn new(pool_id: PoolId, index: usize, generation: u64) -> Self {
        Self {
            pool_id,
            index,
            generation,
        }
    }

    /// The pool that issued this key.
    #[must_use]
    pub fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    /// Index of the element in the pool's backing store. Stable for the lifetime of the pool.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Checkout generation of the slot at the time the key was issued.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
