use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::thread;

use tracing::warn;

use crate::constants::ERR_POISONED_LOCK;
use crate::{ItemKey, PoolId, RawPool, Reset};

/// A pool engine behind the pool lock. Both the instance and the singleton variants share one of
/// these through an `Arc` - they differ only in who holds strong references to it.
pub(crate) struct SharedPool<T> {
    /// Copied out of the engine so it can be read without taking the lock.
    id: PoolId,

    raw: Mutex<RawPool<T>>,
}

impl<T: Reset> SharedPool<T> {
    pub(crate) fn new(raw: RawPool<T>) -> Self {
        Self {
            id: raw.id(),
            raw: Mutex::new(raw),
        }
    }

    pub(crate) fn id(&self) -> PoolId {
        self.id
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, RawPool<T>> {
        self.raw.lock().expect(ERR_POISONED_LOCK)
    }

    pub(crate) fn release(&self, key: ItemKey) -> bool {
        self.lock().release(key)
    }

    /// Releases an element on behalf of a dropped handle without panicking on a poisoned lock.
    ///
    /// While the thread is unwinding, or once a panic in caller code has poisoned the pool lock,
    /// the element is left checked out. It is still dropped together with the pool.
    pub(crate) fn release_from_drop(&self, key: ItemKey) {
        if thread::panicking() {
            warn!(pool = %self.id, ?key, "handle dropped during a panic, leaving the element checked out");
            return;
        }

        let Ok(mut raw) = self.raw.lock() else {
            warn!(pool = %self.id, ?key, "pool lock is poisoned, leaving the element checked out");
            return;
        };

        raw.release(key);
    }

    pub(crate) fn with_item<R>(&self, key: ItemKey, f: impl FnOnce(&T) -> R) -> Option<R> {
        let raw = self.lock();
        raw.get(key).map(f)
    }

    pub(crate) fn with_item_mut<R>(
        &self,
        key: ItemKey,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        let mut raw = self.lock();
        raw.get_mut(key).map(f)
    }
}

impl<T> fmt::Debug for SharedPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedPool")
            .field("id", &self.id)
            .field("raw", &self.raw)
            .finish()
    }
}
