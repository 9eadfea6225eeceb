use std::fmt;
use std::time::Duration;

use crate::deque::{End, SyncDeque};

/// A thread-safe first-in-first-out queue whose consumers can block until an item arrives.
///
/// Share it between threads by reference (e.g. in an `Arc` or with scoped threads). Each
/// [`push()`][Self::push] wakes at most one consumer blocked in
/// [`wait_and_pop()`][Self::wait_and_pop].
///
/// # Example
///
/// ```
/// use std::thread;
///
/// use blocking_collections::BlockingQueue;
///
/// let queue = BlockingQueue::new();
///
/// thread::scope(|s| {
///     s.spawn(|| {
///         for job in 0..3 {
///             queue.push(job);
///         }
///     });
///
///     let received = (0..3).map(|_| queue.wait_and_pop()).collect::<Vec<_>>();
///     assert_eq!(received, vec![0, 1, 2]);
/// });
///
/// assert!(queue.try_pop().is_none());
/// ```
pub struct BlockingQueue<T> {
    inner: SyncDeque<T>,
}

impl<T> BlockingQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: SyncDeque::new(),
        }
    }

    /// Adds an item to the back of the queue and wakes one waiting consumer.
    pub fn push(&self, item: T) {
        self.inner.push(End::Back, item);
    }

    /// Removes the item at the front of the queue, blocking until there is one.
    #[must_use]
    pub fn wait_and_pop(&self) -> T {
        self.inner.wait_and_pop(End::Front)
    }

    /// Removes the item at the front of the queue, blocking for at most `timeout` until there is
    /// one.
    #[must_use]
    pub fn wait_and_pop_timeout(&self, timeout: Duration) -> Option<T> {
        self.inner.wait_and_pop_timeout(End::Front, timeout)
    }

    /// Removes the item at the front of the queue if there is one, without blocking.
    #[must_use]
    pub fn try_pop(&self) -> Option<T> {
        self.inner.try_pop(End::Front)
    }

    /// Whether the queue holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of items in the queue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Removes all items from the queue.
    pub fn clear(&self) {
        self.inner.clear();
    }
}

impl<T: Clone> BlockingQueue<T> {
    /// A copy of the item at the front of the queue, the next one to be popped, if any.
    #[must_use]
    pub fn front(&self) -> Option<T> {
        self.inner.peek(End::Front)
    }

    /// A copy of the most recently pushed item, if any.
    #[must_use]
    pub fn back(&self) -> Option<T> {
        self.inner.peek(End::Back)
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for BlockingQueue<T> {
    /// Creates a new, independent queue holding a copy of the current items.
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.snapshot(),
        }
    }
}

impl<T> FromIterator<T> for BlockingQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            inner: SyncDeque::from_items(iter.into_iter().collect()),
        }
    }
}

impl<T> fmt::Debug for BlockingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingQueue")
            .field("len", &self.len())
            .finish()
    }
}
