use std::fmt;
use std::time::Duration;

use crate::deque::{End, SyncDeque};

/// A thread-safe double-ended list whose consumers can block until an item arrives.
///
/// Items can be added and removed at either end. Each push wakes at most one consumer blocked in
/// one of the waiting pops, whichever end it waits on.
///
/// # Example
///
/// ```
/// use blocking_collections::BlockingList;
///
/// let list = BlockingList::new();
///
/// list.push_back("normal");
/// list.push_front("urgent");
///
/// assert_eq!(list.front().as_deref(), Some("urgent"));
/// assert_eq!(list.wait_and_pop_front(), "urgent");
/// assert_eq!(list.try_pop_back(), Some("normal"));
/// assert!(list.is_empty());
/// ```
pub struct BlockingList<T> {
    inner: SyncDeque<T>,
}

impl<T> BlockingList<T> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: SyncDeque::new(),
        }
    }

    /// Adds an item at the back and wakes one waiting consumer.
    pub fn push_back(&self, item: T) {
        self.inner.push(End::Back, item);
    }

    /// Adds an item at the front and wakes one waiting consumer.
    pub fn push_front(&self, item: T) {
        self.inner.push(End::Front, item);
    }

    /// Removes the front item, blocking until there is one.
    #[must_use]
    pub fn wait_and_pop_front(&self) -> T {
        self.inner.wait_and_pop(End::Front)
    }

    /// Removes the back item, blocking until there is one.
    #[must_use]
    pub fn wait_and_pop_back(&self) -> T {
        self.inner.wait_and_pop(End::Back)
    }

    /// Removes the front item, blocking for at most `timeout` until there is one.
    #[must_use]
    pub fn wait_and_pop_front_timeout(&self, timeout: Duration) -> Option<T> {
        self.inner.wait_and_pop_timeout(End::Front, timeout)
    }

    /// Removes the back item, blocking for at most `timeout` until there is one.
    #[must_use]
    pub fn wait_and_pop_back_timeout(&self, timeout: Duration) -> Option<T> {
        self.inner.wait_and_pop_timeout(End::Back, timeout)
    }

    /// Removes the front item if there is one, without blocking.
    #[must_use]
    pub fn try_pop_front(&self) -> Option<T> {
        self.inner.try_pop(End::Front)
    }

    /// Removes the back item if there is one, without blocking.
    #[must_use]
    pub fn try_pop_back(&self) -> Option<T> {
        self.inner.try_pop(End::Back)
    }

    /// Whether the list holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of items in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Removes all items from the list.
    pub fn clear(&self) {
        self.inner.clear();
    }
}

impl<T: Clone> BlockingList<T> {
    /// A copy of the front item, if any.
    #[must_use]
    pub fn front(&self) -> Option<T> {
        self.inner.peek(End::Front)
    }

    /// A copy of the back item, if any.
    #[must_use]
    pub fn back(&self) -> Option<T> {
        self.inner.peek(End::Back)
    }
}

impl<T> Default for BlockingList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for BlockingList<T> {
    /// Creates a new, independent list holding a copy of the current items.
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.snapshot(),
        }
    }
}

impl<T> FromIterator<T> for BlockingList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            inner: SyncDeque::from_items(iter.into_iter().collect()),
        }
    }
}

impl<T> fmt::Debug for BlockingList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingList")
            .field("len", &self.len())
            .finish()
    }
}
