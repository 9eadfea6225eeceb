use std::collections::VecDeque;
use std::mem;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::constants::ERR_POISONED_LOCK;

/// Which end of the deque an operation works on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum End {
    Front,
    Back,
}

/// The locked deque and wake-up signal that both public collections are built on.
///
/// Every push wakes at most one waiting consumer. Consumers re-check for an item after waking,
/// so spurious wake-ups and races with non-blocking pops are harmless.
#[derive(Debug)]
pub(crate) struct SyncDeque<T> {
    items: Mutex<VecDeque<T>>,
    available: Condvar,
}

impl<T> SyncDeque<T> {
    pub(crate) fn new() -> Self {
        Self::from_items(VecDeque::new())
    }

    pub(crate) fn from_items(items: VecDeque<T>) -> Self {
        Self {
            items: Mutex::new(items),
            available: Condvar::new(),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().expect(ERR_POISONED_LOCK)
    }

    pub(crate) fn push(&self, end: End, item: T) {
        let mut items = self.lock();

        match end {
            End::Front => items.push_front(item),
            End::Back => items.push_back(item),
        }

        // Notify while holding the lock so the woken consumer cannot miss the item.
        self.available.notify_one();
    }

    pub(crate) fn try_pop(&self, end: End) -> Option<T> {
        pop(&mut self.lock(), end)
    }

    pub(crate) fn wait_and_pop(&self, end: End) -> T {
        let mut items = self
            .available
            .wait_while(self.lock(), |items| items.is_empty())
            .expect(ERR_POISONED_LOCK);

        pop(&mut items, end).expect("wait_while only returns once the deque is not empty")
    }

    pub(crate) fn wait_and_pop_timeout(&self, end: End, timeout: Duration) -> Option<T> {
        let (mut items, _) = self
            .available
            .wait_timeout_while(self.lock(), timeout, |items| items.is_empty())
            .expect(ERR_POISONED_LOCK);

        // Empty here means the timeout elapsed first.
        pop(&mut items, end)
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub(crate) fn clear(&self) {
        // Dropped outside the lock.
        let removed = mem::take(&mut *self.lock());
        drop(removed);
    }
}

impl<T: Clone> SyncDeque<T> {
    pub(crate) fn peek(&self, end: End) -> Option<T> {
        let items = self.lock();

        match end {
            End::Front => items.front().cloned(),
            End::Back => items.back().cloned(),
        }
    }

    pub(crate) fn snapshot(&self) -> Self {
        Self::from_items(self.lock().clone())
    }
}

fn pop<T>(items: &mut VecDeque<T>, end: End) -> Option<T> {
    match end {
        End::Front => items.pop_front(),
        End::Back => items.pop_back(),
    }
}
