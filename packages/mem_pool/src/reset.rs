use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::BuildHasher;

/// Restores a pooled element to a reusable state.
///
/// Every type stored in a pool implements this trait. The pool calls [`reset()`][Self::reset]
/// when an element is released, before the element becomes available to the next caller, so
/// nothing written by one user is ever observed by the next one.
///
/// Implementations should keep whatever makes the element worth pooling (allocated capacity,
/// open buffers) and discard everything else.
///
/// # Example
///
/// ```
/// use mem_pool::Reset;
///
/// struct Frame {
///     sequence: u64,
///     payload: Vec<u8>,
/// }
///
/// impl Reset for Frame {
///     fn reset(&mut self) {
///         self.sequence = 0;
///         self.payload.clear();
///     }
/// }
/// ```
pub trait Reset {
    /// Clears caller-visible state, keeping the element reusable.
    fn reset(&mut self);
}

impl Reset for String {
    fn reset(&mut self) {
        self.clear();
    }
}

impl<T> Reset for Vec<T> {
    fn reset(&mut self) {
        self.clear();
    }
}

impl<T> Reset for VecDeque<T> {
    fn reset(&mut self) {
        self.clear();
    }
}

impl<K, V, S: BuildHasher> Reset for HashMap<K, V, S> {
    fn reset(&mut self) {
        self.clear();
    }
}

impl<T, S: BuildHasher> Reset for HashSet<T, S> {
    fn reset(&mut self) {
        self.clear();
    }
}

impl<K, V> Reset for BTreeMap<K, V> {
    fn reset(&mut self) {
        self.clear();
    }
}

impl<T> Reset for BTreeSet<T> {
    fn reset(&mut self) {
        self.clear();
    }
}

impl<T> Reset for Option<T> {
    fn reset(&mut self) {
        *self = None;
    }
}

impl<T: Reset + ?Sized> Reset for Box<T> {
    fn reset(&mut self) {
        (**self).reset();
    }
}
