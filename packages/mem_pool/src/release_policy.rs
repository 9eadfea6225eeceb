/// Determines what happens to a pooled element when the last clone of its handle is dropped.
///
/// By default, dropping the handle releases the element back to the pool.
///
/// # Examples
///
/// ```
/// use mem_pool::{InstanceRegistry, PoolConfig, ReleasePolicy};
///
/// let registry = InstanceRegistry::<String>::new();
/// let pool = registry.create(PoolConfig::bounded(1, 1), String::new);
///
/// let handle = pool.acquire(ReleasePolicy::Manual).unwrap();
/// let key = handle.key();
/// drop(handle);
///
/// // Still checked out - manual handles never release on drop.
/// assert_eq!(pool.used_count(), 1);
///
/// assert!(pool.release(key));
/// assert_eq!(pool.used_count(), 0);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum ReleasePolicy {
    /// The element is reset and returned to the pool when the last handle clone is dropped.
    /// This is the default.
    #[default]
    Auto,

    /// Dropping the handle does nothing. The caller releases the element explicitly by passing
    /// the handle's [`ItemKey`][crate::ItemKey] to the pool's `release()`.
    ///
    /// An element that is never released stays checked out for the lifetime of the pool.
    Manual,
}

impl ReleasePolicy {
    /// Whether dropping the handle releases the element.
    #[must_use]
    pub fn releases_on_drop(self) -> bool {
        matches!(self, Self::Auto)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_is_auto() {
        assert_eq!(ReleasePolicy::default(), ReleasePolicy::Auto);
        assert!(ReleasePolicy::Auto.releases_on_drop());
        assert!(!ReleasePolicy::Manual.releases_on_drop());
    }
}
