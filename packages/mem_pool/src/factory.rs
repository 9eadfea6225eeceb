/// Constructs new elements for a pool.
///
/// A pool keeps its factory for its whole lifetime and calls it for every pre-allocated element
/// and every on-demand growth step. Any construction parameters are captured by the factory,
/// which is how the same arguments reach every element the pool creates.
///
/// The trait is implemented for every `Fn() -> T` closure or function that can be shared between
/// threads, so a closure is the usual way to supply one.
///
/// # Example
///
/// ```
/// use mem_pool::{InstanceRegistry, PoolConfig};
///
/// let buffer_size = 4096;
///
/// let registry = InstanceRegistry::<Vec<u8>>::new();
/// let pool = registry.create(PoolConfig::bounded(2, 8), move || {
///     Vec::with_capacity(buffer_size)
/// });
///
/// assert_eq!(pool.allocated_count(), 2);
/// ```
pub trait Factory<T>: Send + Sync {
    /// Creates one new element.
    fn create(&self) -> T;
}

impl<T, F> Factory<T> for F
where
    F: Fn() -> T + Send + Sync,
{
    fn create(&self) -> T {
        self()
    }
}
