use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Factory, InstancePool, InstanceRegistry, PoolRegistry, Reset, Result};

/// Sizing policy of a pool: how many elements to create up front and how many may exist at most.
///
/// A `max_allocation` of zero means the pool is unbounded and grows one element at a time for as
/// long as callers keep elements checked out. Singleton pools must be bounded.
///
/// The configuration can be deserialized, so it can live in a configuration file:
///
/// ```
/// use mem_pool::PoolConfig;
///
/// let config: PoolConfig =
///     serde_json::from_str(r#"{ "pre_allocate": 4, "max_allocation": 16 }"#).unwrap();
///
/// assert_eq!(config, PoolConfig::bounded(4, 16));
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    pre_allocate: usize,
    max_allocation: usize,
}

impl PoolConfig {
    /// A pool that never holds more than `max_allocation` elements, `pre_allocate` of which are
    /// created immediately.
    #[must_use]
    pub const fn bounded(pre_allocate: usize, max_allocation: usize) -> Self {
        Self {
            pre_allocate,
            max_allocation,
        }
    }

    /// A pool that grows without limit, `pre_allocate` elements of which are created immediately.
    #[must_use]
    pub const fn unbounded(pre_allocate: usize) -> Self {
        Self {
            pre_allocate,
            max_allocation: 0,
        }
    }

    /// Number of elements created when the pool is created.
    #[must_use]
    pub fn pre_allocate(&self) -> usize {
        self.pre_allocate
    }

    /// Maximum number of elements the pool may ever hold, zero meaning no limit.
    #[must_use]
    pub fn max_allocation(&self) -> usize {
        self.max_allocation
    }

    /// Whether the pool may grow without limit.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.max_allocation == 0
    }

    /// Returns a configuration that a pool engine can use as-is.
    ///
    /// Asking for more pre-allocated elements than the cap allows is not rejected. The
    /// pre-allocation is clamped to the cap and a warning is logged.
    #[must_use]
    pub(crate) fn sanitized(self) -> Self {
        if !self.is_unbounded() && self.pre_allocate > self.max_allocation {
            warn!(
                pre_allocate = self.pre_allocate,
                max_allocation = self.max_allocation,
                "pre-allocation exceeds the allocation cap, clamping it to the cap"
            );

            return Self {
                pre_allocate: self.max_allocation,
                ..self
            };
        }

        self
    }
}

/// Builder for pool configuration and for creating pools from it.
///
/// # Examples
///
/// ```
/// use mem_pool::{InstancePool, ReleasePolicy};
///
/// let pool = InstancePool::builder()
///     .pre_allocate(4)
///     .max_allocation(16)
///     .build(|| String::with_capacity(256));
///
/// assert_eq!(pool.allocated_count(), 4);
/// assert_eq!(pool.max_count(), 16);
///
/// let greeting = pool.acquire(ReleasePolicy::Auto).unwrap();
/// greeting.with_mut(|s| s.push_str("hello")).unwrap();
/// ```
#[must_use]
pub struct PoolBuilder<T> {
    config: PoolConfig,

    _element: PhantomData<fn() -> T>,
}

impl<T> PoolBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            config: PoolConfig::default(),
            _element: PhantomData,
        }
    }

    /// Sets how many elements are created together with the pool. Defaults to zero.
    pub fn pre_allocate(mut self, count: usize) -> Self {
        self.config.pre_allocate = count;
        self
    }

    /// Sets the maximum number of elements the pool may hold. Defaults to zero, which means the
    /// pool is unbounded.
    pub fn max_allocation(mut self, count: usize) -> Self {
        self.config.max_allocation = count;
        self
    }

    /// Replaces the whole configuration, e.g. with one loaded from a configuration file.
    pub fn config(mut self, config: PoolConfig) -> Self {
        self.config = config;
        self
    }

    /// The configuration collected so far.
    #[must_use]
    pub fn to_config(&self) -> PoolConfig {
        self.config
    }
}

impl<T: Reset + Send + 'static> PoolBuilder<T> {
    /// Creates an instance pool in the process-wide registry for `T`.
    pub fn build<F>(self, factory: F) -> InstancePool<T>
    where
        F: Factory<T> + 'static,
    {
        InstanceRegistry::<T>::global().create(self.config, factory)
    }

    /// Creates an instance pool in the process-wide registry for `T`, constructing elements with
    /// [`Default::default()`].
    pub fn build_default(self) -> InstancePool<T>
    where
        T: Default,
    {
        self.build(T::default)
    }

    /// Creates an instance pool in the given registry.
    pub fn build_in<F>(self, registry: &InstanceRegistry<T>, factory: F) -> InstancePool<T>
    where
        F: Factory<T> + 'static,
    {
        registry.create(self.config, factory)
    }

    /// Creates the singleton pool for `T` in the given registry.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is unbounded or if the registry already has a pool for `T`.
    pub fn build_singleton<F>(self, registry: &PoolRegistry, factory: F) -> Result<()>
    where
        F: Factory<T> + 'static,
    {
        registry.create::<T, F>(self.config, factory)
    }
}

impl<T> Default for PoolBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for PoolBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolBuilder")
            .field("config", &self.config)
            .finish()
    }
}
