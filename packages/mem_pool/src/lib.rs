#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Thread-safe pools of reusable objects.
//!
//! A pool pre-allocates a number of elements, lends them out on request, grows on demand up to a
//! configured cap and takes elements back after resetting them to a reusable state. Acquiring
//! from an exhausted pool never blocks - it returns `None` and leaves the decision to the caller.
//!
//! Two variants are offered:
//!
//! * **Instance pools** ([`InstancePool`]), any number of which can exist for the same element
//!   type. Each is created through an [`InstanceRegistry`] and lives for as long as anything -
//!   a pool reference or an element handle - still refers to it.
//! * **Singleton pools** ([`SingletonPool`]), at most one per element type per
//!   [`PoolRegistry`]. The pool must be created explicitly before it can be looked up and belongs
//!   to the registry rather than to the handles of its elements.
//!
//! # Elements
//!
//! Element types implement [`Reset`], which is called whenever an element returns to the pool.
//! New elements are produced by a [`Factory`], which is implemented for every
//! `Fn() -> T + Send + Sync` closure. The acquire operations come in three flavors:
//!
//! * `acquire()` grows the pool through its factory if no free element exists.
//! * `acquire_with()` grows the pool through a one-off constructor, e.g. to build the element
//!   from caller-provided arguments.
//! * `acquire_existing()` never grows the pool.
//!
//! # Handles and release
//!
//! Acquire operations return a handle ([`Pooled`] or [`SingletonPooled`]) that gives access to
//! the element under the pool lock. With [`ReleasePolicy::Auto`] the element is released when
//! the last clone of the handle is dropped. With [`ReleasePolicy::Manual`] the caller releases it
//! explicitly by passing the handle's [`ItemKey`] to the pool. Releasing a key that is not
//! checked out - twice, after the element was handed to someone else, or to the wrong pool -
//! does nothing.
//!
//! # Example
//!
//! ```
//! use mem_pool::{InstancePool, ReleasePolicy};
//!
//! let pool = InstancePool::builder()
//!     .pre_allocate(2)
//!     .max_allocation(2)
//!     .build(|| Vec::<u8>::with_capacity(1024));
//!
//! let first = pool.acquire(ReleasePolicy::Auto).unwrap();
//! let second = pool.acquire(ReleasePolicy::Auto).unwrap();
//!
//! // The pool is exhausted.
//! assert!(pool.acquire(ReleasePolicy::Auto).is_none());
//!
//! first.with_mut(|buffer| buffer.extend_from_slice(b"data")).unwrap();
//! drop(first);
//!
//! // The released buffer comes back empty.
//! let reused = pool.acquire(ReleasePolicy::Auto).unwrap();
//! assert!(reused.with(Vec::is_empty).unwrap());
//! # drop(second);
//! ```
//!
//! # Logging
//!
//! The pools emit [`tracing`] events: warnings for configuration that had to be adjusted or was
//! rejected, debug events for pool creation and teardown and trace events for ignored releases.

mod builder;
mod constants;
mod error;
mod factory;
mod instance;
mod key;
mod pooled;
mod raw;
mod release_policy;
mod reset;
mod shared;
mod singleton;
mod singleton_pooled;
mod type_map;

pub use builder::*;
pub use error::*;
pub use factory::*;
pub use instance::*;
pub use key::*;
pub use pooled::*;
pub use raw::*;
pub use release_policy::*;
pub use reset::*;
pub use singleton::*;
pub use singleton_pooled::*;
