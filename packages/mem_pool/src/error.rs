use thiserror::Error;

/// Errors that can occur when creating, looking up or using object pools.
///
/// Exhaustion of a bounded pool is not an error - acquire operations return `None` instead,
/// leaving the caller to decide whether to retry or fail. Releasing an element that is not
/// checked out is likewise not an error but a no-op.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The pool configuration cannot be used for the requested kind of pool.
    #[error("invalid pool configuration: {problem}")]
    InvalidConfig {
        /// A human-readable description of the problem.
        problem: String,
    },

    /// A singleton pool for this element type already exists in the registry.
    #[error("a singleton pool for '{type_name}' has already been created")]
    AlreadyCreated {
        /// Name of the element type.
        type_name: &'static str,
    },

    /// No singleton pool for this element type has been created in the registry.
    #[error("no singleton pool for '{type_name}' has been created")]
    NotCreated {
        /// Name of the element type.
        type_name: &'static str,
    },

    /// The pool that owned the element behind a handle has already been destroyed.
    #[error("the pool that owned this element has been destroyed")]
    PoolDestroyed,

    /// The element behind a handle has already been released back to its pool.
    #[error("the element behind this handle has already been released")]
    StaleHandle,
}

/// A specialized `Result` type for pool operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
