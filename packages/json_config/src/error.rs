use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading, modifying or saving a JSON configuration file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The configuration file could not be read or written.
    #[error("cannot access configuration file '{}'", path.display())]
    Io {
        /// The configuration file.
        path: PathBuf,

        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid JSON.
    #[error("cannot parse configuration file '{}' at line {line}, column {column}", path.display())]
    Parse {
        /// The configuration file.
        path: PathBuf,

        /// One-based line of the first invalid character.
        line: usize,

        /// One-based column of the first invalid character.
        column: usize,

        /// The underlying parser error.
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be converted to JSON.
    #[error("cannot convert value to JSON")]
    Serialize(#[source] serde_json::Error),

    /// A write through a JSON pointer ran into a value that is neither an object nor an array,
    /// or the pointer itself is malformed.
    #[error("cannot write through JSON pointer '{pointer}': {problem}")]
    Pointer {
        /// The JSON pointer.
        pointer: String,

        /// A human-readable description of the problem.
        problem: String,
    },
}

/// A specialized `Result` type for configuration operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
