use std::fmt;
use std::panic::Location;
use std::time::{Duration, Instant};

use tracing::info;

use crate::Verbosity;

/// Measures how long a scope takes and logs it when dropped.
///
/// The record is emitted as a `tracing` event at the info level, carrying the verbosity level,
/// the source location where the timer was created and the elapsed time in milliseconds.
///
/// The [`time_scope!`][crate::time_scope] macro creates a timer that lives until the end of the
/// enclosing scope.
///
/// # Example
///
/// ```
/// use timing::{ScopedTimer, Verbosity};
///
/// fn load_everything() {
///     let _timer = ScopedTimer::new("load everything", Verbosity::Normal);
///
///     // ... work ...
/// } // Logs something like "[Level 3 src/loader.rs: 4] 12ms load everything".
/// # load_everything();
/// ```
#[must_use = "the timer measures until it is dropped, so dropping it immediately measures nothing"]
pub struct ScopedTimer {
    info: String,
    verbosity: Verbosity,
    location: &'static Location<'static>,
    started: Instant,
}

impl ScopedTimer {
    /// Starts a timer, remembering the caller's source location for the log record.
    #[track_caller]
    pub fn new(info: impl Into<String>, verbosity: Verbosity) -> Self {
        Self {
            info: info.into(),
            verbosity,
            location: Location::caller(),
            started: Instant::now(),
        }
    }

    /// Time passed since the timer was started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// What is being timed.
    #[must_use]
    pub fn info(&self) -> &str {
        &self.info
    }

    /// The verbosity level attached to the log record.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Where the timer was created.
    #[must_use]
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl Drop for ScopedTimer {
    #[cfg_attr(test, mutants::skip)] // Only logs.
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed().as_millis();

        info!(
            verbosity = self.verbosity.level(),
            file = self.location.file(),
            line = self.location.line(),
            elapsed_ms,
            "[Level {} {}: {}] {}ms {}",
            self.verbosity,
            self.location.file(),
            self.location.line(),
            elapsed_ms,
            self.info
        );
    }
}

impl fmt::Debug for ScopedTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedTimer")
            .field("info", &self.info)
            .field("verbosity", &self.verbosity)
            .field("location", &self.location)
            .field("elapsed", &self.elapsed())
            .finish()
    }
}

/// Times the rest of the enclosing scope and logs the result when the scope ends.
///
/// The verbosity defaults to [`Verbosity::Low`].
///
/// # Example
///
/// ```
/// use timing::{Verbosity, time_scope};
///
/// fn handle_request() {
///     time_scope!("handle request");
///
///     {
///         time_scope!("parse body", Verbosity::High);
///         // ...
///     } // "parse body" is logged here.
///
///     // ...
/// } // "handle request" is logged here.
/// # handle_request();
/// ```
#[macro_export]
macro_rules! time_scope {
    ($info:expr) => {
        let _timer = $crate::ScopedTimer::new($info, $crate::Verbosity::Low);
    };
    ($info:expr, $verbosity:expr) => {
        let _timer = $crate::ScopedTimer::new($info, $verbosity);
    };
}
