#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Wall-clock timestamps and scope timers.
//!
//! * [`timestamp_ms()`], [`utc_date_time()`] and [`local_date_time()`] read the system clock as
//!   milliseconds since the Unix epoch and as a `yyyy-MM-dd hh:mm:ss.zzz` string in UTC or in the
//!   local time zone.
//! * [`ScopedTimer`] and the [`time_scope!`] macro measure how long a scope takes and log the
//!   result through `tracing` when the scope ends.
//!
//! # Example
//!
//! ```
//! use timing::{Verbosity, time_scope};
//!
//! tracing_subscriber::fmt().init();
//!
//! let started_at = timing::utc_date_time();
//!
//! {
//!     time_scope!(format!("job started at {started_at}"), Verbosity::Normal);
//!     // ...
//! }
//! ```

mod timer;
mod verbosity;
mod wall_clock;

pub use timer::*;
pub use verbosity::*;
pub use wall_clock::*;
