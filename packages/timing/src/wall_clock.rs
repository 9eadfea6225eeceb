use std::fmt;

use chrono::{DateTime, Local, TimeZone, Utc};

/// Format of [`utc_date_time()`] and [`local_date_time()`]: `yyyy-MM-dd hh:mm:ss.zzz`.
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Milliseconds since the Unix epoch, according to the system clock.
///
/// The value follows adjustments of the system clock, so it is not suitable for measuring
/// durations. Use [`ScopedTimer`][crate::ScopedTimer] or [`std::time::Instant`] for that.
#[must_use]
pub fn timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// The current UTC date and time in the format `yyyy-MM-dd hh:mm:ss.zzz`.
///
/// # Example
///
/// ```
/// let now = timing::utc_date_time();
///
/// // e.g. "2019-08-22 14:03:07.215"
/// assert_eq!(now.len(), 23);
/// ```
#[must_use]
pub fn utc_date_time() -> String {
    format_date_time(Utc::now())
}

/// The current date and time in the system's local time zone, in the format
/// `yyyy-MM-dd hh:mm:ss.zzz`.
#[must_use]
pub fn local_date_time() -> String {
    format_date_time(Local::now())
}

/// Formats a date and time as `yyyy-MM-dd hh:mm:ss.zzz`, in the time zone it carries.
#[must_use]
pub fn format_date_time<Tz>(date_time: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    date_time.format(DATE_TIME_FORMAT).to_string()
}
