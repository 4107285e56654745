//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for event times and action lifecycle times.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Return the current time, clamped so it never precedes `previous`.
///
/// Wall clocks can step backwards; logs that promise non-decreasing
/// timestamps stamp their entries with this.
#[must_use]
pub fn now_after(previous: Option<Timestamp>) -> Timestamp {
    let current = now();
    match previous {
        Some(prev) if prev > current => prev,
        _ => current,
    }
}
