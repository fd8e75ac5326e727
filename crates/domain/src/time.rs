//! Timestamps.

use chrono::{DateTime, Utc};

/// UTC timestamp used for `last_changed`, `last_updated` and event times.
pub type Timestamp = DateTime<Utc>;

/// The current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
