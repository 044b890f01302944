//! Timestamp encoding and elapsed-time breakdown.
//!
//! Timestamps are persisted as UTC wall-clock strings in
//! [`TIMESTAMP_FORMAT`] so that other tools reading the same store can parse
//! them without knowing anything about warden.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted timestamp layout (second precision, UTC).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Encode a timestamp for storage.
pub fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Decode a stored timestamp.
///
/// Returns `None` when the string does not follow [`TIMESTAMP_FORMAT`].
pub fn decode_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Whole days, hours and minutes between two instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elapsed {
    /// Whole days
    pub days: u64,
    /// Hours within the day (0-23)
    pub hours: u8,
    /// Minutes within the hour (0-59)
    pub minutes: u8,
}

impl Elapsed {
    /// Break down the time from `then` until `now`.
    ///
    /// A `then` in the future clamps to zero.
    pub fn between(then: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let secs = (now - then).num_seconds().max(0) as u64;
        let total_minutes = secs / 60;
        Self {
            days: total_minutes / (24 * 60),
            hours: ((total_minutes / 60) % 24) as u8,
            minutes: (total_minutes % 60) as u8,
        }
    }
}
