//! Conversions between Unix-epoch milliseconds and the identifier's internal tick unit.
//!
//! The timestamp field counts 100-nanosecond ticks since 1582-10-15T00:00:00Z, the start
//! of the Gregorian calendar, and occupies 60 bits of the identifier.

use std::sync::OnceLock;

use chrono::{TimeZone, Utc};
use thiserror::Error;

/// Number of 100-nanosecond ticks per millisecond.
pub(crate) const TICKS_PER_MILLI: u64 = 10_000;

const MAX_TICKS: u64 = (1 << 60) - 1;

/// Error extracting a Unix timestamp from a value outside the time-based layout.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Error)]
pub enum InvalidFormat {
    /// The identifier does not carry the version 1 marker.
    #[error("can only extract the timestamp of time-based (version 1) identifiers")]
    NotTimeBased,
    /// The tick count does not fit the 60-bit timestamp field.
    #[error("tick count does not fit the 60-bit timestamp field")]
    TimestampOutOfRange,
}

/// Returns the Unix-epoch millisecond instant of the identifier epoch, computing it on
/// first use.
pub fn epoch_start_millis() -> i64 {
    static EPOCH: OnceLock<i64> = OnceLock::new();
    *EPOCH.get_or_init(|| {
        Utc.with_ymd_and_hms(1582, 10, 15, 0, 0, 0)
            .single()
            .expect("the identifier epoch is a valid UTC instant")
            .timestamp_millis()
    })
}

/// Converts a Unix-epoch millisecond value to the tick count relative to the identifier
/// epoch.
pub fn ticks_from_unix_millis(unix_ts_ms: i64) -> u64 {
    ((unix_ts_ms - epoch_start_millis()) * TICKS_PER_MILLI as i64) as u64
}

/// Converts a tick count relative to the identifier epoch back to a Unix-epoch millisecond
/// value.
///
/// Fails with [`InvalidFormat`] if the tick count does not fit the 60-bit timestamp field.
pub fn to_unix_millis(ticks: u64) -> Result<i64, InvalidFormat> {
    if ticks > MAX_TICKS {
        return Err(InvalidFormat::TimestampOutOfRange);
    }
    Ok((ticks / TICKS_PER_MILLI) as i64 + epoch_start_millis())
}
