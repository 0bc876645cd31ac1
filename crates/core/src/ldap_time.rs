//! Conversion of directory-native timestamps (100-ns ticks since 1601-01-01)
//! to calendar dates and inactivity spans.

use chrono::{DateTime, TimeZone, Utc};

use crate::models::ticket::DAYS_INACTIVE_NEVER;

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_EPOCH_DELTA: i64 = 11_644_473_600;
/// 100-ns ticks per second.
const TICKS_PER_SECOND: i64 = 10_000_000;
/// Values further than this in the future are treated as garbage.
const MAX_FUTURE_SECS: i64 = 10 * 365 * 24 * 3600;

/// Convert a last-logon tick value to a UTC timestamp.
///
/// Returns `None` for zero/negative ticks, values before the unix epoch, and
/// values more than ~10 years in the future (never-logged-in or corrupt).
pub fn filetime_to_utc(ticks: i64) -> Option<DateTime<Utc>> {
    if ticks <= 0 {
        return None;
    }
    let unix_secs = ticks / TICKS_PER_SECOND - FILETIME_UNIX_EPOCH_DELTA;
    if unix_secs < 0 || unix_secs > Utc::now().timestamp() + MAX_FUTURE_SECS {
        return None;
    }
    Utc.timestamp_opt(unix_secs, 0).single()
}

/// Days of inactivity since `last_logon`, rounded up; [`DAYS_INACTIVE_NEVER`]
/// when no valid last logon exists.
pub fn days_inactive(last_logon: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    match last_logon {
        Some(logon) => {
            let secs = (now - logon).num_seconds();
            if secs <= 0 {
                0
            } else {
                // ceiling division: any partial day counts as a full one
                (secs + 86_399) / 86_400
            }
        }
        None => DAYS_INACTIVE_NEVER,
    }
}

/// Convenience wrapper: ticks straight to days of inactivity.
pub fn days_inactive_from_ticks(ticks: Option<i64>, now: DateTime<Utc>) -> i64 {
    days_inactive(ticks.and_then(filetime_to_utc), now)
}
