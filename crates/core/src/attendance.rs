//! Attendance session rules: status values, timestamp parsing, and the
//! checkout window computation shared by member and visitor checkout.
//!
//! Elapsed time is always measured from the *stored* session start, never
//! from a start time the kiosk claims. Minutes are whole minutes, rounded
//! down.

use chrono::{DateTime, Duration, Utc};

use crate::error::Rejection;
use crate::types::Timestamp;

/// Session is in progress.
pub const SESSION_OPEN: &str = "open";

/// Session has been checked out and is immutable.
pub const SESSION_CLOSED: &str = "closed";

/// How far past "now" a submitted end time may lie (kiosk clock skew plus
/// pre-filled checkout forms).
pub const MAX_END_AHEAD_MINS: i64 = 6 * 60;

/// Default slack allowed between claimed and elapsed minutes.
pub const DEFAULT_MINUTES_TOLERANCE: i64 = 5;

/// Parse an RFC 3339 timestamp submitted by a kiosk.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp, Rejection> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Rejection::MalformedTimestamp)
}

/// Whole minutes between `start` and `end`, rounded down, never negative.
pub fn elapsed_minutes(start: Timestamp, end: Timestamp) -> i64 {
    (end - start).num_minutes().max(0)
}

/// The validated time span of a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutWindow {
    pub start: Timestamp,
    pub end: Timestamp,
    /// Minutes between stored start and submitted end.
    pub elapsed_minutes: i64,
    /// Minutes to record and allocate.
    pub total_minutes: i64,
}

/// Validate a checkout against the stored session start.
///
/// - `end` must not precede `start` and must not be more than
///   [`MAX_END_AHEAD_MINS`] after `now`.
/// - `claimed` minutes, when given, may undercut the elapsed time but may
///   exceed it by at most `tolerance`; the recorded total is then
///   `min(claimed, elapsed)`.
pub fn checkout_window(
    start: Timestamp,
    end: Timestamp,
    now: Timestamp,
    claimed: Option<i64>,
    tolerance: i64,
) -> Result<CheckoutWindow, Rejection> {
    if end < start {
        return Err(Rejection::EndBeforeStart);
    }
    if end > now + Duration::minutes(MAX_END_AHEAD_MINS) {
        return Err(Rejection::EndTooFarAhead);
    }

    let elapsed = elapsed_minutes(start, end);
    let total = match claimed {
        None => elapsed,
        Some(m) if m < 0 => return Err(Rejection::NegativeMinutes),
        Some(m) if m > elapsed + tolerance.max(0) => {
            return Err(Rejection::MinutesExceedElapsed)
        }
        Some(m) => m.min(elapsed),
    };

    Ok(CheckoutWindow {
        start,
        end,
        elapsed_minutes: elapsed,
        total_minutes: total,
    })
}
