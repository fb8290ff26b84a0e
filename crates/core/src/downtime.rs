//! Downtime duration accounting.
//!
//! A downtime log is *active* while its `ended_at` is null. Closing it sets
//! `ended_at` and `duration_minutes` together, exactly once. Active logs show
//! a live elapsed counter that is derived on read and never written.

use chrono::Duration;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

const MILLIS_PER_MINUTE: i64 = 60_000;

// ---------------------------------------------------------------------------
// Closing an active log
// ---------------------------------------------------------------------------

/// The values written back when an active log is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClosedDowntime {
    pub ended_at: Timestamp,
    pub duration_minutes: i64,
}

/// Whole minutes between `started_at` and `ended_at`, rounded half away
/// from zero on the millisecond difference.
pub fn duration_minutes(started_at: Timestamp, ended_at: Timestamp) -> i64 {
    round_minutes(ended_at - started_at)
}

fn round_minutes(elapsed: Duration) -> i64 {
    let ms = elapsed.num_milliseconds();
    let half = MILLIS_PER_MINUTE / 2;
    if ms >= 0 {
        (ms + half) / MILLIS_PER_MINUTE
    } else {
        -((-ms + half) / MILLIS_PER_MINUTE)
    }
}

/// Close an active downtime log at `ended_at`.
///
/// `current_ended_at` is the log's stored end time; a log that already has
/// one is closed and cannot be closed again.
pub fn close_downtime(
    started_at: Timestamp,
    current_ended_at: Option<Timestamp>,
    ended_at: Timestamp,
) -> Result<ClosedDowntime, CoreError> {
    if current_ended_at.is_some() {
        return Err(CoreError::Conflict(
            "Downtime log has already been ended".to_string(),
        ));
    }
    if ended_at < started_at {
        return Err(CoreError::Validation(format!(
            "ended_at ({ended_at}) must not be before started_at ({started_at})"
        )));
    }
    Ok(ClosedDowntime {
        ended_at,
        duration_minutes: duration_minutes(started_at, ended_at),
    })
}

/// Reject a client-supplied `field` timestamp that lies after `now`.
pub fn ensure_not_future(field: &str, at: Timestamp, now: Timestamp) -> Result<(), CoreError> {
    if at > now {
        return Err(CoreError::Validation(format!(
            "{field} ({at}) must not be in the future"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Live counter
// ---------------------------------------------------------------------------

/// Whole minutes elapsed since `started_at`, for the live display of an
/// active log. A start time in the future reads as zero.
pub fn live_elapsed_minutes(started_at: Timestamp, now: Timestamp) -> i64 {
    (now - started_at).num_minutes().max(0)
}

// ---------------------------------------------------------------------------
// Aggregate rollup
// ---------------------------------------------------------------------------

/// Read access to the two fields the rollup needs.
pub trait DowntimeRecord {
    fn ended_at(&self) -> Option<Timestamp>;
    fn duration_minutes(&self) -> Option<i64>;
}

/// Counts and total hours over a collection of logs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct DowntimeRollup {
    pub active: usize,
    pub historical: usize,
    /// Sum of closed durations in hours, rounded to one decimal place.
    pub total_hours: f64,
}

impl DowntimeRollup {
    pub fn from_logs<'a, T, I>(logs: I) -> Self
    where
        T: DowntimeRecord + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut active = 0;
        let mut historical = 0;
        let mut total_minutes: i64 = 0;

        for log in logs {
            if log.ended_at().is_none() {
                active += 1;
            } else {
                historical += 1;
                total_minutes += log.duration_minutes().unwrap_or(0);
            }
        }

        Self {
            active,
            historical,
            total_hours: minutes_to_hours_1dp(total_minutes),
        }
    }
}

/// Convert minutes to hours rounded to one decimal place.
pub fn minutes_to_hours_1dp(minutes: i64) -> f64 {
    (minutes as f64 / 60.0 * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Render a minute count as `"45m"`, `"2h"` or `"2h 5m"`.
///
/// Negative input renders as `"0m"`.
pub fn format_duration(minutes: i64) -> String {
    let minutes = minutes.max(0);
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let h = minutes / 60;
    let m = minutes % 60;
    if m == 0 {
        format!("{h}h")
    } else {
        format!("{h}h {m}m")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
