//! Delivery scheduling for outbound messages.
//!
//! Callers express a delay as an (amount, unit) pair. Duration units are
//! converted to an absolute `send_after` instant against an injected clock;
//! the `timezone` unit passes a clock-time string through so the provider
//! delivers at that local time per recipient.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Applied by the delayed endpoints when the caller omits `delayAmount`.
pub const DEFAULT_DELAY_SECONDS: i64 = 30;

const VALID_UNITS: [&str; 5] = ["seconds", "minutes", "hours", "days", "timezone"];

/// Delay magnitude as supplied by the caller.
///
/// Duration units carry a number of units; the `timezone` unit carries a
/// clock-time string such as `"9:00AM"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DelayAmount {
    Duration(i64),
    ClockTime(String),
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Invalid delay unit: {0}. Expected one of seconds, minutes, hours, days, timezone")]
    InvalidUnit(String),

    #[error("delayAmount must be a number when delayUnit is {0}")]
    InvalidAmount(String),

    #[error("delayAmount is out of range")]
    AmountOutOfRange,
}

/// Normalized delivery directive, ready to merge into a provider payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendDirective {
    /// Deliver no earlier than this absolute instant.
    SendAfter(DateTime<Utc>),
    /// Deliver at this local clock time in each recipient's timezone.
    TimeOfDay(String),
}

impl SendDirective {
    /// Wire representation of the `send_after` instant.
    pub fn send_after_rfc3339(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Human-readable schedule summary for response envelopes.
    pub fn summary(&self) -> String {
        match self {
            SendDirective::SendAfter(ts) => Self::send_after_rfc3339(ts),
            SendDirective::TimeOfDay(time) => format!("{time} (recipient local time)"),
        }
    }
}

/// Membership predicate over the recognized delay units.
pub fn is_valid_unit(unit: &str) -> bool {
    VALID_UNITS.contains(&unit)
}

fn unit_factor(unit: &str) -> Option<i64> {
    match unit {
        "seconds" => Some(1),
        "minutes" => Some(60),
        "hours" => Some(3600),
        "days" => Some(86400),
        _ => None,
    }
}

/// Convert an (amount, unit) pair into a [`SendDirective`].
///
/// Deterministic given the injected clock: duration units yield
/// `now() + amount * factor`, the `timezone` unit passes the literal amount
/// through untouched.
pub fn normalize<F>(amount: &DelayAmount, unit: &str, now: F) -> Result<SendDirective, ScheduleError>
where
    F: Fn() -> DateTime<Utc>,
{
    if unit == "timezone" {
        let time_of_day = match amount {
            DelayAmount::ClockTime(s) => s.clone(),
            DelayAmount::Duration(n) => n.to_string(),
        };
        return Ok(SendDirective::TimeOfDay(time_of_day));
    }

    let factor =
        unit_factor(unit).ok_or_else(|| ScheduleError::InvalidUnit(unit.to_string()))?;

    let seconds = match amount {
        DelayAmount::Duration(n) => n
            .checked_mul(factor)
            .ok_or(ScheduleError::AmountOutOfRange)?,
        DelayAmount::ClockTime(_) => {
            return Err(ScheduleError::InvalidAmount(unit.to_string()));
        }
    };

    let delta =
        chrono::Duration::try_seconds(seconds).ok_or(ScheduleError::AmountOutOfRange)?;
    let send_after = now()
        .checked_add_signed(delta)
        .ok_or(ScheduleError::AmountOutOfRange)?;

    Ok(SendDirective::SendAfter(send_after))
}
