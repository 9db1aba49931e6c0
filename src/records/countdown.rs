use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::records::types::Milestone;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Time left before a milestone is auto-approved by the backend.
///
/// Only the countdown is computed here; the approval itself is scheduled and
/// executed elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Countdown {
    Remaining {
        days: i64,
        hours: u32,
        minutes: u32,
        seconds: u32,
    },
    Expired,
}

impl Countdown {
    pub fn until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let total = (deadline - now).num_seconds();
        if total <= 0 {
            return Countdown::Expired;
        }

        let days = total / SECONDS_PER_DAY;
        let rest = total % SECONDS_PER_DAY;
        Countdown::Remaining {
            days,
            hours: (rest / 3600) as u32,
            minutes: (rest % 3600 / 60) as u32,
            seconds: (rest % 60) as u32,
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Countdown::Expired)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Remaining {
                days,
                hours,
                minutes,
                seconds,
            } => write!(f, "{days}d {hours:02}h {minutes:02}m {seconds:02}s"),
            Countdown::Expired => f.write_str("expired"),
        }
    }
}

impl Milestone {
    pub fn auto_approval_countdown(&self, now: DateTime<Utc>) -> Option<Countdown> {
        self.auto_approve_at
            .map(|deadline| Countdown::until(deadline, now))
    }
}
