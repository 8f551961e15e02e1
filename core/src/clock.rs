//! Evaluation clock: the single source of "now" for alert timestamps.
//!
//! RULE: No rule reads the wall clock directly. The engine resolves
//! one instant per pass and hands it to every rule, so alerts in a
//! pass share a timestamp and a fixed clock makes a pass reproducible.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EvalClock {
    /// Stamp alerts with the wall clock at evaluation time.
    System,
    /// Stamp alerts with a pinned instant (tests, replays).
    Fixed { at: DateTime<Utc> },
}

impl Default for EvalClock {
    fn default() -> Self {
        Self::System
    }
}

impl EvalClock {
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed { at }
    }

    /// Pin the clock to midnight UTC of `date`.
    pub fn fixed_on(date: NaiveDate) -> Self {
        Self::Fixed {
            at: date.and_time(chrono::NaiveTime::MIN).and_utc(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System     => Utc::now(),
            Self::Fixed { at } => *at,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
