//! Inclusive date windows and the same-length previous window.

use crate::error::{PulseError, PulseResult};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive `[start, end]` range of calendar days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end:   NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> PulseResult<Self> {
        if start > end {
            return Err(PulseError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// The `days`-long window ending on `end` (inclusive).
    /// A zero-day request is treated as a single day; a window reaching
    /// past the calendar's first day starts on `NaiveDate::MIN`.
    pub fn trailing(end: NaiveDate, days: u32) -> Self {
        let span = i64::from(days.max(1)) - 1;
        Self {
            start: days_before(end, span),
            end,
        }
    }

    /// Number of calendar days covered, both ends included.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// The immediately preceding window of identical length,
    /// ending the day before this one begins.
    pub fn previous(&self) -> Self {
        let end = days_before(self.start, 1);
        Self {
            start: days_before(end, self.len_days() - 1),
            end,
        }
    }
}

/// `date - days`, saturating at `NaiveDate::MIN`.
fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|span| date.checked_sub_signed(span))
        .unwrap_or(NaiveDate::MIN)
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}
