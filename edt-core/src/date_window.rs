//! Sliding date window for fetching events.

use std::fmt;

use chrono::{Duration, NaiveDate};

/// Inclusive range of dates requested from the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Window from `today - days_before` to `today + days_after`.
    pub fn sliding(today: NaiveDate, days_before: i64, days_after: i64) -> Self {
        DateWindow {
            start: today - Duration::days(days_before),
            end: today + Duration::days(days_after),
        }
    }

    /// `start` as YYYY-MM-DD, the form portals expect in query strings.
    pub fn start_param(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// `end` as YYYY-MM-DD.
    pub fn end_param(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}
