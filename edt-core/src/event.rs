//! Portal-neutral timetable events.
//!
//! Portal clients convert their API responses into these types; the fetcher
//! and the calendar writer work exclusively with them.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single timetable event as reported by the portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Portal identifier, used to derive a stable UID when present
    pub id: Option<String>,
    pub course: Option<String>,
    /// Kind of session (e.g. "CM", "TD", "TP")
    pub category: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(default)]
    pub rooms: Vec<String>,
    #[serde(default)]
    pub sites: Vec<String>,
    #[serde(default)]
    pub professors: Vec<String>,
    pub department: Option<String>,
}

impl Event {
    /// An event with only a time span; every other field empty.
    pub fn new(start: EventTime, end: EventTime) -> Self {
        Event {
            id: None,
            course: None,
            category: None,
            start,
            end,
            rooms: Vec::new(),
            sites: Vec::new(),
            professors: Vec::new(),
            department: None,
        }
    }
}

/// Start or end of an event.
///
/// Portals usually send wall-clock times without an offset; those stay
/// `Naive` until the writer attaches the configured timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    Naive(NaiveDateTime),
    Aware(DateTime<FixedOffset>),
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

impl EventTime {
    /// Parse a portal timestamp: RFC 3339 first, then the usual naive forms.
    pub fn parse(s: &str) -> Option<EventTime> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(EventTime::Aware(dt));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(EventTime::Naive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_naive_portal_timestamp() {
        let expected = NaiveDate::from_ymd_opt(2025, 10, 20)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();

        assert_eq!(
            EventTime::parse("2025-10-20T08:30:00"),
            Some(EventTime::Naive(expected))
        );
        assert_eq!(
            EventTime::parse("2025-10-20T08:30"),
            Some(EventTime::Naive(expected))
        );
    }

    #[test]
    fn test_parse_offset_timestamp_is_aware() {
        let parsed = EventTime::parse("2025-10-20T08:30:00+02:00").unwrap();
        match parsed {
            EventTime::Aware(dt) => {
                assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
            }
            EventTime::Naive(_) => panic!("expected an aware time, got {:?}", parsed),
        }
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(EventTime::parse("next tuesday"), None);
        assert_eq!(EventTime::parse(""), None);
    }
}
