//! Calendar built from fetched events.
//!
//! Mapping is one entry per event, in input order. An empty input produces a
//! single placeholder entry so the published file is never empty.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, SubsecRound, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};
use uuid::Uuid;

use crate::constants::{
    DEFAULT_COURSE_TITLE, DEFAULT_PRODID, DEFAULT_TIMEZONE, PLACEHOLDER_MINUTES,
    PLACEHOLDER_SUMMARY, UID_DOMAIN,
};
use crate::event::{Event, EventTime};

/// Settings that shape the generated calendar.
#[derive(Debug, Clone)]
pub struct CalendarOptions {
    pub prodid: String,
    /// Zone attached to naive event times
    pub timezone: Tz,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        CalendarOptions {
            prodid: DEFAULT_PRODID.to_string(),
            timezone: DEFAULT_TIMEZONE,
        }
    }
}

/// Start or end of a calendar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryTime {
    /// Written with a `Z` suffix
    Utc(DateTime<Utc>),
    /// Written as local time with a TZID parameter
    Zoned(DateTime<Tz>),
}

impl EntryTime {
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            EntryTime::Utc(dt) => *dt,
            EntryTime::Zoned(dt) => dt.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEntry {
    pub uid: String,
    pub summary: String,
    pub start: EntryTime,
    pub end: EntryTime,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Calendar {
    pub prodid: String,
    pub version: String,
    /// Never empty
    pub entries: Vec<CalendarEntry>,
}

impl Calendar {
    /// Build the calendar for `events`; `now` only matters when `events` is empty.
    pub fn from_events(events: &[Event], options: &CalendarOptions, now: DateTime<Utc>) -> Self {
        let entries = if events.is_empty() {
            vec![placeholder_entry(now)]
        } else {
            events
                .iter()
                .map(|event| entry_from_event(event, options.timezone))
                .collect()
        };

        Calendar {
            prodid: options.prodid.clone(),
            version: "2.0".to_string(),
            entries,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.entries.len() == 1 && self.entries[0].summary == PLACEHOLDER_SUMMARY
    }
}

/// Map one portal event to a calendar entry.
pub fn entry_from_event(event: &Event, timezone: Tz) -> CalendarEntry {
    let summary = summary_for(event);
    let start = localize(event.start, timezone);
    let end = localize(event.end, timezone);
    let uid = match non_blank(&event.id) {
        Some(id) => format!("{}@{}", id, UID_DOMAIN),
        None => derived_uid(&summary, &start, &end),
    };

    CalendarEntry {
        uid,
        summary,
        start,
        end,
        location: location_for(event),
        description: description_for(event),
    }
}

/// Entry standing in for an empty timetable: `now` to `now + 30 min`.
pub fn placeholder_entry(now: DateTime<Utc>) -> CalendarEntry {
    let start = EntryTime::Utc(now.trunc_subsecs(0));
    let end = EntryTime::Utc(start.to_utc() + Duration::minutes(PLACEHOLDER_MINUTES));
    let summary = PLACEHOLDER_SUMMARY.to_string();

    CalendarEntry {
        uid: derived_uid(&summary, &start, &end),
        summary,
        start,
        end,
        location: None,
        description: None,
    }
}

/// "Course [category]", falling back to "Cours" without a course name.
fn summary_for(event: &Event) -> String {
    let course = non_blank(&event.course).unwrap_or(DEFAULT_COURSE_TITLE);
    match non_blank(&event.category) {
        Some(category) => format!("{} [{}]", course, category),
        None => course.to_string(),
    }
}

fn location_for(event: &Event) -> Option<String> {
    let parts: Vec<String> = [join_present(&event.rooms), join_present(&event.sites)]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();

    (!parts.is_empty()).then(|| parts.join(", "))
}

fn description_for(event: &Event) -> Option<String> {
    let mut lines = Vec::new();
    if let Some(department) = non_blank(&event.department) {
        lines.push(format!("Département: {}", department));
    }
    let professors = join_present(&event.professors);
    if !professors.is_empty() {
        lines.push(format!("Prof(s): {}", professors));
    }

    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Attach `timezone` to naive times; aware times keep their instant.
pub fn localize(time: EventTime, timezone: Tz) -> EntryTime {
    match time {
        EventTime::Aware(dt) => EntryTime::Utc(dt.with_timezone(&Utc)),
        EventTime::Naive(naive) => EntryTime::Zoned(resolve_local(naive, timezone)),
    }
}

/// Resolve a wall-clock time in `timezone`.
///
/// In the autumn fold the standard-time (later) instant wins. Times inside
/// the spring gap are read with the zone's standard offset, which moves them
/// forward by the size of the gap.
fn resolve_local(naive: NaiveDateTime, timezone: Tz) -> DateTime<Tz> {
    match timezone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(_, later) => later,
        LocalResult::None => {
            let standard = timezone.offset_from_utc_datetime(&naive).base_utc_offset();
            timezone.from_utc_datetime(&(naive - standard))
        }
    }
}

fn derived_uid(summary: &str, start: &EntryTime, end: &EntryTime) -> String {
    let name = format!(
        "{}|{}|{}",
        summary,
        start.to_utc().to_rfc3339(),
        end.to_utc().to_rfc3339()
    );
    format!("{}@{}", Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()), UID_DOMAIN)
}

fn join_present(values: &[String]) -> String {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
