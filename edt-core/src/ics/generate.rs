//! ICS generation.

use crate::calendar::{Calendar, CalendarEntry, EntryTime};
use icalendar::{Component, EventLike, Property};

/// Serialize a calendar to .ics text.
///
/// Output is deterministic: UID and DTSTAMP come from the entry itself, so
/// the same calendar always gives the same bytes.
pub fn generate_ics(calendar: &Calendar) -> String {
    let mut cal = icalendar::Calendar::new();

    for entry in &calendar.entries {
        cal.push(build_event(entry));
    }
    let cal = cal.done();

    normalize_header(&cal.to_string(), calendar)
}

fn build_event(entry: &CalendarEntry) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&entry.uid);
    ics_event.summary(&entry.summary);

    // DTSTAMP is required; the entry start keeps it reproducible
    let dtstamp = entry.start.to_utc().format("%Y%m%dT%H%M%SZ").to_string();
    ics_event.add_property("DTSTAMP", &dtstamp);

    add_datetime_property(&mut ics_event, "DTSTART", &entry.start);
    add_datetime_property(&mut ics_event, "DTEND", &entry.end);

    if let Some(ref loc) = entry.location {
        ics_event.location(loc);
    }

    if let Some(ref desc) = entry.description {
        ics_event.description(desc);
    }

    ics_event.done()
}

/// Add a datetime property formatted according to its EntryTime variant
fn add_datetime_property(ics_event: &mut icalendar::Event, name: &str, time: &EntryTime) {
    match time {
        EntryTime::Utc(dt) => {
            ics_event.add_property(name, dt.format("%Y%m%dT%H%M%SZ").to_string());
        }
        EntryTime::Zoned(dt) => {
            let mut prop = Property::new(name, dt.format("%Y%m%dT%H%M%S").to_string());
            prop.add_parameter("TZID", dt.timezone().name());
            ics_event.append_property(prop);
        }
    }
}

/// Rewrite the calendar header from the icalendar crate
/// - PRODID and VERSION come from `calendar`, in that order
/// - CALSCALE:GREGORIAN is dropped (it's the default)
///
/// Only top-level lines are touched; component bodies pass through.
fn normalize_header(ics: &str, calendar: &Calendar) -> String {
    let mut result = String::with_capacity(ics.len());
    let mut depth = 0usize;

    for line in ics.lines() {
        if line.starts_with("BEGIN:") {
            depth += 1;
            result.push_str(line);
            result.push_str("\r\n");
            if line == "BEGIN:VCALENDAR" {
                result.push_str(&format!("PRODID:{}\r\n", calendar.prodid));
                result.push_str(&format!("VERSION:{}\r\n", calendar.version));
            }
            continue;
        }
        if line.starts_with("END:") {
            depth = depth.saturating_sub(1);
        } else if depth == 1
            && (line.starts_with("PRODID:")
                || line.starts_with("VERSION:")
                || line.starts_with("CALSCALE:"))
        {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}
