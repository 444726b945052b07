//! CELCAT payloads to portal-neutral events.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use edt_core::{EdtError, EdtResult, Event, EventTime};
use tracing::debug;

use crate::api::{MODULE_CODE, ROOM_CODE, RawEvent, STAFF_CODE, SideBar};

/// Category words that mark holidays rather than classes.
const HOLIDAY_MARKERS: &[&str] = &["vacances", "congés", "conges", "férié", "ferie", "holiday"];

/// Wide enough that portal strings are never wrapped.
const TEXT_WIDTH: usize = 1000;

/// Build an `Event` from calendar data plus optional side-bar details.
///
/// Without details, the course comes from the first module and rooms and
/// professors stay empty. All-day events span whole local days.
pub(crate) fn to_event(raw: RawEvent, details: Option<&SideBar>) -> EdtResult<Event> {
    let start = EventTime::parse(&raw.start).ok_or_else(|| {
        EdtError::Parse(format!("Invalid start '{}' for event {:?}", raw.start, raw.id))
    })?;
    let end = match raw.end.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(s) => Some(EventTime::parse(s).ok_or_else(|| {
            EdtError::Parse(format!("Invalid end '{}' for event {:?}", s, raw.id))
        })?),
        None => None,
    };
    let (start, end) = if raw.all_day {
        whole_days(start, end)
    } else {
        (start, end.unwrap_or_else(|| add_days(start, 1)))
    };

    let mut event = Event::new(start, end);
    event.id = raw.id;
    event.category = raw.event_category.map(|c| clean_text(&c)).filter(|c| !c.is_empty());
    event.department = raw.department.map(|d| clean_text(&d)).filter(|d| !d.is_empty());
    event.sites = raw.sites.unwrap_or_default();

    let first_module = raw.modules.and_then(|m| m.into_iter().next());
    match details {
        Some(details) => {
            event.course = details.contents(MODULE_CODE).into_iter().next().or(first_module);
            event.rooms = details.contents(ROOM_CODE);
            event.professors = details.contents(STAFF_CODE);
        }
        None => event.course = first_module,
    }

    Ok(event)
}

pub(crate) fn is_holiday(event: &Event) -> bool {
    let Some(category) = event.category.as_deref() else {
        return false;
    };
    let category = category.to_lowercase();
    HOLIDAY_MARKERS.iter().any(|marker| category.contains(marker))
}

/// Midnight-to-midnight span covering `start` up to `end`, at least one day.
fn whole_days(start: EventTime, end: Option<EventTime>) -> (EventTime, EventTime) {
    let first = local_datetime(start).date();
    let last = end
        .map(local_datetime)
        .map(|end| {
            if end.time() == NaiveTime::MIN {
                end.date()
            } else {
                end.date() + Duration::days(1)
            }
        })
        .filter(|&last| last > first)
        .unwrap_or(first + Duration::days(1));

    (
        EventTime::Naive(first.and_time(NaiveTime::MIN)),
        EventTime::Naive(last.and_time(NaiveTime::MIN)),
    )
}

fn local_datetime(time: EventTime) -> NaiveDateTime {
    match time {
        EventTime::Naive(dt) => dt,
        EventTime::Aware(dt) => dt.naive_local(),
    }
}

fn add_days(time: EventTime, days: i64) -> EventTime {
    match time {
        EventTime::Naive(dt) => EventTime::Naive(dt + Duration::days(days)),
        EventTime::Aware(dt) => EventTime::Aware(dt + Duration::days(days)),
    }
}

/// Render a portal HTML fragment as one line of plain text.
pub(crate) fn clean_text(s: &str) -> String {
    let text = html2text::config::plain_no_decorate()
        .string_from_read(s.as_bytes(), TEXT_WIDTH)
        .unwrap_or_else(|e| {
            debug!("Could not render '{}' as text: {}", s, e);
            s.to_string()
        });
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(value: serde_json::Value) -> RawEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_to_event_without_details() {
        let event = to_event(
            raw(serde_json::json!({
                "id": "-2077839:9289:1",
                "start": "2025-10-20T08:30:00",
                "end": "2025-10-20T10:00:00",
                "eventCategory": "TD",
                "department": "Informatique",
                "sites": ["Saint-Martin"],
                "modules": ["Algorithmique", "Algo avancée"]
            })),
            None,
        )
        .unwrap();

        assert_eq!(event.id.as_deref(), Some("-2077839:9289:1"));
        assert_eq!(event.course.as_deref(), Some("Algorithmique"));
        assert_eq!(event.category.as_deref(), Some("TD"));
        assert_eq!(event.department.as_deref(), Some("Informatique"));
        assert_eq!(event.sites, vec!["Saint-Martin"]);
        assert!(event.rooms.is_empty());
        assert!(matches!(event.start, EventTime::Naive(_)));
    }

    #[test]
    fn test_to_event_with_details() {
        let details: SideBar = serde_json::from_value(serde_json::json!({
            "elements": [
                { "content": "Réseaux &amp; Systèmes", "entityType": 100 },
                { "content": "A101", "entityType": 102 },
                { "content": "B202", "entityType": 102 },
                { "content": "MARTIN Claire", "entityType": 101 }
            ]
        }))
        .unwrap();

        let event = to_event(
            raw(serde_json::json!({
                "start": "2025-10-20T13:00:00",
                "end": "2025-10-20T15:00:00",
                "modules": ["RS"]
            })),
            Some(&details),
        )
        .unwrap();

        assert_eq!(event.course.as_deref(), Some("Réseaux & Systèmes"));
        assert_eq!(event.rooms, vec!["A101", "B202"]);
        assert_eq!(event.professors, vec!["MARTIN Claire"]);
    }

    #[test]
    fn test_all_day_without_end() {
        let event = to_event(
            raw(serde_json::json!({ "start": "2025-11-01T00:00:00", "allDay": true })),
            None,
        )
        .unwrap();

        let midnight = NaiveDate::from_ymd_opt(2025, 11, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(event.end, EventTime::Naive(midnight));
    }

    #[test]
    fn test_all_day_spans_whole_days() {
        let day = |d: u32| {
            let date = NaiveDate::from_ymd_opt(2025, 10, d).unwrap();
            EventTime::Naive(date.and_time(NaiveTime::MIN))
        };

        let event = to_event(
            raw(serde_json::json!({
                "start": "2025-10-27T08:00:00",
                "end": "2025-10-28T18:00:00",
                "allDay": true
            })),
            None,
        )
        .unwrap();
        assert_eq!((event.start, event.end), (day(27), day(29)));

        let event = to_event(
            raw(serde_json::json!({
                "start": "2025-10-31T00:00:00+01:00",
                "end": "2025-10-31T00:00:00+01:00",
                "allDay": true
            })),
            None,
        )
        .unwrap();
        let november_first = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        assert_eq!(event.start, day(31));
        assert_eq!(event.end, EventTime::Naive(november_first.and_time(NaiveTime::MIN)));
    }

    #[test]
    fn test_timed_event_keeps_its_end() {
        let event = to_event(
            raw(serde_json::json!({
                "start": "2025-10-20T08:30:00",
                "end": "2025-10-20T10:00:00",
                "allDay": false
            })),
            None,
        )
        .unwrap();

        let end = NaiveDate::from_ymd_opt(2025, 10, 20).unwrap().and_hms_opt(10, 0, 0).unwrap();
        assert_eq!(event.end, EventTime::Naive(end));
    }

    #[test]
    fn test_bad_start_is_parse_error() {
        let err = to_event(raw(serde_json::json!({ "start": "soon" })), None).unwrap_err();
        assert!(matches!(err, EdtError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn test_holiday_detection() {
        let mut event = to_event(
            raw(serde_json::json!({
                "start": "2025-12-22T00:00:00",
                "eventCategory": "Vacances de Noël"
            })),
            None,
        )
        .unwrap();
        assert!(is_holiday(&event));

        event.category = Some("Jour Férié".to_string());
        assert!(is_holiday(&event));

        event.category = Some("CM".to_string());
        assert!(!is_holiday(&event));

        event.category = None;
        assert!(!is_holiday(&event));
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("A101<br />\r\n\r\nB202"), "A101 B202");
        assert_eq!(clean_text("L&#39;amphi &#xE9;t&eacute;"), "L'amphi été");
        assert_eq!(clean_text("  Tom &amp; Jerry  "), "Tom & Jerry");
        assert_eq!(clean_text("R&D"), "R&D");
    }

    #[test]
    fn test_clean_text_decodes_french_entities() {
        assert_eq!(clean_text("R&eacute;seaux"), "Réseaux");
        assert_eq!(
            clean_text("Syst&egrave;mes &agrave; &Eacute;v&eacute;nements"),
            "Systèmes à Événements"
        );
        assert_eq!(clean_text("Salle&nbsp;A1<br/>B&acirc;timent"), "Salle A1 Bâtiment");
    }

    #[test]
    fn test_side_bar_entities_reach_the_event() {
        let details: SideBar = serde_json::from_value(serde_json::json!({
            "elements": [
                { "content": "R&eacute;seaux", "entityType": 100 },
                { "content": "B&acirc;timent A<br/>Salle 1", "entityType": 102 }
            ]
        }))
        .unwrap();

        let event = to_event(
            raw(serde_json::json!({
                "start": "2025-10-20T13:00:00",
                "end": "2025-10-20T15:00:00",
                "eventCategory": "Cours Magistral &amp; TD"
            })),
            Some(&details),
        )
        .unwrap();

        assert_eq!(event.course.as_deref(), Some("Réseaux"));
        assert_eq!(event.rooms, vec!["Bâtiment A Salle 1"]);
        assert_eq!(event.category.as_deref(), Some("Cours Magistral & TD"));
    }
}
