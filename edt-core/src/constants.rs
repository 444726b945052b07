/// Days before today included in the sliding window.
pub const DEFAULT_DAYS_BEFORE: i64 = 14;

/// Days after today included in the sliding window.
pub const DEFAULT_DAYS_AFTER: i64 = 180;

/// Title used when an event has no course name.
pub const DEFAULT_COURSE_TITLE: &str = "Cours";

/// Title of the entry written when no event could be fetched.
pub const PLACEHOLDER_SUMMARY: &str = "EDT vide (placeholder)";

/// Length of the placeholder entry, in minutes.
pub const PLACEHOLDER_MINUTES: i64 = 30;

pub const DEFAULT_PRODID: &str = "-//EDT CYU Auto//edt-ics//";

pub const DEFAULT_TIMEZONE: chrono_tz::Tz = chrono_tz::Europe::Paris;

/// Domain suffix appended to portal event ids to build UIDs.
pub const UID_DOMAIN: &str = "edt-ics";
