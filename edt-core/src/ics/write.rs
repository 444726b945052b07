//! Publishing the calendar file.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::calendar::{Calendar, CalendarOptions};
use crate::error::EdtResult;
use crate::event::Event;
use crate::ics::generate_ics;

/// Build the calendar for `events` and write it to `path`.
///
/// Parent directories are created and any existing file is replaced. An
/// empty `events` slice writes the placeholder calendar; only I/O can fail.
pub fn write_calendar(
    events: &[Event],
    options: &CalendarOptions,
    now: DateTime<Utc>,
    path: &Path,
) -> EdtResult<Calendar> {
    let calendar = Calendar::from_events(events, options, now);
    let content = generate_ics(&calendar);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content.as_bytes())?;

    if calendar.is_placeholder() {
        info!("Wrote {} (placeholder only)", path.display());
    } else {
        info!("Wrote {} ({} entries)", path.display(), calendar.entries.len());
    }
    Ok(calendar)
}
