//! One publishing run: credentials, fetch, write.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use edt_core::ics::write_calendar;
use edt_core::{Calendar, Credentials, TimetableService, fetch_events};
use tracing::{info, warn};

use crate::config::{Config, PASSWORD_VAR, USERNAME_VAR};

/// Fetch the timetable and publish it to `config.output`.
///
/// Missing credentials abort before any request and leave the output file
/// untouched. Fetch failures never abort: the calendar is always written,
/// with a placeholder entry when nothing was found.
pub async fn run<S: TimetableService>(
    service: &S,
    config: &Config,
    lookup_env: impl Fn(&str) -> Option<String>,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> Result<Calendar> {
    let credentials = Credentials::from_lookup(USERNAME_VAR, PASSWORD_VAR, lookup_env)?;
    let options = config.calendar_options()?;
    let plan = config.fetch_plan(today);

    info!("Requested window: {}", plan.window);
    info!("Entity id: {}", plan.entity_id);

    let outcome = fetch_events(service, &credentials, &plan).await;
    match outcome.strategy() {
        Some(strategy) => {
            info!("Publishing {} event(s) from {}", outcome.events().len(), strategy);
        }
        None => warn!("Nothing retrieved, publishing the placeholder calendar"),
    }

    write_calendar(outcome.events(), &options, now, &config.output)
        .with_context(|| format!("Failed to write calendar to {}", config.output.display()))
}
