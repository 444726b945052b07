//! ICS file generation and output.
//!
//! This module writes calendars according to RFC 5545.

mod generate;
mod write;

pub use generate::generate_ics;
pub use write::write_calendar;
