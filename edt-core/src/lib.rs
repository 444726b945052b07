//! Core types for edt-ics.
//!
//! This crate provides everything that does not depend on a particular
//! timetable portal:
//! - `Event`, `Entity` and `DateWindow` describing what is fetched
//! - the `remote` traits a portal client implements
//! - `fetch`, the best-effort search across base URLs and entity types
//! - `calendar` and `ics`, which turn events into a publishable .ics file

pub mod calendar;
pub mod constants;
pub mod date_window;
pub mod entity;
pub mod error;
pub mod event;
pub mod fetch;
pub mod ics;
pub mod remote;

pub use calendar::{Calendar, CalendarEntry, CalendarOptions, EntryTime};
pub use date_window::DateWindow;
pub use entity::{Entity, EntityType};
pub use error::{EdtError, EdtResult};
pub use event::{Event, EventTime};
pub use fetch::{Convention, FetchOutcome, FetchPlan, Strategy, fetch_events};
pub use remote::{ConnectionConfig, Credentials, EventQuery, TimetableService, TimetableSession};
