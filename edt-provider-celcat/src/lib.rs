//! CELCAT calendar portal client.
//!
//! Implements `edt_core::TimetableService` over the portal's web endpoints:
//! form login (`LdapLogin`), calendar data (`Home/GetCalendarData`) and
//! per-event details (`Home/GetSideBarEvent`).

mod api;
mod convert;
mod session;

pub use session::{CelcatService, CelcatSession};
