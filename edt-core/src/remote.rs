//! The seam between the fetcher and a timetable portal.
//!
//! A portal client implements `TimetableService` (open a session on one base
//! URL) and `TimetableSession` (retrieve events). Both retrieval conventions
//! are always present on the session; a backend without a dedicated
//! per-entity call answers `EdtError::Unsupported` instead.

use std::fmt;

use async_trait::async_trait;

use crate::date_window::DateWindow;
use crate::entity::Entity;
use crate::error::{EdtError, EdtResult};
use crate::event::Event;

/// Portal login.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Resolve credentials through `lookup` (normally the process environment).
    ///
    /// Unset or empty values are reported together.
    pub fn from_lookup(
        username_var: &str,
        password_var: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> EdtResult<Self> {
        let get = |var: &str| lookup(var).filter(|v| !v.is_empty());
        let username = get(username_var);
        let password = get(password_var);

        match (username, password) {
            (Some(username), Some(password)) => Ok(Credentials { username, password }),
            (username, password) => {
                let missing: Vec<&str> = [
                    (username.is_none(), username_var),
                    (password.is_none(), password_var),
                ]
                .into_iter()
                .filter_map(|(absent, var)| absent.then_some(var))
                .collect();
                Err(EdtError::MissingCredentials(missing.join(" / ")))
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything needed to open a session on one base URL.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub base_url: String,
    pub credentials: Credentials,
    /// Keep holiday entries in the results
    pub include_holidays: bool,
}

/// Parameters of the generic retrieval call.
#[derive(Debug, Clone)]
pub struct EventQuery {
    pub window: DateWindow,
    /// `None` asks for the logged-in user's own timetable
    pub entity: Option<Entity>,
}

#[async_trait]
pub trait TimetableService: Send + Sync {
    type Session: TimetableSession;

    /// Authenticate against `config.base_url`.
    async fn connect(&self, config: &ConnectionConfig) -> EdtResult<Self::Session>;
}

#[async_trait]
pub trait TimetableSession: Send + Sync {
    /// Dedicated per-entity retrieval.
    async fn events_for_entity(
        &self,
        entity: &Entity,
        window: &DateWindow,
    ) -> EdtResult<Vec<Event>>;

    /// Generic retrieval with optional entity parameters.
    async fn events(&self, query: &EventQuery) -> EdtResult<Vec<Event>>;
}
