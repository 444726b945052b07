//! Authenticated portal session.

use std::time::Duration;

use async_trait::async_trait;
use edt_core::{
    ConnectionConfig, DateWindow, EdtError, EdtResult, Entity, Event, EventQuery,
    TimetableService, TimetableSession,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::api::{self, RawEvent, SideBar};
use crate::convert;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Opens sessions on CELCAT portals.
#[derive(Debug, Clone)]
pub struct CelcatService {
    timeout: Duration,
}

impl CelcatService {
    pub fn new(timeout: Duration) -> Self {
        CelcatService { timeout }
    }
}

impl Default for CelcatService {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl TimetableService for CelcatService {
    type Session = CelcatSession;

    async fn connect(&self, config: &ConnectionConfig) -> EdtResult<CelcatSession> {
        CelcatSession::login(config, self.timeout).await
    }
}

/// A logged-in session on one base URL. The login cookie lives in the
/// client's cookie store.
pub struct CelcatSession {
    client: Client,
    base_url: String,
    include_holidays: bool,
}

impl CelcatSession {
    /// Log in through the portal's LDAP form.
    pub async fn login(config: &ConnectionConfig, timeout: Duration) -> EdtResult<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            EdtError::Config(format!("Invalid base URL '{}': {}", config.base_url, e))
        })?;

        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(http_error)?;

        let session = CelcatSession {
            client,
            base_url: base.as_str().trim_end_matches('/').to_string(),
            include_holidays: config.include_holidays,
        };

        let login_page = session
            .client
            .get(session.endpoint(api::LOGIN_PATH))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_error)?
            .text()
            .await
            .map_err(http_error)?;

        let token = api::extract_verification_token(&login_page).ok_or_else(|| {
            EdtError::Auth(format!("No login form found at {}", session.base_url))
        })?;

        let response = session
            .client
            .post(session.endpoint(api::LOGON_PATH))
            .form(&[
                ("Name", config.credentials.username.as_str()),
                ("Password", config.credentials.password.as_str()),
                ("__RequestVerificationToken", token.as_str()),
            ])
            .send()
            .await
            .map_err(http_error)?;

        if matches!(response.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(EdtError::Auth(format!(
                "Login rejected with status {}",
                response.status()
            )));
        }
        let body = response
            .error_for_status()
            .map_err(http_error)?
            .text()
            .await
            .map_err(http_error)?;

        if api::is_login_page(&body) {
            return Err(EdtError::Auth(format!(
                "Login rejected for user '{}'",
                config.credentials.username
            )));
        }

        debug!("Logged in on {}", session.base_url);
        Ok(session)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send a calendar data request and convert its events.
    async fn calendar_data(&self, request: RequestBuilder) -> EdtResult<Vec<Event>> {
        let raw_events: Vec<RawEvent> = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_error)?
            .json()
            .await
            .map_err(http_error)?;

        let mut events = Vec::with_capacity(raw_events.len());
        for raw in raw_events {
            let details = match raw.id.as_deref() {
                Some(id) => match self.side_bar(id).await {
                    Ok(details) => Some(details),
                    Err(e) => {
                        warn!("No details for event {}: {}", id, e);
                        None
                    }
                },
                None => None,
            };

            let event = match convert::to_event(raw, details.as_ref()) {
                Ok(event) => event,
                Err(e) => {
                    warn!("Skipping event: {}", e);
                    continue;
                }
            };

            if !self.include_holidays && convert::is_holiday(&event) {
                debug!("Skipping holiday {:?}", event.category);
                continue;
            }
            events.push(event);
        }

        Ok(events)
    }

    async fn side_bar(&self, event_id: &str) -> EdtResult<SideBar> {
        self.client
            .post(self.endpoint(api::SIDEBAR_PATH))
            .form(&[("eventId", event_id)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_error)?
            .json()
            .await
            .map_err(http_error)
    }
}

#[async_trait]
impl TimetableSession for CelcatSession {
    async fn events_for_entity(
        &self,
        entity: &Entity,
        window: &DateWindow,
    ) -> EdtResult<Vec<Event>> {
        let code = entity.kind.federation_code().ok_or_else(|| {
            EdtError::Unsupported(format!("no federation code for entity type '{}'", entity.kind))
        })?;

        let request = self
            .client
            .post(self.endpoint(api::CALENDAR_DATA_PATH))
            .form(&api::calendar_data_form(code, &entity.id, window));
        self.calendar_data(request).await
    }

    async fn events(&self, query: &EventQuery) -> EdtResult<Vec<Event>> {
        let request = self
            .client
            .get(self.endpoint(api::CALENDAR_DATA_PATH))
            .query(&api::calendar_data_query(&query.window, query.entity.as_ref()));
        self.calendar_data(request).await
    }
}

fn http_error(e: reqwest::Error) -> EdtError {
    if e.is_decode() {
        EdtError::Parse(e.to_string())
    } else {
        EdtError::Http(e.to_string())
    }
}
