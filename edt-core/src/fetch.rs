//! Best-effort event retrieval.
//!
//! The portal's classification of an id and the exact shape of its API are
//! not stable, so the fetcher walks a small fixed search space in order:
//! base URL, then entity type, then calling convention (dedicated call
//! first, generic call as fallback). Every failure counts as zero events for
//! that attempt; the search itself never fails.

use std::fmt;

use tracing::{debug, info, warn};

use crate::date_window::DateWindow;
use crate::entity::{Entity, EntityType};
use crate::event::Event;
use crate::remote::{
    ConnectionConfig, Credentials, EventQuery, TimetableService, TimetableSession,
};

/// The search space and its parameters.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    /// Tried in order
    pub base_urls: Vec<String>,
    /// Tried in order for each base URL
    pub entity_types: Vec<EntityType>,
    pub entity_id: String,
    pub window: DateWindow,
    pub include_holidays: bool,
    /// Try every entity type of a base URL and keep the largest result,
    /// instead of stopping at the first non-empty one
    pub exhaustive_entity_types: bool,
}

/// How the events were requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    ForEntity,
    Generic,
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Convention::ForEntity => f.write_str("for_entity"),
            Convention::Generic => f.write_str("generic"),
        }
    }
}

/// Which combination produced a result. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    pub base_url: String,
    pub entity_type: EntityType,
    pub convention: Convention,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} @ {}", self.convention, self.entity_type, self.base_url)
    }
}

/// Result of the whole search.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Always holds at least one event
    Found { events: Vec<Event>, strategy: Strategy },
    Empty,
}

impl FetchOutcome {
    pub fn events(&self) -> &[Event] {
        match self {
            FetchOutcome::Found { events, .. } => events,
            FetchOutcome::Empty => &[],
        }
    }

    pub fn strategy(&self) -> Option<&Strategy> {
        match self {
            FetchOutcome::Found { strategy, .. } => Some(strategy),
            FetchOutcome::Empty => None,
        }
    }
}

/// Run the search described by `plan` against `service`.
pub async fn fetch_events<S: TimetableService>(
    service: &S,
    credentials: &Credentials,
    plan: &FetchPlan,
) -> FetchOutcome {
    let mut best: Option<(Vec<Event>, Strategy)> = None;

    'bases: for base_url in &plan.base_urls {
        info!("Trying base URL {}", base_url);

        let config = ConnectionConfig {
            base_url: base_url.clone(),
            credentials: credentials.clone(),
            include_holidays: plan.include_holidays,
        };

        let session = match service.connect(&config).await {
            Ok(session) => session,
            Err(e) => {
                warn!("Connection failed on {}: {}", base_url, e);
                continue;
            }
        };

        for &entity_type in &plan.entity_types {
            let entity = Entity::new(entity_type, plan.entity_id.as_str());
            let attempt = attempt_entity(&session, &entity, &plan.window).await;
            let count = attempt.as_ref().map_or(0, |(events, _)| events.len());
            info!("  {}: {} event(s)", entity_type, count);

            let best_count = best.as_ref().map_or(0, |(events, _)| events.len());
            if let Some((events, convention)) = attempt {
                if events.len() > best_count {
                    let strategy = Strategy {
                        base_url: base_url.clone(),
                        entity_type,
                        convention,
                    };
                    best = Some((events, strategy));
                }
            }

            if best.is_some() && !plan.exhaustive_entity_types {
                break 'bases;
            }
        }

        if best.is_some() {
            break;
        }
    }

    match best {
        Some((events, strategy)) => {
            info!("Selected {} event(s) via {}", events.len(), strategy);
            FetchOutcome::Found { events, strategy }
        }
        None => {
            warn!("No events found (check credentials, entity id and base URLs)");
            FetchOutcome::Empty
        }
    }
}

/// Try the dedicated call, then the generic one.
///
/// A successful call ends the attempt even when it returns nothing. `None`
/// means both conventions failed.
async fn attempt_entity<T: TimetableSession>(
    session: &T,
    entity: &Entity,
    window: &DateWindow,
) -> Option<(Vec<Event>, Convention)> {
    debug!("  -> events_for_entity(type={})", entity.kind);
    match session.events_for_entity(entity, window).await {
        Ok(events) => return Some((events, Convention::ForEntity)),
        Err(e) if e.is_unsupported() => debug!("     dedicated call unavailable: {}", e),
        Err(e) => warn!("     dedicated call failed for {}: {}", entity.kind, e),
    }

    debug!("  -> events(entity_type={})", entity.kind);
    let query = EventQuery {
        window: *window,
        entity: Some(entity.clone()),
    };
    match session.events(&query).await {
        Ok(events) => Some((events, Convention::Generic)),
        Err(e) => {
            warn!("     generic call failed for {}: {}", entity.kind, e);
            None
        }
    }
}
