use std::collections::HashSet;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::event::{
        CreateEventRequest, EventStatusResponse, EventSummary, PlayerInput, ReplacePlayersRequest,
    },
    error::ServiceError,
    state::{
        SharedState,
        event::Event,
        player::{Player, RegistrationStatus},
    },
};

/// Create a new event with its courts and initial roster.
pub async fn create_event(
    state: &SharedState,
    request: CreateEventRequest,
) -> Result<EventSummary, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

    let limits = state.config();
    if request.court_count > limits.max_courts {
        return Err(ServiceError::InvalidInput(format!(
            "court count {} exceeds the configured maximum of {}",
            request.court_count, limits.max_courts
        )));
    }

    let players = build_players(state, request.players)?;
    let event = Event::new(request.court_count, players);
    let summary = EventSummary::from(&event);

    info!(
        event_id = %event.id,
        courts = event.courts.len(),
        players = event.players.len(),
        "event created"
    );
    state.registry().upsert(event);

    Ok(summary)
}

/// Replace an event roster wholesale, resetting all matchmaking state.
pub async fn replace_players(
    state: &SharedState,
    event_id: Uuid,
    request: ReplacePlayersRequest,
) -> Result<EventSummary, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

    let players = build_players(state, request.players)?;

    let gate = state.event_gate(event_id);
    let _guard = gate.lock().await;

    let mut event = require_event(state, event_id)?;
    event.replace_players(players);
    let summary = EventSummary::from(&event);

    info!(event_id = %event_id, players = summary.player_count, "roster replaced");
    state.registry().upsert(event);

    Ok(summary)
}

/// Read-only projection of an event: courts, resolved queue, and roster.
pub async fn status(
    state: &SharedState,
    event_id: Uuid,
) -> Result<EventStatusResponse, ServiceError> {
    let event = require_event(state, event_id)?;
    Ok(EventStatusResponse::from(&event))
}

/// Remove an event and its write gate.
pub async fn close_event(state: &SharedState, event_id: Uuid) -> Result<(), ServiceError> {
    if !state.registry().remove(event_id) {
        return Err(ServiceError::NotFound(format!(
            "event `{event_id}` not found"
        )));
    }
    state.drop_event_gate(event_id);
    info!(event_id = %event_id, "event closed");
    Ok(())
}

pub(crate) fn require_event(state: &SharedState, event_id: Uuid) -> Result<Event, ServiceError> {
    state
        .registry()
        .get(event_id)
        .ok_or_else(|| ServiceError::NotFound(format!("event `{event_id}` not found")))
}

/// Convert validated upstream records into normalized roster entries.
///
/// Duplicate ids are rejected here rather than silently collapsed so the
/// registration service learns about its own inconsistencies.
fn build_players(
    state: &SharedState,
    inputs: Vec<PlayerInput>,
) -> Result<Vec<Player>, ServiceError> {
    if inputs.len() > state.config().max_roster_size {
        return Err(ServiceError::InvalidInput(format!(
            "roster size {} exceeds the configured maximum of {}",
            inputs.len(),
            state.config().max_roster_size
        )));
    }

    let mut seen_ids = HashSet::new();
    inputs
        .into_iter()
        .map(|input| {
            if !seen_ids.insert(input.id.clone()) {
                return Err(ServiceError::InvalidInput(format!(
                    "duplicate player id `{}` detected",
                    input.id
                )));
            }

            let status = RegistrationStatus::parse(&input.registration_status).ok_or_else(|| {
                ServiceError::InvalidInput(format!(
                    "unknown registration status `{}`",
                    input.registration_status
                ))
            })?;

            // The upstream skill field is dropped on the floor: grouping is
            // skill-blind.
            Ok(Player::new(
                input.id,
                input.name,
                input.available_start,
                input.available_end,
                status,
            ))
        })
        .collect()
}
