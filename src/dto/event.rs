use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{
        format_instant,
        validation::{validate_display_name, validate_player_id, validate_registration_status},
    },
    state::{
        event::{Court, Event, Game},
        player::Player,
    },
};

/// Payload used to create a new event with its courts and initial roster.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateEventRequest {
    /// Number of courts available to the event.
    #[validate(range(min = 1))]
    pub court_count: usize,
    /// Initial roster supplied by the registration service.
    #[validate(nested)]
    pub players: Vec<PlayerInput>,
}

/// Payload replacing an event roster wholesale.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ReplacePlayersRequest {
    /// The new roster; all matchmaking state is reset.
    #[validate(nested)]
    pub players: Vec<PlayerInput>,
}

/// Incoming player record as supplied by the registration service.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PlayerInput {
    /// Upstream player id, unique within the roster.
    pub id: String,
    /// Display name.
    pub name: String,
    /// RFC-3339 start of the availability window (inclusive).
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub available_start: OffsetDateTime,
    /// RFC-3339 end of the availability window (exclusive).
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String)]
    pub available_end: OffsetDateTime,
    /// Upstream registration status: registered, waitlist or canceled.
    pub registration_status: String,
    /// Upstream skill rank. Accepted for wire compatibility; grouping is
    /// skill-blind and never reads it.
    #[serde(default)]
    pub skill: Option<i32>,
}

impl Validate for PlayerInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_player_id(&self.id) {
            errors.add("id", e);
        }
        if let Err(e) = validate_display_name(&self.name) {
            errors.add("name", e);
        }
        if let Err(e) = validate_registration_status(&self.registration_status) {
            errors.add("registration_status", e);
        }
        if self.available_start >= self.available_end {
            let mut e = validator::ValidationError::new("window_order");
            e.message = Some("Availability window start must precede its end".into());
            errors.add("available_start", e);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Summary returned once an event has been created or its roster replaced.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventSummary {
    /// Identifier of the event.
    pub id: Uuid,
    /// Identifiers of the event's courts, in order.
    pub court_ids: Vec<Uuid>,
    /// Number of players in the roster.
    pub player_count: usize,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            court_ids: event.courts.iter().map(|court| court.id).collect(),
            player_count: event.players.len(),
        }
    }
}

/// Public projection of a player exposed by the status endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerView {
    /// Upstream player id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// RFC-3339 start of the availability window.
    pub available_start: String,
    /// RFC-3339 end of the availability window.
    pub available_end: String,
    /// Games started during the event.
    pub games_played: u32,
    /// RFC-3339 instant of the last game start, if any.
    pub last_played_at: Option<String>,
    /// Matchmaking state: idle, waiting or playing.
    pub state: String,
    /// RFC-3339 instant of the first enqueue, while waiting.
    pub waiting_since: Option<String>,
    /// Upstream registration status, echoed back untouched.
    pub registration_status: String,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        use crate::state::player::PlayerState;

        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            available_start: format_instant(player.available_start),
            available_end: format_instant(player.available_end),
            games_played: player.games_played,
            last_played_at: player.last_played_at.map(format_instant),
            state: match player.state {
                PlayerState::Idle => "idle",
                PlayerState::Waiting => "waiting",
                PlayerState::Playing => "playing",
            }
            .into(),
            waiting_since: player.waiting_since.map(format_instant),
            registration_status: player.registration_status.as_str().into(),
        }
    }
}

/// Public projection of a game.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameView {
    /// Identifier of the game.
    pub id: Uuid,
    /// Court the game was played on.
    pub court_id: Uuid,
    /// The four player ids.
    pub player_ids: Vec<String>,
    /// RFC-3339 start instant.
    pub start_time: String,
    /// RFC-3339 end instant; absent while the game is active.
    pub end_time: Option<String>,
}

impl From<&Game> for GameView {
    fn from(game: &Game) -> Self {
        Self {
            id: game.id,
            court_id: game.court_id,
            player_ids: game.player_ids.to_vec(),
            start_time: format_instant(game.start_time),
            end_time: game.end_time.map(format_instant),
        }
    }
}

/// A court together with its resolved active game.
#[derive(Debug, Serialize, ToSchema)]
pub struct CourtStatus {
    /// Identifier of the court.
    pub id: Uuid,
    /// The active game, if the court is occupied.
    pub game: Option<GameView>,
}

/// Read-only projection of an event returned by the status endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventStatusResponse {
    /// Identifier of the event.
    pub id: Uuid,
    /// Courts with their resolved active games.
    pub courts: Vec<CourtStatus>,
    /// Waiting queue resolved to full player projections, FIFO order.
    pub queue: Vec<PlayerView>,
    /// The full roster in ingestion order.
    pub players: Vec<PlayerView>,
}

impl From<&Event> for EventStatusResponse {
    fn from(event: &Event) -> Self {
        let courts = event
            .courts
            .iter()
            .map(|Court { id, .. }| CourtStatus {
                id: *id,
                game: event.active_game_on(*id).map(Into::into),
            })
            .collect();

        let queue = event
            .queue
            .iter()
            .filter_map(|id| event.players.get(id))
            .map(Into::into)
            .collect();

        let players = event.players.values().map(Into::into).collect();

        Self {
            id: event.id,
            courts,
            queue,
            players,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn input() -> PlayerInput {
        PlayerInput {
            id: "p1".into(),
            name: "Alice".into(),
            available_start: datetime!(2025-06-01 09:00 UTC),
            available_end: datetime!(2025-06-01 12:00 UTC),
            registration_status: "registered".into(),
            skill: None,
        }
    }

    #[test]
    fn valid_player_input_passes() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn inverted_window_is_rejected() {
        let mut payload = input();
        payload.available_end = datetime!(2025-06-01 08:00 UTC);
        assert!(payload.validate().is_err());
    }

    #[test]
    fn empty_window_is_rejected() {
        let mut payload = input();
        payload.available_end = payload.available_start;
        assert!(payload.validate().is_err());
    }

    #[test]
    fn unknown_registration_status_is_rejected() {
        let mut payload = input();
        payload.registration_status = "maybe".into();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn skill_field_is_accepted_but_optional() {
        let mut payload = input();
        payload.skill = Some(42);
        assert!(payload.validate().is_ok());
    }
}
