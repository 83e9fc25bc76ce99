use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::state::lifecycle::{GameStart, PlayerRef, RunOutcome};

/// Player snapshot (id + name) embedded in audit documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerRefEntity {
    /// Upstream-supplied player id.
    pub id: String,
    /// Display name at the time of the game start.
    pub name: String,
}

/// Metrics block attached to each per-game audit document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameAuditMetricsEntity {
    /// Number of players in the started game.
    pub player_count: usize,
}

/// Append-only record of a single game start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameAuditEntity {
    /// Event the game belongs to.
    pub event_id: Uuid,
    /// Identifier of the started game.
    pub game_id: Uuid,
    /// Court the game occupies.
    pub court_id: Uuid,
    /// Operation that started the game (`seed` or `advance`).
    pub action: String,
    /// Instant the game started.
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    /// Resolved roster snapshot of the four players.
    pub players: Vec<PlayerRefEntity>,
    /// Queue anchors used for the group, oldest first.
    pub anchor_ids: Vec<String>,
    /// Queue contents immediately before the fill attempt.
    pub queue_before: Vec<String>,
    /// Queue contents once the group was finalized.
    pub queue_after: Vec<String>,
    /// Metrics block for external dashboards.
    pub metrics: GameAuditMetricsEntity,
}

/// Append-only record of one seed / advance / advance-all invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunAuditEntity {
    /// Event the run operated on.
    pub event_id: Uuid,
    /// Operation the run corresponds to (`seed` or `advance`).
    pub action: String,
    /// Instant the run was evaluated at.
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    /// Every court the run touched.
    pub court_ids: Vec<Uuid>,
    /// Queue contents before the run.
    pub queue_before: Vec<String>,
    /// Queue contents after the run.
    pub queue_after: Vec<String>,
    /// Identifiers of the games the run started.
    pub game_ids: Vec<Uuid>,
}

impl From<PlayerRef> for PlayerRefEntity {
    fn from(value: PlayerRef) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

impl GameAuditEntity {
    /// Build the per-game audit document for a started game.
    pub fn from_start(event_id: Uuid, start: GameStart) -> Self {
        let player_count = start.players.len();
        Self {
            event_id,
            game_id: start.game_id,
            court_id: start.court_id,
            action: start.action.as_str().to_owned(),
            at: start.at,
            players: start.players.into_iter().map(Into::into).collect(),
            anchor_ids: start.anchor_ids,
            queue_before: start.queue_before,
            queue_after: start.queue_after,
            metrics: GameAuditMetricsEntity { player_count },
        }
    }
}

impl RunAuditEntity {
    /// Build the per-run audit document from a lifecycle outcome.
    pub fn from_outcome(event_id: Uuid, outcome: &RunOutcome) -> Self {
        Self {
            event_id,
            action: outcome.action.as_str().to_owned(),
            at: outcome.at,
            court_ids: outcome.court_ids.clone(),
            queue_before: outcome.queue_before.clone(),
            queue_after: outcome.queue_after.clone(),
            game_ids: outcome
                .games_started
                .iter()
                .map(|start| start.game_id)
                .collect(),
        }
    }
}
