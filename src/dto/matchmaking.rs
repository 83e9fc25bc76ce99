use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::format_instant,
    state::lifecycle::{GameStart, PlayerRef, RunOutcome},
};

/// Optional evaluation instant for a matchmaking pass.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RunRequest {
    /// RFC-3339 instant to evaluate availability at; defaults to now.
    #[serde(default, with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>)]
    pub at: Option<OffsetDateTime>,
}

/// Player snapshot embedded in run summaries.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerRefView {
    /// Player id.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl From<&PlayerRef> for PlayerRefView {
    fn from(player: &PlayerRef) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
        }
    }
}

/// One game started during a matchmaking pass.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameStartView {
    /// Identifier of the started game.
    pub game_id: Uuid,
    /// Court the game occupies.
    pub court_id: Uuid,
    /// The four chosen players.
    pub players: Vec<PlayerRefView>,
    /// Queue anchors used for the group, oldest first.
    pub anchor_ids: Vec<String>,
}

impl From<&GameStart> for GameStartView {
    fn from(start: &GameStart) -> Self {
        Self {
            game_id: start.game_id,
            court_id: start.court_id,
            players: start.players.iter().map(Into::into).collect(),
            anchor_ids: start.anchor_ids.clone(),
        }
    }
}

/// Summary of one seed / advance / advance-all invocation.
#[derive(Debug, Serialize, ToSchema)]
pub struct RunSummary {
    /// The operation performed (`seed` or `advance`).
    pub action: String,
    /// RFC-3339 instant the pass was evaluated at.
    pub at: String,
    /// Courts the pass touched.
    pub court_ids: Vec<Uuid>,
    /// Queue contents before the pass.
    pub queue_before: Vec<String>,
    /// Queue contents after the pass.
    pub queue_after: Vec<String>,
    /// Games started by the pass; empty when no group could be formed.
    pub games: Vec<GameStartView>,
}

impl From<&RunOutcome> for RunSummary {
    fn from(outcome: &RunOutcome) -> Self {
        Self {
            action: outcome.action.as_str().into(),
            at: format_instant(outcome.at),
            court_ids: outcome.court_ids.clone(),
            queue_before: outcome.queue_before.clone(),
            queue_after: outcome.queue_after.clone(),
            games: outcome.games_started.iter().map(Into::into).collect(),
        }
    }
}
