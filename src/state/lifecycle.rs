//! Game lifecycle orchestration: seeding idle courts, ending games, and
//! refilling courts from the waiting queue.
//!
//! This is the only module that mutates Event/Player/Court/Game state. Every
//! mutating pass produces a [`RunOutcome`] describing the decisions taken so
//! the service layer can append them to the audit trail; nothing here reads
//! the trail back.

use rand::Rng;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::state::{
    event::{Event, Game},
    grouping,
    player::PlayerState,
    queue,
};

/// Anchors pulled from the queue front per court fill attempt.
pub const ANCHORS_PER_COURT: usize = 2;

/// Which control operation started a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunAction {
    /// Initial pass filling every idle court.
    Seed,
    /// End-and-refill pass on one or more courts.
    Advance,
}

impl RunAction {
    /// Wire value stored in audit records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::Advance => "advance",
        }
    }
}

/// Minimal player snapshot captured at game start for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRef {
    /// Player id.
    pub id: String,
    /// Display name at the time the game started.
    pub name: String,
}

/// Record of a single game started during a run.
#[derive(Debug, Clone)]
pub struct GameStart {
    /// Identifier of the created game.
    pub game_id: Uuid,
    /// Court the game occupies.
    pub court_id: Uuid,
    /// Operation that triggered the start.
    pub action: RunAction,
    /// Instant the game started.
    pub at: OffsetDateTime,
    /// Snapshot of the four players.
    pub players: Vec<PlayerRef>,
    /// Queue anchors used to seed the group, oldest first.
    pub anchor_ids: Vec<String>,
    /// Queue contents immediately before the fill attempt.
    pub queue_before: Vec<String>,
    /// Queue contents once the group was finalized.
    pub queue_after: Vec<String>,
}

/// Aggregate record of one seed / advance / advance-all invocation.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Operation the run corresponds to.
    pub action: RunAction,
    /// Instant the run was evaluated at.
    pub at: OffsetDateTime,
    /// Courts the run touched.
    pub court_ids: Vec<Uuid>,
    /// Queue contents before the run.
    pub queue_before: Vec<String>,
    /// Queue contents after the run.
    pub queue_after: Vec<String>,
    /// Every game the run started. Empty when no group could be formed,
    /// which is a normal outcome.
    pub games_started: Vec<GameStart>,
}

/// Error raised when a lifecycle operation names an unknown court.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("court `{court_id}` not found in event `{event_id}`")]
pub struct CourtNotFound {
    /// Event the lookup ran against.
    pub event_id: Uuid,
    /// The unknown court id.
    pub court_id: Uuid,
}

/// Fill every idle court for the event.
///
/// All currently available, non-playing players are enqueued first — even
/// ones never previously queued — so the initial pass is fair to the whole
/// roster. Each idle court then pulls up to [`ANCHORS_PER_COURT`] anchors and
/// attempts group formation, falling back to a pure random draw.
pub fn seed_courts<R: Rng + ?Sized>(
    event: &mut Event,
    at: OffsetDateTime,
    rng: &mut R,
) -> RunOutcome {
    let queue_before = event.queue.clone();

    let matchable: Vec<String> = event
        .players
        .values()
        .filter(|player| player.is_matchable_at(at))
        .map(|player| player.id.clone())
        .collect();
    queue::enqueue_if_waiting(event, &matchable, at);

    let idle_courts: Vec<Uuid> = event
        .courts
        .iter()
        .filter(|court| court.current_game_id.is_none())
        .map(|court| court.id)
        .collect();

    let mut games_started = Vec::new();
    for court_id in &idle_courts {
        if let Some(start) = try_fill_court(event, *court_id, RunAction::Seed, at, rng) {
            games_started.push(start);
        }
    }

    RunOutcome {
        action: RunAction::Seed,
        at,
        court_ids: idle_courts,
        queue_before,
        queue_after: event.queue.clone(),
        games_started,
    }
}

/// End the active game on `court_id` (if any) and immediately attempt to
/// start its replacement.
///
/// Ending and restarting are coupled so the court is never observably
/// "between" states across the call. An already-empty court is not an error;
/// the pass proceeds straight to the fill attempt.
pub fn finish_and_refill<R: Rng + ?Sized>(
    event: &mut Event,
    court_id: Uuid,
    at: OffsetDateTime,
    rng: &mut R,
) -> Result<RunOutcome, CourtNotFound> {
    if event.court(court_id).is_none() {
        return Err(CourtNotFound {
            event_id: event.id,
            court_id,
        });
    }

    let queue_before = event.queue.clone();
    let started = advance_court(event, court_id, at, rng);

    Ok(RunOutcome {
        action: RunAction::Advance,
        at,
        court_ids: vec![court_id],
        queue_before,
        queue_after: event.queue.clone(),
        games_started: started.into_iter().collect(),
    })
}

/// Run the finish-and-refill pass over every court of the event.
pub fn advance_all<R: Rng + ?Sized>(
    event: &mut Event,
    at: OffsetDateTime,
    rng: &mut R,
) -> RunOutcome {
    let queue_before = event.queue.clone();
    let court_ids: Vec<Uuid> = event.courts.iter().map(|court| court.id).collect();

    let mut games_started = Vec::new();
    for court_id in &court_ids {
        if let Some(start) = advance_court(event, *court_id, at, rng) {
            games_started.push(start);
        }
    }

    RunOutcome {
        action: RunAction::Advance,
        at,
        court_ids,
        queue_before,
        queue_after: event.queue.clone(),
        games_started,
    }
}

/// End the court's active game, requeue freed players, and attempt a refill.
fn advance_court<R: Rng + ?Sized>(
    event: &mut Event,
    court_id: Uuid,
    at: OffsetDateTime,
    rng: &mut R,
) -> Option<GameStart> {
    end_active_game(event, court_id, at);
    queue::purge_stale(event, at);
    try_fill_court(event, court_id, RunAction::Advance, at, rng)
}

/// Stamp the court's active game as ended and release its players.
///
/// Freed players go back to Idle; those still inside their availability
/// window are re-enqueued at the back of the queue.
fn end_active_game(event: &mut Event, court_id: Uuid, at: OffsetDateTime) {
    let Some(game_id) = event.court(court_id).and_then(|court| court.current_game_id) else {
        return;
    };

    let freed: Vec<String> = match event.game_mut(game_id) {
        Some(game) if game.is_active() => {
            game.end_time = Some(at);
            game.player_ids.to_vec()
        }
        _ => Vec::new(),
    };

    if let Some(court) = event.court_mut(court_id) {
        court.current_game_id = None;
    }

    for id in &freed {
        if let Some(player) = event.players.get_mut(id) {
            player.state = PlayerState::Idle;
            player.waiting_since = None;
        }
    }

    let still_available: Vec<String> = freed
        .into_iter()
        .filter(|id| {
            event
                .players
                .get(id)
                .is_some_and(|player| player.is_available_at(at))
        })
        .collect();
    queue::enqueue_if_waiting(event, &still_available, at);
}

/// Attempt to form a group and start a game on an idle court.
///
/// Anchors are popped from the queue front; when neither anchored grouping
/// nor the random fallback reaches four players, the anchors are restored to
/// the queue front and the court stays idle.
fn try_fill_court<R: Rng + ?Sized>(
    event: &mut Event,
    court_id: Uuid,
    action: RunAction,
    at: OffsetDateTime,
    rng: &mut R,
) -> Option<GameStart> {
    if event
        .court(court_id)
        .is_none_or(|court| court.current_game_id.is_some())
    {
        return None;
    }

    let queue_before = event.queue.clone();
    let anchors = queue::dequeue_up_to(event, ANCHORS_PER_COURT, at);

    let group = grouping::build_group(&anchors, event, at, rng)
        .or_else(|| grouping::random_group(event, at, rng));

    let Some(group) = group else {
        queue::restore_front(event, anchors);
        return None;
    };

    // The fallback draw may bypass a popped anchor; give its slot back.
    let unused: Vec<String> = anchors
        .iter()
        .filter(|id| !group.contains(id))
        .cloned()
        .collect();
    queue::restore_front(event, unused);
    queue::remove_from_queue(event, &group);

    let player_ids: [String; 4] = group
        .clone()
        .try_into()
        .expect("group always holds exactly four players");
    let game = Game {
        id: Uuid::new_v4(),
        court_id,
        player_ids,
        start_time: at,
        end_time: None,
    };
    let game_id = game.id;
    event.games.push(game);
    if let Some(court) = event.court_mut(court_id) {
        court.current_game_id = Some(game_id);
    }

    let mut players = Vec::with_capacity(group.len());
    for id in &group {
        if let Some(player) = event.players.get_mut(id) {
            player.state = PlayerState::Playing;
            player.games_played += 1;
            player.last_played_at = Some(at);
            player.waiting_since = None;
            players.push(PlayerRef {
                id: player.id.clone(),
                name: player.name.clone(),
            });
        }
    }

    Some(GameStart {
        game_id,
        court_id,
        action,
        at,
        players,
        anchor_ids: anchors,
        queue_before,
        queue_after: event.queue.clone(),
    })
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;
    use time::macros::datetime;

    use super::*;
    use crate::state::player::{Player, RegistrationStatus};

    fn roster(ids: &[&str]) -> Vec<Player> {
        ids.iter()
            .map(|id| {
                Player::new(
                    (*id).into(),
                    format!("Player {id}"),
                    datetime!(2025-06-01 09:00 UTC),
                    datetime!(2025-06-01 12:00 UTC),
                    RegistrationStatus::Registered,
                )
            })
            .collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    fn t0() -> OffsetDateTime {
        datetime!(2025-06-01 10:00 UTC)
    }

    fn t1() -> OffsetDateTime {
        datetime!(2025-06-01 10:20 UTC)
    }

    fn assert_playing_matches_open_games(event: &Event) {
        for player in event.players.values() {
            let open_games = event
                .games
                .iter()
                .filter(|game| game.is_active() && game.player_ids.contains(&player.id))
                .count();
            match player.state {
                PlayerState::Playing => assert_eq!(open_games, 1, "player {}", player.id),
                _ => assert_eq!(open_games, 0, "player {}", player.id),
            }
        }
    }

    // Scenario: four players, one court.
    #[test]
    fn seed_fills_single_court_exactly() {
        let mut event = Event::new(1, roster(&["a", "b", "c", "d"]));

        let outcome = seed_courts(&mut event, t0(), &mut rng());

        assert_eq!(outcome.games_started.len(), 1);
        assert_eq!(event.games.len(), 1);
        let ids: HashSet<&String> = event.games[0].player_ids.iter().collect();
        assert_eq!(ids.len(), 4);
        assert!(event.queue.is_empty());
        assert_playing_matches_open_games(&event);
    }

    // Scenario: six players, one court, then an advance.
    #[test]
    fn advance_prioritizes_waiters_as_anchors() {
        let mut event = Event::new(1, roster(&["a", "b", "c", "d", "e", "f"]));
        let mut rng = rng();

        seed_courts(&mut event, t0(), &mut rng);

        let playing: Vec<String> = event.games[0].player_ids.to_vec();
        let waiting: Vec<String> = event.queue.clone();
        assert_eq!(playing.len(), 4);
        assert_eq!(waiting.len(), 2);

        let court_id = event.courts[0].id;
        let outcome = finish_and_refill(&mut event, court_id, t1(), &mut rng).unwrap();

        assert_eq!(outcome.games_started.len(), 1);
        let start = &outcome.games_started[0];
        assert_eq!(start.anchor_ids, waiting);
        let next: Vec<&String> = start.players.iter().map(|p| &p.id).collect();
        assert!(waiting.iter().all(|id| next.contains(&id)));
        let filled_from_freed = next.iter().filter(|id| playing.contains(id)).count();
        assert_eq!(filled_from_freed, 2);

        assert!(event.games[0].end_time.is_some());
        assert_playing_matches_open_games(&event);
    }

    // Scenario: availability is half-open at the window end.
    #[test]
    fn player_whose_window_ends_at_seed_time_is_excluded() {
        let mut event = Event::new(1, roster(&["a", "b", "c", "d", "e"]));
        event.players.get_mut("e").unwrap().available_end = t0();

        seed_courts(&mut event, t0(), &mut rng());

        assert_eq!(event.games.len(), 1);
        assert!(!event.games[0].player_ids.contains(&"e".to_string()));
        assert_eq!(event.players["e"].state, PlayerState::Idle);
    }

    // Scenario: fewer than four eligible players.
    #[test]
    fn seed_with_too_few_players_leaves_court_idle() {
        let mut event = Event::new(1, roster(&["a", "b", "c"]));

        let outcome = seed_courts(&mut event, t0(), &mut rng());

        assert!(outcome.games_started.is_empty());
        assert!(event.games.is_empty());
        assert!(event.courts[0].current_game_id.is_none());
        assert_eq!(event.queue.len(), 3);
        assert!(
            event
                .players
                .values()
                .all(|p| p.state == PlayerState::Waiting)
        );
    }

    #[test]
    fn finish_on_empty_court_proceeds_to_refill() {
        let mut event = Event::new(1, roster(&["a", "b", "c", "d"]));
        let court_id = event.courts[0].id;

        let outcome = finish_and_refill(&mut event, court_id, t0(), &mut rng()).unwrap();

        assert_eq!(outcome.games_started.len(), 1);
        assert!(event.courts[0].current_game_id.is_some());
    }

    #[test]
    fn finish_on_unknown_court_is_an_error() {
        let mut event = Event::new(1, roster(&["a", "b", "c", "d"]));
        let bogus = Uuid::new_v4();

        let err = finish_and_refill(&mut event, bogus, t0(), &mut rng()).unwrap_err();

        assert_eq!(err.court_id, bogus);
        assert_eq!(err.event_id, event.id);
    }

    #[test]
    fn seed_skips_occupied_courts() {
        let mut event = Event::new(2, roster(&["a", "b", "c", "d", "e"]));
        let mut rng = rng();

        seed_courts(&mut event, t0(), &mut rng);
        assert_eq!(event.games.len(), 1);
        let occupied = event.games[0].court_id;

        // Re-seeding must not touch the running game.
        let outcome = seed_courts(&mut event, t1(), &mut rng);
        assert!(!outcome.court_ids.contains(&occupied));
        assert_eq!(event.games.len(), 1);
        assert!(event.games[0].is_active());
    }

    #[test]
    fn advance_all_turns_over_every_court() {
        let mut event = Event::new(2, roster(&["a", "b", "c", "d", "e", "f", "g", "h"]));
        let mut rng = rng();

        seed_courts(&mut event, t0(), &mut rng);
        assert_eq!(event.games.len(), 2);

        let outcome = advance_all(&mut event, t1(), &mut rng);

        assert_eq!(outcome.court_ids.len(), 2);
        assert_eq!(event.games.len(), 4);
        assert!(event.games[..2].iter().all(|game| !game.is_active()));
        assert!(event.games[2..].iter().all(Game::is_active));
        assert_playing_matches_open_games(&event);
    }

    #[test]
    fn games_played_counters_accumulate() {
        let mut event = Event::new(1, roster(&["a", "b", "c", "d"]));
        let mut rng = rng();

        seed_courts(&mut event, t0(), &mut rng);
        let court_id = event.courts[0].id;
        finish_and_refill(&mut event, court_id, t1(), &mut rng).unwrap();

        // With exactly four players everyone plays every round.
        assert!(event.players.values().all(|p| p.games_played == 2));
        assert!(
            event
                .players
                .values()
                .all(|p| p.last_played_at == Some(t1()))
        );
    }

    #[test]
    fn failed_refill_keeps_waiters_queued() {
        let mut event = Event::new(1, roster(&["a", "b", "c", "d", "e", "f"]));
        let mut rng = rng();

        seed_courts(&mut event, t0(), &mut rng);
        let waiting = event.queue.clone();

        // Everyone who was freed leaves their window at t1, so only the two
        // waiters remain and no new group can form.
        let playing: Vec<String> = event.games[0].player_ids.to_vec();
        for id in &playing {
            event.players.get_mut(id).unwrap().available_end = t1();
        }

        let court_id = event.courts[0].id;
        let outcome = finish_and_refill(&mut event, court_id, t1(), &mut rng).unwrap();

        assert!(outcome.games_started.is_empty());
        assert_eq!(event.queue, waiting);
        assert!(event.courts[0].current_game_id.is_none());
        assert!(
            waiting
                .iter()
                .all(|id| event.players[id].state == PlayerState::Waiting)
        );
    }

    #[test]
    fn audit_records_capture_queue_transitions() {
        let mut event = Event::new(1, roster(&["a", "b", "c", "d", "e", "f"]));

        let outcome = seed_courts(&mut event, t0(), &mut rng());

        assert!(outcome.queue_before.is_empty());
        assert_eq!(outcome.queue_after.len(), 2);
        let start = &outcome.games_started[0];
        assert_eq!(start.queue_before.len(), 6);
        assert_eq!(start.queue_after.len(), 2);
        assert_eq!(start.players.len(), 4);
        assert_eq!(start.action, RunAction::Seed);
    }
}
