use indexmap::IndexMap;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::state::player::Player;

/// A physical court, either idle or occupied by exactly one active game.
#[derive(Debug, Clone)]
pub struct Court {
    /// Stable identifier minted when the event is created.
    pub id: Uuid,
    /// Identifier of the active game, if the court is occupied.
    pub current_game_id: Option<Uuid>,
}

impl Court {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            current_game_id: None,
        }
    }
}

/// One game of four players on a single court.
///
/// Games are append-only history: they are never deleted, and `end_time` is
/// immutable once set.
#[derive(Debug, Clone)]
pub struct Game {
    /// Primary key of the game.
    pub id: Uuid,
    /// Court the game was played on.
    pub court_id: Uuid,
    /// The four distinct players assigned to the game.
    pub player_ids: [String; 4],
    /// Instant the game started.
    pub start_time: OffsetDateTime,
    /// Instant the game ended; `None` while the game is active.
    pub end_time: Option<OffsetDateTime>,
}

impl Game {
    /// Whether the game has not been ended yet.
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Aggregate holding everything the engine knows about one event: courts,
/// waiting queue, play history, and the full roster.
#[derive(Debug, Clone)]
pub struct Event {
    /// Primary key of the event.
    pub id: Uuid,
    /// Ordered list of courts available to the event.
    pub courts: Vec<Court>,
    /// FIFO waiting list of player ids. No duplicates; every entry refers to
    /// a player in the Waiting state.
    pub queue: Vec<String>,
    /// Every game ever started during the event, in start order.
    pub games: Vec<Game>,
    /// Full roster keyed by player id, in ingestion order.
    pub players: IndexMap<String, Player>,
}

impl Event {
    /// Create an event with `court_count` idle courts and the given roster.
    pub fn new(court_count: usize, players: Vec<Player>) -> Self {
        Self {
            id: Uuid::new_v4(),
            courts: (0..court_count).map(|_| Court::new()).collect(),
            queue: Vec::new(),
            games: Vec::new(),
            players: players.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    /// Replace the roster wholesale, resetting all matchmaking state.
    ///
    /// Queue, play history, and court occupancy are cleared; the incoming
    /// players are expected to already be normalized to Idle.
    pub fn replace_players(&mut self, players: Vec<Player>) {
        self.queue.clear();
        self.games.clear();
        for court in &mut self.courts {
            court.current_game_id = None;
        }
        self.players = players.into_iter().map(|p| (p.id.clone(), p)).collect();
    }

    /// Look up a court by id.
    pub fn court(&self, court_id: Uuid) -> Option<&Court> {
        self.courts.iter().find(|court| court.id == court_id)
    }

    /// Mutable court lookup.
    pub fn court_mut(&mut self, court_id: Uuid) -> Option<&mut Court> {
        self.courts.iter_mut().find(|court| court.id == court_id)
    }

    /// Look up a game by id in the play history.
    pub fn game(&self, game_id: Uuid) -> Option<&Game> {
        self.games.iter().find(|game| game.id == game_id)
    }

    /// Mutable game lookup.
    pub fn game_mut(&mut self, game_id: Uuid) -> Option<&mut Game> {
        self.games.iter_mut().find(|game| game.id == game_id)
    }

    /// The active game on a court, if any.
    pub fn active_game_on(&self, court_id: Uuid) -> Option<&Game> {
        let game_id = self.court(court_id)?.current_game_id?;
        self.game(game_id).filter(|game| game.is_active())
    }
}
