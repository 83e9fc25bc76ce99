use time::OffsetDateTime;

/// Where a player currently sits in the matchmaking cycle.
///
/// `Idle` and `Waiting` both mean "matchable"; they differ only in whether the
/// player holds an explicit slot in the event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Not playing and not queued.
    Idle,
    /// Queued for the next available group.
    Waiting,
    /// Assigned to a game whose end time is still open.
    Playing,
}

/// Registration outcome reported by the upstream registration service.
///
/// Carried for traceability only; matchmaking never filters on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// Confirmed registration.
    Registered,
    /// On the registration waitlist.
    Waitlist,
    /// Registration was canceled upstream.
    Canceled,
}

impl RegistrationStatus {
    /// Parse the upstream wire value (`registered`, `waitlist`, `canceled`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "registered" => Some(Self::Registered),
            "waitlist" => Some(Self::Waitlist),
            "canceled" => Some(Self::Canceled),
            _ => None,
        }
    }

    /// Wire representation accepted from and echoed back to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Waitlist => "waitlist",
            Self::Canceled => "canceled",
        }
    }
}

/// A roster member tracked for the lifetime of an event.
#[derive(Debug, Clone)]
pub struct Player {
    /// Upstream-supplied identifier, unique within the event roster.
    pub id: String,
    /// Display name used in audit snapshots and status projections.
    pub name: String,
    /// Start of the availability window (inclusive).
    pub available_start: OffsetDateTime,
    /// End of the availability window (exclusive).
    pub available_end: OffsetDateTime,
    /// Number of games this player has started during the event.
    pub games_played: u32,
    /// Instant the player last started a game, if any.
    pub last_played_at: Option<OffsetDateTime>,
    /// Current matchmaking state.
    pub state: PlayerState,
    /// Instant the player first entered the queue; set iff state is Waiting.
    pub waiting_since: Option<OffsetDateTime>,
    /// Upstream registration outcome, informational only.
    pub registration_status: RegistrationStatus,
}

impl Player {
    /// Build a normalized roster entry from ingested data.
    ///
    /// Counters and timestamps are reset regardless of what the upstream
    /// payload claimed: every roster replacement starts the player Idle with
    /// zero games played.
    pub fn new(
        id: String,
        name: String,
        available_start: OffsetDateTime,
        available_end: OffsetDateTime,
        registration_status: RegistrationStatus,
    ) -> Self {
        Self {
            id,
            name,
            available_start,
            available_end,
            games_played: 0,
            last_played_at: None,
            state: PlayerState::Idle,
            waiting_since: None,
            registration_status,
        }
    }

    /// Whether the player's availability window covers `at`.
    ///
    /// The window is half-open: a player is not available at the exact
    /// instant it ends.
    pub fn is_available_at(&self, at: OffsetDateTime) -> bool {
        self.available_start <= at && at < self.available_end
    }

    /// Whether the player can be placed into a new group at `at`.
    pub fn is_matchable_at(&self, at: OffsetDateTime) -> bool {
        self.is_available_at(at) && self.state != PlayerState::Playing
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn player(start: OffsetDateTime, end: OffsetDateTime) -> Player {
        Player::new(
            "p1".into(),
            "Alice".into(),
            start,
            end,
            RegistrationStatus::Registered,
        )
    }

    #[test]
    fn available_inside_window() {
        let p = player(
            datetime!(2025-06-01 09:00 UTC),
            datetime!(2025-06-01 12:00 UTC),
        );
        assert!(p.is_available_at(datetime!(2025-06-01 10:30 UTC)));
    }

    #[test]
    fn available_exactly_at_start() {
        let p = player(
            datetime!(2025-06-01 09:00 UTC),
            datetime!(2025-06-01 12:00 UTC),
        );
        assert!(p.is_available_at(datetime!(2025-06-01 09:00 UTC)));
    }

    #[test]
    fn not_available_exactly_at_end() {
        let p = player(
            datetime!(2025-06-01 09:00 UTC),
            datetime!(2025-06-01 12:00 UTC),
        );
        assert!(!p.is_available_at(datetime!(2025-06-01 12:00 UTC)));
    }

    #[test]
    fn not_available_outside_window() {
        let p = player(
            datetime!(2025-06-01 09:00 UTC),
            datetime!(2025-06-01 12:00 UTC),
        );
        assert!(!p.is_available_at(datetime!(2025-06-01 08:59:59 UTC)));
        assert!(!p.is_available_at(datetime!(2025-06-01 12:00:01 UTC)));
    }

    #[test]
    fn playing_player_is_not_matchable() {
        let mut p = player(
            datetime!(2025-06-01 09:00 UTC),
            datetime!(2025-06-01 12:00 UTC),
        );
        p.state = PlayerState::Playing;
        assert!(!p.is_matchable_at(datetime!(2025-06-01 10:00 UTC)));
    }

    #[test]
    fn ingestion_normalizes_counters() {
        let p = player(
            datetime!(2025-06-01 09:00 UTC),
            datetime!(2025-06-01 12:00 UTC),
        );
        assert_eq!(p.games_played, 0);
        assert_eq!(p.state, PlayerState::Idle);
        assert!(p.last_played_at.is_none());
        assert!(p.waiting_since.is_none());
    }

    #[test]
    fn registration_status_round_trip() {
        for raw in ["registered", "waitlist", "canceled"] {
            let status = RegistrationStatus::parse(raw).unwrap();
            assert_eq!(status.as_str(), raw);
        }
        assert!(RegistrationStatus::parse("pending").is_none());
    }
}
