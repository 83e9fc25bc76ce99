use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        audit_store::AuditStore,
        models::{GameAuditEntity, RunAuditEntity},
    },
    dto::matchmaking::RunSummary,
    error::ServiceError,
    services::event_service::require_event,
    state::{SharedState, lifecycle},
};

/// Fill every idle court of the event, enqueueing all matchable players first.
pub async fn seed(
    state: &SharedState,
    event_id: Uuid,
    at: Option<OffsetDateTime>,
) -> Result<RunSummary, ServiceError> {
    run_pass(state, event_id, at, |event, at, rng| {
        Ok(lifecycle::seed_courts(event, at, rng))
    })
    .await
}

/// End the active game on one court and immediately attempt to refill it.
pub async fn advance(
    state: &SharedState,
    event_id: Uuid,
    court_id: Uuid,
    at: Option<OffsetDateTime>,
) -> Result<RunSummary, ServiceError> {
    run_pass(state, event_id, at, move |event, at, rng| {
        lifecycle::finish_and_refill(event, court_id, at, rng).map_err(Into::into)
    })
    .await
}

/// Run the end-and-refill pass over every court of the event.
pub async fn advance_all(
    state: &SharedState,
    event_id: Uuid,
    at: Option<OffsetDateTime>,
) -> Result<RunSummary, ServiceError> {
    run_pass(state, event_id, at, |event, at, rng| {
        Ok(lifecycle::advance_all(event, at, rng))
    })
    .await
}

/// Shared scaffolding for every mutating matchmaking pass.
///
/// Passes are refused outright in degraded mode so the in-memory state never
/// drifts ahead of the audit trail. The per-event gate serializes concurrent
/// passes against the same event; the lifecycle mutation itself is synchronous
/// and the audit append is the only awaited work done under the gate.
async fn run_pass<F>(
    state: &SharedState,
    event_id: Uuid,
    at: Option<OffsetDateTime>,
    pass: F,
) -> Result<RunSummary, ServiceError>
where
    F: FnOnce(
        &mut crate::state::event::Event,
        OffsetDateTime,
        &mut rand::rngs::StdRng,
    ) -> Result<lifecycle::RunOutcome, ServiceError>,
{
    let store = state.require_audit_store().await?;
    let at = at.unwrap_or_else(OffsetDateTime::now_utc);

    let gate = state.event_gate(event_id);
    let _guard = gate.lock().await;

    let mut event = require_event(state, event_id)?;
    let outcome = {
        let mut rng = state.rng().lock().await;
        pass(&mut event, at, &mut *rng)?
    };
    state.registry().upsert(event);

    info!(
        event_id = %event_id,
        action = outcome.action.as_str(),
        courts = outcome.court_ids.len(),
        games_started = outcome.games_started.len(),
        "matchmaking pass applied"
    );

    persist_outcome(&store, event_id, &outcome).await?;

    Ok(RunSummary::from(&outcome))
}

/// Append the per-game and per-run audit records for a completed pass.
///
/// The pass has already mutated the registry at this point, so a failed
/// append surfaces as [`ServiceError::AuditUnrecorded`] rather than being
/// folded into a generic storage failure.
async fn persist_outcome(
    store: &Arc<dyn AuditStore>,
    event_id: Uuid,
    outcome: &lifecycle::RunOutcome,
) -> Result<(), ServiceError> {
    for start in &outcome.games_started {
        let entry = GameAuditEntity::from_start(event_id, start.clone());
        if let Err(err) = store.record_game(entry).await {
            warn!(event_id = %event_id, game_id = %start.game_id, %err, "game audit append failed");
            return Err(ServiceError::AuditUnrecorded(err));
        }
    }

    let entry = RunAuditEntity::from_outcome(event_id, outcome);
    if let Err(err) = store.record_run(entry).await {
        warn!(event_id = %event_id, %err, "run audit append failed");
        return Err(ServiceError::AuditUnrecorded(err));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    };

    use futures::future::BoxFuture;
    use rand::{SeedableRng, rngs::StdRng};
    use time::macros::datetime;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::storage::{StorageError, StorageResult},
        dto::event::{CreateEventRequest, PlayerInput},
        services::event_service,
        state::AppState,
    };

    fn injected_failure() -> StorageError {
        StorageError::append_failed("injected failure".into(), std::io::Error::other("boom"))
    }

    #[derive(Default)]
    struct RecordingAuditStore {
        games: Mutex<Vec<GameAuditEntity>>,
        runs: Mutex<Vec<RunAuditEntity>>,
        fail_appends: AtomicBool,
    }

    impl RecordingAuditStore {
        fn fail_appends(&self, value: bool) {
            self.fail_appends.store(value, Ordering::SeqCst);
        }
    }

    impl AuditStore for RecordingAuditStore {
        fn record_game(&self, entry: GameAuditEntity) -> BoxFuture<'static, StorageResult<()>> {
            let result = if self.fail_appends.load(Ordering::SeqCst) {
                Err(injected_failure())
            } else {
                self.games.lock().unwrap().push(entry);
                Ok(())
            };
            Box::pin(async move { result })
        }

        fn record_run(&self, entry: RunAuditEntity) -> BoxFuture<'static, StorageResult<()>> {
            let result = if self.fail_appends.load(Ordering::SeqCst) {
                Err(injected_failure())
            } else {
                self.runs.lock().unwrap().push(entry);
                Ok(())
            };
            Box::pin(async move { result })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn input(id: &str) -> PlayerInput {
        PlayerInput {
            id: id.into(),
            name: format!("Player {id}"),
            available_start: datetime!(2025-06-01 09:00 UTC),
            available_end: datetime!(2025-06-01 12:00 UTC),
            registration_status: "registered".into(),
            skill: None,
        }
    }

    async fn setup(
        court_count: usize,
        ids: &[&str],
    ) -> (crate::state::SharedState, Arc<RecordingAuditStore>, Uuid) {
        let state = AppState::with_rng(AppConfig::default(), StdRng::seed_from_u64(7));
        let store = Arc::new(RecordingAuditStore::default());
        state.install_audit_store(store.clone()).await;

        let summary = event_service::create_event(
            &state,
            CreateEventRequest {
                court_count,
                players: ids.iter().map(|id| input(id)).collect(),
            },
        )
        .await
        .unwrap();

        (state, store, summary.id)
    }

    fn t0() -> OffsetDateTime {
        datetime!(2025-06-01 10:00 UTC)
    }

    fn t1() -> OffsetDateTime {
        datetime!(2025-06-01 10:30 UTC)
    }

    #[tokio::test]
    async fn seed_records_game_and_run_audits() {
        let (state, store, event_id) = setup(1, &["a", "b", "c", "d", "e", "f"]).await;

        let summary = seed(&state, event_id, Some(t0())).await.unwrap();

        assert_eq!(summary.action, "seed");
        assert_eq!(summary.games.len(), 1);
        assert_eq!(summary.queue_after.len(), 2);

        let games = store.games.lock().unwrap();
        let runs = store.runs.lock().unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(runs.len(), 1);
        assert_eq!(games[0].event_id, event_id);
        assert_eq!(games[0].metrics.player_count, 4);
        assert_eq!(runs[0].game_ids, vec![games[0].game_id]);
    }

    #[tokio::test]
    async fn seed_without_audit_store_is_refused() {
        let (state, _store, event_id) = setup(1, &["a", "b", "c", "d"]).await;
        state.clear_audit_store().await;

        let err = seed(&state, event_id, Some(t0())).await.unwrap_err();

        assert!(matches!(err, ServiceError::Degraded));
        let projection = event_service::status(&state, event_id).await.unwrap();
        assert!(projection.courts[0].game.is_none());
    }

    #[tokio::test]
    async fn advance_unknown_court_is_not_found() {
        let (state, _store, event_id) = setup(1, &["a", "b", "c", "d"]).await;

        let err = advance(&state, event_id, Uuid::new_v4(), Some(t0()))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn advance_turns_over_a_court() {
        let (state, store, event_id) = setup(1, &["a", "b", "c", "d", "e", "f"]).await;

        let seeded = seed(&state, event_id, Some(t0())).await.unwrap();
        let court_id = seeded.games[0].court_id;

        let advanced = advance(&state, event_id, court_id, Some(t1())).await.unwrap();

        assert_eq!(advanced.action, "advance");
        assert_eq!(advanced.games.len(), 1);
        // The two seed-time waiters anchor the new group.
        let next: Vec<&String> = advanced.games[0].players.iter().map(|p| &p.id).collect();
        assert!(seeded.queue_after.iter().all(|id| next.contains(&id)));

        assert_eq!(store.games.lock().unwrap().len(), 2);
        assert_eq!(store.runs.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn advance_all_records_one_run_for_all_courts() {
        let (state, store, event_id) =
            setup(2, &["a", "b", "c", "d", "e", "f", "g", "h"]).await;

        seed(&state, event_id, Some(t0())).await.unwrap();
        let summary = advance_all(&state, event_id, Some(t1())).await.unwrap();

        assert_eq!(summary.court_ids.len(), 2);
        assert_eq!(summary.games.len(), 2);

        let runs = store.runs.lock().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].game_ids.len(), 2);
    }

    #[tokio::test]
    async fn failed_audit_append_surfaces_as_unrecorded() {
        let (state, store, event_id) = setup(1, &["a", "b", "c", "d"]).await;
        store.fail_appends(true);

        let err = seed(&state, event_id, Some(t0())).await.unwrap_err();

        assert!(matches!(err, ServiceError::AuditUnrecorded(_)));
        // The in-memory pass still happened; only the trail is missing.
        let projection = event_service::status(&state, event_id).await.unwrap();
        assert!(projection.courts[0].game.is_some());
    }

    #[tokio::test]
    async fn run_defaults_to_now_when_no_instant_given() {
        let (state, store, event_id) = setup(1, &["a", "b", "c", "d"]).await;

        // The test roster's window is in the past relative to the wall clock,
        // so a "now" pass finds nobody and starts nothing.
        let summary = seed(&state, event_id, None).await.unwrap();

        assert!(summary.games.is_empty());
        assert_eq!(store.runs.lock().unwrap().len(), 1);
    }
}
