use std::sync::Arc;

use futures::future::BoxFuture;
use mongodb::{Collection, Database, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoAuditError, MongoResult},
};
use crate::dao::{
    audit_store::AuditStore,
    models::{GameAuditEntity, RunAuditEntity},
    storage::StorageResult,
};

const GAME_AUDIT_COLLECTION: &str = "game_audits";
const RUN_AUDIT_COLLECTION: &str = "run_audits";

/// Audit store backed by two append-only MongoDB collections.
#[derive(Clone)]
pub struct MongoAuditStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoAuditError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let database =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.database = database;
        Ok(())
    }
}

impl MongoAuditStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    /// Index both collections by event id so external consumers can slice the
    /// trail per event; the engine itself never queries them.
    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let game_index = mongodb::IndexModel::builder()
            .keys(doc! {"event_id": 1, "at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("game_audit_event_idx".to_owned()))
                    .build(),
            )
            .build();
        database
            .collection::<GameAuditEntity>(GAME_AUDIT_COLLECTION)
            .create_index(game_index)
            .await
            .map_err(|source| MongoAuditError::EnsureIndex {
                collection: GAME_AUDIT_COLLECTION,
                index: "event_id,at",
                source,
            })?;

        let run_index = mongodb::IndexModel::builder()
            .keys(doc! {"event_id": 1, "at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("run_audit_event_idx".to_owned()))
                    .build(),
            )
            .build();
        database
            .collection::<RunAuditEntity>(RUN_AUDIT_COLLECTION)
            .create_index(run_index)
            .await
            .map_err(|source| MongoAuditError::EnsureIndex {
                collection: RUN_AUDIT_COLLECTION,
                index: "event_id,at",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn game_collection(&self) -> Collection<GameAuditEntity> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<GameAuditEntity>(GAME_AUDIT_COLLECTION)
    }

    async fn run_collection(&self) -> Collection<RunAuditEntity> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<RunAuditEntity>(RUN_AUDIT_COLLECTION)
    }

    async fn record_game(&self, entry: GameAuditEntity) -> MongoResult<()> {
        let game_id = entry.game_id;
        let collection = self.game_collection().await;
        collection
            .insert_one(&entry)
            .await
            .map_err(|source| MongoAuditError::RecordGame { game_id, source })?;
        Ok(())
    }

    async fn record_run(&self, entry: RunAuditEntity) -> MongoResult<()> {
        let event_id = entry.event_id;
        let collection = self.run_collection().await;
        collection
            .insert_one(&entry)
            .await
            .map_err(|source| MongoAuditError::RecordRun { event_id, source })?;
        Ok(())
    }
}

impl AuditStore for MongoAuditStore {
    fn record_game(&self, entry: GameAuditEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.record_game(entry).await.map_err(Into::into) })
    }

    fn record_run(&self, entry: RunAuditEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.record_run(entry).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
