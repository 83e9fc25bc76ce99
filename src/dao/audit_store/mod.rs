#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;

use crate::dao::{
    models::{GameAuditEntity, RunAuditEntity},
    storage::StorageResult,
};

/// Abstraction over the append-only audit trail backend.
///
/// Records are written once and never read back by the engine; the trait
/// exposes no query surface on purpose.
pub trait AuditStore: Send + Sync {
    /// Append a per-game audit record.
    fn record_game(&self, entry: GameAuditEntity) -> BoxFuture<'static, StorageResult<()>>;

    /// Append a per-run audit record.
    fn record_run(&self, entry: RunAuditEntity) -> BoxFuture<'static, StorageResult<()>>;

    /// Ping the backend.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;

    /// Attempt to re-establish the backend connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
