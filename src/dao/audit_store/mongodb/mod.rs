mod connection;
mod error;
pub mod config;
pub mod store;

pub use config::MongoConfig;
pub use error::MongoAuditError;
pub use store::MongoAuditStore;

use crate::dao::storage::StorageError;

impl From<MongoAuditError> for StorageError {
    fn from(err: MongoAuditError) -> Self {
        match err {
            MongoAuditError::RecordGame { .. } | MongoAuditError::RecordRun { .. } => {
                StorageError::append_failed(err.to_string(), err)
            }
            _ => StorageError::unavailable(err.to_string(), err),
        }
    }
}
