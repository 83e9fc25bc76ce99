use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for Mongo audit-store operations.
pub type MongoResult<T> = std::result::Result<T, MongoAuditError>;

/// Errors raised by the MongoDB audit-trail backend.
#[derive(Debug, Error)]
pub enum MongoAuditError {
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// The offending URI.
        uri: String,
        #[source]
        source: MongoError,
    },
    /// A required environment variable is missing.
    #[error("required environment variable `{var}` is not set")]
    MissingEnvVar {
        /// Name of the missing variable.
        var: &'static str,
    },
    /// The Mongo client could not be built from the parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    /// The database never answered the initial ping.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Pings sent before giving up.
        attempts: u32,
        #[source]
        source: MongoError,
    },
    /// A routine health-check ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    /// Index creation failed at connection time.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection the index belongs to.
        collection: &'static str,
        /// Key specification of the index.
        index: &'static str,
        #[source]
        source: MongoError,
    },
    /// A per-game audit document could not be appended.
    #[error("failed to append game audit record for game `{game_id}`")]
    RecordGame {
        /// Game the lost record described.
        game_id: Uuid,
        #[source]
        source: MongoError,
    },
    /// A per-run audit document could not be appended.
    #[error("failed to append run audit record for event `{event_id}`")]
    RecordRun {
        /// Event the lost record described.
        event_id: Uuid,
        #[source]
        source: MongoError,
    },
}
