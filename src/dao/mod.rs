/// Append-only audit trail storage and retrieval operations.
pub mod audit_store;
/// Database model definitions for audit documents.
pub mod models;
/// In-memory event registry abstraction.
pub mod registry;
/// Storage abstraction layer for database operations.
pub mod storage;
