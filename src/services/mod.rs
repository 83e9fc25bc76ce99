/// OpenAPI document assembly.
pub mod documentation;
/// Event creation, roster ingestion, status projection, and closing.
pub mod event_service;
/// Health status reporting.
pub mod health_service;
/// Matchmaking passes: seed, advance, advance-all.
pub mod match_service;
/// Background supervision of the audit storage connection.
pub mod storage_supervisor;
