//! Business logic sitting between the REST routes and the storage layer.

/// Aggregated OpenAPI document.
pub mod documentation;
/// Owner-scoped game shelf operations.
pub mod game_service;
/// Health reporting.
pub mod health_service;
/// Storage connection supervision.
pub mod storage_supervisor;
