//! Storage backends for owner-scoped game records.

pub mod memory;
#[cfg(feature = "sqlite-store")]
pub mod sqlite;

use futures::future::BoxFuture;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dao::models::{GameChanges, GameEntity, GameId, NewGameEntity};
use crate::dao::storage::StorageResult;

/// Outcome of deleting a record, including the replacement promoted when the
/// deleted record held the owner's now-playing slot.
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    /// The record that was removed.
    pub deleted: GameEntity,
    /// Remaining record promoted to current inside the same transactional
    /// unit, when the deleted record was current and others remained.
    pub promoted: Option<GameEntity>,
}

/// Abstraction over the persistence layer for owner-scoped game records.
///
/// Implementations must never surface another owner's records, and must run
/// the multi-record promotion and delete-then-reassign sequences atomically
/// so at most one record per owner stays flagged current.
pub trait GameStore: Send + Sync {
    /// Insert a new record and return it with its assigned id.
    fn insert_game(&self, game: NewGameEntity) -> BoxFuture<'static, StorageResult<GameEntity>>;
    /// All records of the owner in shelf order: current game first, then
    /// most recently played (never-played last), then newest id.
    fn list_games(&self, owner: Uuid) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// The record currently flagged as now playing, if any.
    fn find_current(&self, owner: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// The owner's most recently played record, never-played records last,
    /// ties broken by highest id.
    fn find_most_recent(&self, owner: Uuid)
    -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Apply a validated partial update, running a requested promotion in
    /// the same transactional unit. `None` when `(owner, id)` matches
    /// nothing.
    fn update_game(
        &self,
        owner: Uuid,
        id: GameId,
        changes: GameChanges,
        at: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Delete a record, reassigning the now-playing slot in the same
    /// transactional unit when the deleted record held it. `None` when
    /// `(owner, id)` matches nothing.
    fn delete_game(
        &self,
        owner: Uuid,
        id: GameId,
        at: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<Option<DeleteOutcome>>>;
    /// Verify the backend is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish a dropped backend connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
