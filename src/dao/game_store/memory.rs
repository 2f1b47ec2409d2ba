//! In-memory storage backend.
//!
//! Keeps every record in process memory; used for ephemeral deployments and
//! as the test double. Mutating operations serialize behind a single write
//! gate so the demote-then-promote sequence is atomic with respect to other
//! writers, standing in for the relational backend's transactions.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use futures::future::BoxFuture;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    dao::{
        game_store::{DeleteOutcome, GameStore},
        models::{GameChanges, GameEntity, GameId, NewGameEntity},
        storage::StorageResult,
    },
    library::now_playing,
};

/// Storage backend keeping records in a process-local map.
#[derive(Clone, Default)]
pub struct MemoryGameStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    records: DashMap<GameId, GameEntity>,
    next_id: AtomicI64,
    write_gate: Mutex<()>,
}

impl MemoryGameStore {
    /// Construct an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn owned(&self, owner: Uuid) -> Vec<GameEntity> {
        self.inner
            .records
            .iter()
            .filter(|entry| entry.value().owner_id == owner)
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn demote_others(&self, owner: Uuid, keep: GameId, at: OffsetDateTime) {
        for mut entry in self.inner.records.iter_mut() {
            let record = entry.value_mut();
            if record.owner_id == owner && record.id != keep && record.is_current {
                now_playing::apply_demotion(record, at);
            }
        }
    }

    async fn insert(&self, game: NewGameEntity) -> GameEntity {
        let _gate = self.inner.write_gate.lock().await;
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let entity = game.into_entity(id);
        self.inner.records.insert(id, entity.clone());
        entity
    }

    fn list(&self, owner: Uuid) -> Vec<GameEntity> {
        let mut games = self.owned(owner);
        games.sort_by(now_playing::shelf_order);
        games
    }

    fn current(&self, owner: Uuid) -> Option<GameEntity> {
        self.inner
            .records
            .iter()
            .find(|entry| entry.value().owner_id == owner && entry.value().is_current)
            .map(|entry| entry.value().clone())
    }

    fn most_recent(&self, owner: Uuid) -> Option<GameEntity> {
        let games = self.owned(owner);
        now_playing::select_replacement(&games).cloned()
    }

    async fn update(
        &self,
        owner: Uuid,
        id: GameId,
        changes: GameChanges,
        at: OffsetDateTime,
    ) -> Option<GameEntity> {
        let _gate = self.inner.write_gate.lock().await;
        let mut entity = match self.inner.records.get(&id) {
            Some(found) if found.owner_id == owner => found.clone(),
            _ => return None,
        };

        let promote = changes.apply(&mut entity);
        if promote {
            self.demote_others(owner, id, at);
            now_playing::apply_promotion(&mut entity, at);
        }

        entity.recalc_completion();
        entity.updated_at = at;
        self.inner.records.insert(id, entity.clone());
        Some(entity)
    }

    async fn delete(&self, owner: Uuid, id: GameId, at: OffsetDateTime) -> Option<DeleteOutcome> {
        let _gate = self.inner.write_gate.lock().await;
        let deleted = match self.inner.records.get(&id) {
            Some(found) if found.owner_id == owner => found.clone(),
            _ => return None,
        };
        self.inner.records.remove(&id);

        let mut promoted = None;
        if deleted.is_current {
            let remaining = self.owned(owner);
            if let Some(pick) = now_playing::select_replacement(&remaining) {
                let mut replacement = pick.clone();
                now_playing::apply_promotion(&mut replacement, at);
                self.inner
                    .records
                    .insert(replacement.id, replacement.clone());
                promoted = Some(replacement);
            }
        }

        Some(DeleteOutcome { deleted, promoted })
    }
}

impl GameStore for MemoryGameStore {
    fn insert_game(&self, game: NewGameEntity) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.insert(game).await) })
    }

    fn list_games(&self, owner: Uuid) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.list(owner)) })
    }

    fn find_current(&self, owner: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.current(owner)) })
    }

    fn find_most_recent(
        &self,
        owner: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.most_recent(owner)) })
    }

    fn update_game(
        &self,
        owner: Uuid,
        id: GameId,
        changes: GameChanges,
        at: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.update(owner, id, changes, at).await) })
    }

    fn delete_game(
        &self,
        owner: Uuid,
        id: GameId,
        at: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<Option<DeleteOutcome>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.delete(owner, id, at).await) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
