//! Business logic powering the game shelf REST routes. These helpers scope
//! every storage operation to the calling owner and keep the now-playing and
//! completion invariants satisfied through the store contracts.

use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::models::{GameChanges, GameId, NewGameEntity},
    dto::game::{CreateGameRequest, DeleteGameResponse, GameResponse, UpdateGameRequest},
    error::ServiceError,
    state::SharedState,
};

/// Return every record on the owner's shelf, the current game first.
pub async fn list_games(
    state: &SharedState,
    owner: Uuid,
) -> Result<Vec<GameResponse>, ServiceError> {
    let store = state.require_game_store().await?;
    let games = store.list_games(owner).await?;
    Ok(games.into_iter().map(Into::into).collect())
}

/// Return the owner's now-playing record.
///
/// When nothing is flagged current the most recently played record is
/// returned instead, without promoting it.
pub async fn current_game(state: &SharedState, owner: Uuid) -> Result<GameResponse, ServiceError> {
    let store = state.require_game_store().await?;

    if let Some(current) = store.find_current(owner).await? {
        return Ok(current.into());
    }

    let Some(fallback) = store.find_most_recent(owner).await? else {
        return Err(ServiceError::NotFound(
            "no games found for this user".into(),
        ));
    };
    Ok(fallback.into())
}

/// Create a new record on the owner's shelf.
pub async fn create_game(
    state: &SharedState,
    owner: Uuid,
    request: CreateGameRequest,
) -> Result<GameResponse, ServiceError> {
    let store = state.require_game_store().await?;

    let CreateGameRequest {
        title,
        platform,
        status,
        cover_art_url,
        estimated_hours,
    } = request;

    if title.trim().is_empty() {
        return Err(ServiceError::InvalidInput("title must not be empty".into()));
    }
    if platform.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "platform must not be empty".into(),
        ));
    }
    if estimated_hours <= 0.0 {
        return Err(ServiceError::InvalidInput(
            "estimated_hours must be > 0".into(),
        ));
    }

    let game = NewGameEntity {
        owner_id: owner,
        title,
        platform,
        status,
        cover_art_url,
        estimated_hours,
        created_at: OffsetDateTime::now_utc(),
    };

    let created = store.insert_game(game).await?;
    info!(owner = %owner, id = created.id, "created game record");
    Ok(created.into())
}

/// Apply a partial update to one of the owner's records.
///
/// A requested promotion runs before the unconditional completion
/// recalculation, inside the store's transactional unit.
pub async fn update_game(
    state: &SharedState,
    owner: Uuid,
    id: GameId,
    request: UpdateGameRequest,
) -> Result<GameResponse, ServiceError> {
    let store = state.require_game_store().await?;

    let changes: GameChanges = request.into();
    changes
        .validate()
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;

    let updated = store
        .update_game(owner, id, changes, OffsetDateTime::now_utc())
        .await?;
    let Some(updated) = updated else {
        return Err(not_found(id));
    };

    Ok(updated.into())
}

/// Remove one of the owner's records.
///
/// When the removed record held the now-playing slot the store promotes the
/// most recently played remaining record in the same transactional unit.
pub async fn delete_game(
    state: &SharedState,
    owner: Uuid,
    id: GameId,
) -> Result<DeleteGameResponse, ServiceError> {
    let store = state.require_game_store().await?;

    let outcome = store
        .delete_game(owner, id, OffsetDateTime::now_utc())
        .await?;
    let Some(outcome) = outcome else {
        return Err(not_found(id));
    };

    if let Some(promoted) = &outcome.promoted {
        debug!(
            owner = %owner,
            id = promoted.id,
            "promoted replacement after deleting the current game"
        );
    }

    Ok(DeleteGameResponse {
        deleted: outcome.deleted.id,
    })
}

fn not_found(id: GameId) -> ServiceError {
    ServiceError::NotFound(format!("game `{id}` not found"))
}
