use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use validator::Validate;

use crate::{
    auth::Owner,
    dao::models::GameId,
    dto::game::{CreateGameRequest, DeleteGameResponse, GameResponse, UpdateGameRequest},
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes handling the owner-scoped game shelf CRUD surface.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/current", get(current_game))
        .route("/games/{id}", patch(update_game).delete(delete_game))
}

/// List the caller's games, most relevant first.
#[utoipa::path(
    get,
    path = "/games",
    tag = "games",
    responses(
        (status = 200, description = "Games owned by the caller, current game first", body = [GameResponse]),
        (status = 401, description = "Missing or invalid credential")
    )
)]
pub async fn list_games(
    State(state): State<SharedState>,
    Owner(owner): Owner,
) -> Result<Json<Vec<GameResponse>>, AppError> {
    Ok(Json(game_service::list_games(&state, owner).await?))
}

/// Return the caller's now-playing game, falling back to the most recently
/// played one.
#[utoipa::path(
    get,
    path = "/games/current",
    tag = "games",
    responses(
        (status = 200, description = "The caller's current game", body = GameResponse),
        (status = 404, description = "The caller has no games"),
        (status = 401, description = "Missing or invalid credential")
    )
)]
pub async fn current_game(
    State(state): State<SharedState>,
    Owner(owner): Owner,
) -> Result<Json<GameResponse>, AppError> {
    Ok(Json(game_service::current_game(&state, owner).await?))
}

/// Create a game record on the caller's shelf.
#[utoipa::path(
    post,
    path = "/games",
    tag = "games",
    request_body = CreateGameRequest,
    responses(
        (status = 200, description = "Game created", body = GameResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid credential")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Owner(owner): Owner,
    Json(payload): Json<CreateGameRequest>,
) -> Result<Json<GameResponse>, AppError> {
    payload.validate()?;
    Ok(Json(game_service::create_game(&state, owner, payload).await?))
}

/// Apply a partial update to one of the caller's games.
#[utoipa::path(
    patch,
    path = "/games/{id}",
    tag = "games",
    params(("id" = i64, Path, description = "Identifier of the game to update")),
    request_body = UpdateGameRequest,
    responses(
        (status = 200, description = "Updated game", body = GameResponse),
        (status = 400, description = "Invalid field value"),
        (status = 404, description = "No such game for this caller"),
        (status = 401, description = "Missing or invalid credential")
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    Owner(owner): Owner,
    Path(id): Path<GameId>,
    Json(payload): Json<UpdateGameRequest>,
) -> Result<Json<GameResponse>, AppError> {
    payload.validate()?;
    Ok(Json(
        game_service::update_game(&state, owner, id, payload).await?,
    ))
}

/// Delete one of the caller's games.
#[utoipa::path(
    delete,
    path = "/games/{id}",
    tag = "games",
    params(("id" = i64, Path, description = "Identifier of the game to delete")),
    responses(
        (status = 200, description = "Game deleted", body = DeleteGameResponse),
        (status = 404, description = "No such game for this caller"),
        (status = 401, description = "Missing or invalid credential")
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Owner(owner): Owner,
    Path(id): Path<GameId>,
) -> Result<Json<DeleteGameResponse>, AppError> {
    Ok(Json(game_service::delete_game(&state, owner, id).await?))
}
