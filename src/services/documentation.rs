use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Game Shelf Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::list_games,
        crate::routes::game::current_game,
        crate::routes::game::create_game,
        crate::routes::game::update_game,
        crate::routes::game::delete_game,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::UpdateGameRequest,
            crate::dto::game::GameResponse,
            crate::dto::game::DeleteGameResponse,
            crate::dao::models::GameStatus,
        )
    ),
    tags(
        (name = "games", description = "Owner-scoped game shelf operations"),
        (name = "health", description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
