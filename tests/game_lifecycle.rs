//! Lifecycle exercises of the game shelf service over the in-memory store:
//! creation defaults, completion derivation, now-playing exclusivity,
//! delete-time reassignment, and owner isolation.

use std::sync::Arc;

use uuid::Uuid;

use game_shelf_back::{
    auth::{IdentityConfig, IdentityVerifier},
    dao::game_store::memory::MemoryGameStore,
    dao::models::GameStatus,
    dto::game::{CreateGameRequest, UpdateGameRequest},
    error::ServiceError,
    services::game_service,
    state::{AppState, SharedState},
};

async fn fresh_state() -> SharedState {
    let identity = IdentityVerifier::new(IdentityConfig::new("http://identity.invalid", "test-key"))
        .expect("identity client");
    let state = AppState::new(identity);
    state.set_game_store(Arc::new(MemoryGameStore::new())).await;
    state
}

fn create_request(title: &str) -> CreateGameRequest {
    CreateGameRequest {
        title: title.into(),
        platform: "PC".into(),
        status: GameStatus::Backlog,
        cover_art_url: None,
        estimated_hours: 40.0,
    }
}

fn promote() -> UpdateGameRequest {
    UpdateGameRequest {
        is_current: Some(true),
        ..UpdateGameRequest::default()
    }
}

#[tokio::test]
async fn creating_a_game_starts_unplayed_and_not_current() {
    let state = fresh_state().await;
    let owner = Uuid::new_v4();

    let game = game_service::create_game(&state, owner, create_request("Elden Ring"))
        .await
        .expect("create");

    assert_eq!(game.title, "Elden Ring");
    assert_eq!(game.status, GameStatus::Backlog);
    assert_eq!(game.hours_played, 0.0);
    assert_eq!(game.estimated_hours, 40.0);
    assert_eq!(game.completion_percent, 0);
    assert!(!game.is_current);
    assert!(game.last_now_playing_at.is_none());
}

#[tokio::test]
async fn adding_hours_recalculates_completion() {
    let state = fresh_state().await;
    let owner = Uuid::new_v4();
    let game = game_service::create_game(&state, owner, create_request("Elden Ring"))
        .await
        .expect("create");

    let patch = UpdateGameRequest {
        add_hours: Some(20.0),
        ..UpdateGameRequest::default()
    };
    let updated = game_service::update_game(&state, owner, game.id, patch)
        .await
        .expect("update");

    assert_eq!(updated.hours_played, 20.0);
    assert_eq!(updated.completion_percent, 50);
}

#[tokio::test]
async fn completion_is_clamped_and_follows_estimate_changes() {
    let state = fresh_state().await;
    let owner = Uuid::new_v4();
    let game = game_service::create_game(&state, owner, create_request("Hades"))
        .await
        .expect("create");

    let patch = UpdateGameRequest {
        hours_played: Some(10.0),
        estimated_hours: Some(20.0),
        ..UpdateGameRequest::default()
    };
    let updated = game_service::update_game(&state, owner, game.id, patch)
        .await
        .expect("update");
    assert_eq!(updated.completion_percent, 50);

    let overshoot = UpdateGameRequest {
        add_hours: Some(500.0),
        ..UpdateGameRequest::default()
    };
    let updated = game_service::update_game(&state, owner, game.id, overshoot)
        .await
        .expect("update");
    assert_eq!(updated.completion_percent, 100);
}

#[tokio::test]
async fn promotion_holds_a_single_now_playing_slot() {
    let state = fresh_state().await;
    let owner = Uuid::new_v4();
    let first = game_service::create_game(&state, owner, create_request("Elden Ring"))
        .await
        .expect("create");
    let second = game_service::create_game(&state, owner, create_request("Hades"))
        .await
        .expect("create");

    let promoted = game_service::update_game(&state, owner, first.id, promote())
        .await
        .expect("promote first");
    assert!(promoted.is_current);
    assert_eq!(promoted.status, GameStatus::Playing);
    assert!(promoted.last_now_playing_at.is_some());

    let promoted = game_service::update_game(&state, owner, second.id, promote())
        .await
        .expect("promote second");
    assert!(promoted.is_current);

    let shelf = game_service::list_games(&state, owner).await.expect("list");
    let current_ids: Vec<i64> = shelf
        .iter()
        .filter(|game| game.is_current)
        .map(|game| game.id)
        .collect();
    assert_eq!(current_ids, vec![second.id]);

    // The demoted record keeps its play history.
    let first_again = shelf.iter().find(|game| game.id == first.id).expect("first");
    assert!(first_again.last_now_playing_at.is_some());
}

#[tokio::test]
async fn listing_orders_by_current_then_recency_then_id() {
    let state = fresh_state().await;
    let owner = Uuid::new_v4();
    let a = game_service::create_game(&state, owner, create_request("A"))
        .await
        .expect("create");
    let b = game_service::create_game(&state, owner, create_request("B"))
        .await
        .expect("create");
    let c = game_service::create_game(&state, owner, create_request("C"))
        .await
        .expect("create");

    game_service::update_game(&state, owner, a.id, promote())
        .await
        .expect("promote a");
    game_service::update_game(&state, owner, b.id, promote())
        .await
        .expect("promote b");

    let shelf = game_service::list_games(&state, owner).await.expect("list");
    let ids: Vec<i64> = shelf.iter().map(|game| game.id).collect();
    // B holds the slot, A played before it, C never played.
    assert_eq!(ids, vec![b.id, a.id, c.id]);
}

#[tokio::test]
async fn deleting_the_current_game_promotes_the_most_recent_replacement() {
    let state = fresh_state().await;
    let owner = Uuid::new_v4();
    let first = game_service::create_game(&state, owner, create_request("Elden Ring"))
        .await
        .expect("create");
    let second = game_service::create_game(&state, owner, create_request("Hades"))
        .await
        .expect("create");

    game_service::update_game(&state, owner, second.id, promote())
        .await
        .expect("promote second");
    let deleted = game_service::delete_game(&state, owner, second.id)
        .await
        .expect("delete");
    assert_eq!(deleted.deleted, second.id);

    // The only remaining game takes over the slot even though it was never
    // played.
    let current = game_service::current_game(&state, owner)
        .await
        .expect("current");
    assert_eq!(current.id, first.id);
    assert!(current.is_current);
    assert_eq!(current.status, GameStatus::Playing);
}

#[tokio::test]
async fn delete_reassignment_prefers_recent_play_over_newest_id() {
    let state = fresh_state().await;
    let owner = Uuid::new_v4();
    let a = game_service::create_game(&state, owner, create_request("A"))
        .await
        .expect("create");
    let b = game_service::create_game(&state, owner, create_request("B"))
        .await
        .expect("create");
    let c = game_service::create_game(&state, owner, create_request("C"))
        .await
        .expect("create");

    game_service::update_game(&state, owner, a.id, promote())
        .await
        .expect("promote a");
    game_service::update_game(&state, owner, c.id, promote())
        .await
        .expect("promote c");

    game_service::delete_game(&state, owner, c.id)
        .await
        .expect("delete c");

    // A was played more recently than B (which never was), so A wins even
    // though B has the higher id.
    let current = game_service::current_game(&state, owner)
        .await
        .expect("current");
    assert_eq!(current.id, a.id);

    game_service::delete_game(&state, owner, a.id)
        .await
        .expect("delete a");
    let current = game_service::current_game(&state, owner)
        .await
        .expect("current");
    assert_eq!(current.id, b.id);
    assert!(current.is_current);

    game_service::delete_game(&state, owner, b.id)
        .await
        .expect("delete b");
    let err = game_service::current_game(&state, owner)
        .await
        .expect_err("no games left");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn deleting_a_non_current_game_leaves_the_slot_alone() {
    let state = fresh_state().await;
    let owner = Uuid::new_v4();
    let first = game_service::create_game(&state, owner, create_request("Elden Ring"))
        .await
        .expect("create");
    let second = game_service::create_game(&state, owner, create_request("Hades"))
        .await
        .expect("create");

    game_service::update_game(&state, owner, first.id, promote())
        .await
        .expect("promote first");
    game_service::delete_game(&state, owner, second.id)
        .await
        .expect("delete second");

    let current = game_service::current_game(&state, owner)
        .await
        .expect("current");
    assert_eq!(current.id, first.id);
}

#[tokio::test]
async fn negative_hours_are_rejected_without_state_change() {
    let state = fresh_state().await;
    let owner = Uuid::new_v4();
    let game = game_service::create_game(&state, owner, create_request("Elden Ring"))
        .await
        .expect("create");

    let patch = UpdateGameRequest {
        hours_played: Some(-5.0),
        ..UpdateGameRequest::default()
    };
    let err = game_service::update_game(&state, owner, game.id, patch)
        .await
        .expect_err("negative hours");
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let patch = UpdateGameRequest {
        estimated_hours: Some(0.0),
        ..UpdateGameRequest::default()
    };
    let err = game_service::update_game(&state, owner, game.id, patch)
        .await
        .expect_err("zero estimate");
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let shelf = game_service::list_games(&state, owner).await.expect("list");
    assert_eq!(shelf[0].hours_played, 0.0);
    assert_eq!(shelf[0].estimated_hours, 40.0);
    assert_eq!(shelf[0].updated_at, game.updated_at);
}

#[tokio::test]
async fn create_rejects_a_non_positive_estimate() {
    let state = fresh_state().await;
    let owner = Uuid::new_v4();

    let mut request = create_request("Elden Ring");
    request.estimated_hours = 0.0;
    let err = game_service::create_game(&state, owner, request)
        .await
        .expect_err("zero estimate");
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

#[tokio::test]
async fn metadata_updates_keep_completion_but_refresh_updated_at() {
    let state = fresh_state().await;
    let owner = Uuid::new_v4();
    let game = game_service::create_game(&state, owner, create_request("Elden Ring"))
        .await
        .expect("create");

    let patch = UpdateGameRequest {
        add_hours: Some(10.0),
        ..UpdateGameRequest::default()
    };
    let played = game_service::update_game(&state, owner, game.id, patch)
        .await
        .expect("update hours");

    let patch = UpdateGameRequest {
        title: Some("Elden Ring: Shadow of the Erdtree".into()),
        status: Some(GameStatus::Completed),
        ..UpdateGameRequest::default()
    };
    let renamed = game_service::update_game(&state, owner, game.id, patch)
        .await
        .expect("update metadata");

    assert_eq!(renamed.title, "Elden Ring: Shadow of the Erdtree");
    assert_eq!(renamed.status, GameStatus::Completed);
    assert_eq!(renamed.completion_percent, played.completion_percent);
    assert_eq!(renamed.hours_played, played.hours_played);
    assert_ne!(renamed.updated_at, game.updated_at);
}

#[tokio::test]
async fn current_falls_back_to_the_newest_record_when_nothing_is_flagged() {
    let state = fresh_state().await;
    let owner = Uuid::new_v4();
    game_service::create_game(&state, owner, create_request("A"))
        .await
        .expect("create");
    let b = game_service::create_game(&state, owner, create_request("B"))
        .await
        .expect("create");

    // Nothing was ever promoted; the fallback picks the newest record but
    // does not promote it.
    let current = game_service::current_game(&state, owner)
        .await
        .expect("current");
    assert_eq!(current.id, b.id);
    assert!(!current.is_current);

    let shelf = game_service::list_games(&state, owner).await.expect("list");
    assert!(shelf.iter().all(|game| !game.is_current));
}

#[tokio::test]
async fn owners_never_observe_each_other() {
    let state = fresh_state().await;
    let alice = Uuid::new_v4();
    let blake = Uuid::new_v4();

    let alices = game_service::create_game(&state, alice, create_request("Elden Ring"))
        .await
        .expect("create");
    game_service::create_game(&state, blake, create_request("Hades"))
        .await
        .expect("create");

    let shelf = game_service::list_games(&state, blake).await.expect("list");
    assert_eq!(shelf.len(), 1);
    assert_eq!(shelf[0].title, "Hades");

    let err = game_service::update_game(&state, blake, alices.id, promote())
        .await
        .expect_err("cross-owner update");
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = game_service::delete_game(&state, blake, alices.id)
        .await
        .expect_err("cross-owner delete");
    assert!(matches!(err, ServiceError::NotFound(_)));

    // Alice's record is untouched by the failed cross-owner mutations.
    let shelf = game_service::list_games(&state, alice).await.expect("list");
    assert_eq!(shelf.len(), 1);
    assert_eq!(shelf[0].id, alices.id);
    assert!(!shelf[0].is_current);
}

#[tokio::test]
async fn updating_an_unknown_id_is_not_found() {
    let state = fresh_state().await;
    let owner = Uuid::new_v4();

    let err = game_service::update_game(&state, owner, 42, promote())
        .await
        .expect_err("unknown id");
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = game_service::delete_game(&state, owner, 42)
        .await
        .expect_err("unknown id");
    assert!(matches!(err, ServiceError::NotFound(_)));
}
