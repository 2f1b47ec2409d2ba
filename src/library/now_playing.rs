//! Single-current-game coordination policy.
//!
//! At most one record per owner carries the now-playing flag. The helpers
//! here mutate individual records; the storage backends are responsible for
//! running the demote-then-promote sequence inside one transactional unit.

use std::cmp::Ordering;

use time::OffsetDateTime;

use crate::dao::models::{GameEntity, GameStatus};

/// Mark `game` as the owner's current game.
///
/// Promotion also flips the status to `playing` and stamps the moment the
/// record last held the now-playing slot.
pub fn apply_promotion(game: &mut GameEntity, at: OffsetDateTime) {
    game.is_current = true;
    game.status = GameStatus::Playing;
    game.last_now_playing_at = Some(at);
    game.updated_at = at;
}

/// Clear the now-playing flag from a previously promoted record.
///
/// `last_now_playing_at` stays in place; it feeds the recency ordering and
/// the replacement selection after a delete.
pub fn apply_demotion(game: &mut GameEntity, at: OffsetDateTime) {
    game.is_current = false;
    game.updated_at = at;
}

/// Order records by recency of play: most recently promoted first, records
/// that never held the slot last, ties broken by highest id.
pub fn recency_order(a: &GameEntity, b: &GameEntity) -> Ordering {
    match (a.last_now_playing_at, b.last_now_playing_at) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| b.id.cmp(&a.id))
}

/// Shelf listing order: the current game first, then recency of play.
pub fn shelf_order(a: &GameEntity, b: &GameEntity) -> Ordering {
    b.is_current
        .cmp(&a.is_current)
        .then_with(|| recency_order(a, b))
}

/// Pick the record to promote once the current one has been deleted.
///
/// Returns the remaining record with the most recent `last_now_playing_at`
/// (never-played records last), tie-broken by highest id, or `None` when the
/// owner has no records left.
pub fn select_replacement(remaining: &[GameEntity]) -> Option<&GameEntity> {
    remaining.iter().min_by(|a, b| recency_order(a, b))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use uuid::Uuid;

    use super::*;

    fn game(id: i64, last_now_playing_at: Option<OffsetDateTime>) -> GameEntity {
        let created = datetime!(2026-01-01 00:00 UTC);
        GameEntity {
            id,
            owner_id: Uuid::nil(),
            title: format!("game {id}"),
            platform: "PC".into(),
            status: GameStatus::Backlog,
            cover_art_url: None,
            hours_played: 0.0,
            estimated_hours: 40.0,
            completion_percent: 0,
            is_current: false,
            last_now_playing_at,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn promotion_claims_the_slot_and_flips_status() {
        let at = datetime!(2026-02-01 12:00 UTC);
        let mut target = game(3, None);

        apply_promotion(&mut target, at);

        assert!(target.is_current);
        assert_eq!(target.status, GameStatus::Playing);
        assert_eq!(target.last_now_playing_at, Some(at));
        assert_eq!(target.updated_at, at);
    }

    #[test]
    fn demotion_keeps_the_play_history() {
        let promoted_at = datetime!(2026-02-01 12:00 UTC);
        let demoted_at = datetime!(2026-02-02 12:00 UTC);
        let mut target = game(3, None);
        apply_promotion(&mut target, promoted_at);

        apply_demotion(&mut target, demoted_at);

        assert!(!target.is_current);
        assert_eq!(target.last_now_playing_at, Some(promoted_at));
        assert_eq!(target.updated_at, demoted_at);
    }

    #[test]
    fn replacement_prefers_the_most_recently_played() {
        let remaining = vec![
            game(1, Some(datetime!(2026-03-01 10:00 UTC))),
            game(2, Some(datetime!(2026-03-05 10:00 UTC))),
            game(3, None),
        ];

        let picked = select_replacement(&remaining).expect("a replacement");
        assert_eq!(picked.id, 2);
    }

    #[test]
    fn never_played_records_sort_last() {
        let remaining = vec![game(9, None), game(1, Some(datetime!(2026-03-01 10:00 UTC)))];

        let picked = select_replacement(&remaining).expect("a replacement");
        assert_eq!(picked.id, 1);
    }

    #[test]
    fn recency_ties_break_on_highest_id() {
        let at = datetime!(2026-03-01 10:00 UTC);
        let remaining = vec![game(4, Some(at)), game(7, Some(at)), game(5, Some(at))];

        let picked = select_replacement(&remaining).expect("a replacement");
        assert_eq!(picked.id, 7);

        // With no play history at all the newest record wins.
        let unplayed = vec![game(1, None), game(2, None)];
        assert_eq!(select_replacement(&unplayed).expect("a replacement").id, 2);
    }

    #[test]
    fn empty_shelf_selects_nothing() {
        assert!(select_replacement(&[]).is_none());
    }

    #[test]
    fn shelf_order_puts_the_current_game_first() {
        let mut current = game(1, Some(datetime!(2026-03-01 10:00 UTC)));
        current.is_current = true;
        let recent = game(2, Some(datetime!(2026-03-08 10:00 UTC)));
        let untouched = game(3, None);

        let mut shelf = vec![untouched, recent, current];
        shelf.sort_by(shelf_order);

        let ids: Vec<i64> = shelf.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
