//! Record model definitions shared across layers.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::library::progress;

/// Identifier assigned to a game record by the store on insertion.
pub type GameId = i64;

/// Shelf status of a tracked game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Owned but not started.
    #[default]
    Backlog,
    /// Actively being played.
    Playing,
    /// Finished.
    Completed,
}

impl GameStatus {
    /// Stable string form used by the relational backend.
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Backlog => "backlog",
            GameStatus::Playing => "playing",
            GameStatus::Completed => "completed",
        }
    }

    /// Parse the stored string form back into a status.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "backlog" => Some(GameStatus::Backlog),
            "playing" => Some(GameStatus::Playing),
            "completed" => Some(GameStatus::Completed),
            _ => None,
        }
    }
}

/// One tracked game on an owner's shelf, as persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameEntity {
    /// Primary key of the record.
    pub id: GameId,
    /// Identity of the owning user. Every query and mutation is scoped by
    /// this value.
    pub owner_id: Uuid,
    /// Display title of the game.
    pub title: String,
    /// Platform the game is played on.
    pub platform: String,
    /// Current shelf status.
    pub status: GameStatus,
    /// Optional cover art location.
    pub cover_art_url: Option<String>,
    /// Total hours played so far. Never negative.
    pub hours_played: f64,
    /// Expected playtime to completion, in hours. Strictly positive.
    pub estimated_hours: f64,
    /// Derived completion percentage in `[0, 100]`. Never set by a caller.
    pub completion_percent: u8,
    /// Whether this record holds the owner's single now-playing slot.
    pub is_current: bool,
    /// Last time this record held the now-playing slot.
    pub last_now_playing_at: Option<OffsetDateTime>,
    /// Creation timestamp.
    pub created_at: OffsetDateTime,
    /// Last time any mutation touched this record.
    pub updated_at: OffsetDateTime,
}

impl GameEntity {
    /// Refresh the derived completion percentage from the hour fields.
    pub fn recalc_completion(&mut self) {
        self.completion_percent =
            progress::completion_percent(self.hours_played, self.estimated_hours);
    }
}

/// Payload inserting a brand-new record; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewGameEntity {
    /// Identity of the owning user.
    pub owner_id: Uuid,
    /// Display title of the game.
    pub title: String,
    /// Platform the game is played on.
    pub platform: String,
    /// Initial shelf status.
    pub status: GameStatus,
    /// Optional cover art location.
    pub cover_art_url: Option<String>,
    /// Expected playtime to completion, in hours.
    pub estimated_hours: f64,
    /// Creation timestamp, also used as the initial `updated_at`.
    pub created_at: OffsetDateTime,
}

impl NewGameEntity {
    /// Materialize the full record under the id assigned by the store.
    ///
    /// New records start with zero hours, a derived completion percentage,
    /// and without the now-playing flag.
    pub fn into_entity(self, id: GameId) -> GameEntity {
        let completion_percent = progress::completion_percent(0.0, self.estimated_hours);
        GameEntity {
            id,
            owner_id: self.owner_id,
            title: self.title,
            platform: self.platform,
            status: self.status,
            cover_art_url: self.cover_art_url,
            hours_played: 0.0,
            estimated_hours: self.estimated_hours,
            completion_percent,
            is_current: false,
            last_now_playing_at: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Validated partial update applied to a single record.
///
/// Absent fields leave the record untouched. `is_current = Some(true)` asks
/// the backend to run the now-playing promotion in the same transactional
/// unit; `Some(false)` is ignored (there is no demote-only operation).
#[derive(Debug, Clone, Default)]
pub struct GameChanges {
    /// Replace the title.
    pub title: Option<String>,
    /// Replace the platform.
    pub platform: Option<String>,
    /// Replace the cover art location.
    pub cover_art_url: Option<String>,
    /// Replace the shelf status.
    pub status: Option<GameStatus>,
    /// Replace the total hours played.
    pub hours_played: Option<f64>,
    /// Add hours on top of the current total.
    pub add_hours: Option<f64>,
    /// Replace the completion estimate.
    pub estimated_hours: Option<f64>,
    /// Request promotion to the now-playing slot.
    pub is_current: Option<bool>,
}

/// Rejected field values in a [`GameChanges`] payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidChange {
    /// Absolute hours may not go below zero.
    #[error("hours_played cannot be negative")]
    NegativeHours,
    /// Increments may not go below zero.
    #[error("add_hours cannot be negative")]
    NegativeIncrement,
    /// Estimates must stay strictly positive.
    #[error("estimated_hours must be > 0")]
    NonPositiveEstimate,
}

impl GameChanges {
    /// Reject values that would break the hour invariants before anything is
    /// applied, so a failed update leaves no partial state behind.
    pub fn validate(&self) -> Result<(), InvalidChange> {
        if self.hours_played.is_some_and(|hours| hours < 0.0) {
            return Err(InvalidChange::NegativeHours);
        }
        if self.add_hours.is_some_and(|hours| hours < 0.0) {
            return Err(InvalidChange::NegativeIncrement);
        }
        if self.estimated_hours.is_some_and(|hours| hours <= 0.0) {
            return Err(InvalidChange::NonPositiveEstimate);
        }
        Ok(())
    }

    /// Apply the scalar fields to `game` and report whether promotion to the
    /// now-playing slot was requested.
    ///
    /// The absolute `hours_played` set lands before the `add_hours`
    /// increment. Promotion and the completion recalculation are left to the
    /// caller so they can run inside the backend's transactional unit.
    pub fn apply(&self, game: &mut GameEntity) -> bool {
        if let Some(title) = &self.title {
            game.title = title.clone();
        }
        if let Some(platform) = &self.platform {
            game.platform = platform.clone();
        }
        if let Some(cover_art_url) = &self.cover_art_url {
            game.cover_art_url = Some(cover_art_url.clone());
        }
        if let Some(status) = self.status {
            game.status = status;
        }
        if let Some(hours) = self.hours_played {
            game.hours_played = hours;
        }
        if let Some(added) = self.add_hours {
            game.hours_played += added;
        }
        if let Some(estimate) = self.estimated_hours {
            game.estimated_hours = estimate;
        }

        self.is_current == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn entity() -> GameEntity {
        NewGameEntity {
            owner_id: Uuid::nil(),
            title: "Outer Wilds".into(),
            platform: "PC".into(),
            status: GameStatus::Backlog,
            cover_art_url: None,
            estimated_hours: 20.0,
            created_at: datetime!(2026-01-01 00:00 UTC),
        }
        .into_entity(1)
    }

    #[test]
    fn new_records_start_unplayed_and_not_current() {
        let game = entity();
        assert_eq!(game.hours_played, 0.0);
        assert_eq!(game.completion_percent, 0);
        assert!(!game.is_current);
        assert!(game.last_now_playing_at.is_none());
        assert_eq!(game.created_at, game.updated_at);
    }

    #[test]
    fn validate_rejects_each_bad_hour_field() {
        let negative_set = GameChanges {
            hours_played: Some(-5.0),
            ..GameChanges::default()
        };
        assert_eq!(negative_set.validate(), Err(InvalidChange::NegativeHours));

        let negative_add = GameChanges {
            add_hours: Some(-0.5),
            ..GameChanges::default()
        };
        assert_eq!(
            negative_add.validate(),
            Err(InvalidChange::NegativeIncrement)
        );

        let zero_estimate = GameChanges {
            estimated_hours: Some(0.0),
            ..GameChanges::default()
        };
        assert_eq!(
            zero_estimate.validate(),
            Err(InvalidChange::NonPositiveEstimate)
        );

        assert!(GameChanges::default().validate().is_ok());
    }

    #[test]
    fn absolute_set_lands_before_the_increment() {
        let mut game = entity();
        let changes = GameChanges {
            hours_played: Some(4.0),
            add_hours: Some(6.0),
            ..GameChanges::default()
        };

        let promote = changes.apply(&mut game);

        assert!(!promote);
        assert_eq!(game.hours_played, 10.0);
    }

    #[test]
    fn absent_fields_leave_the_record_alone() {
        let mut game = entity();
        game.cover_art_url = Some("https://example.test/cover.png".into());
        let before = game.clone();

        let promote = GameChanges::default().apply(&mut game);

        assert!(!promote);
        assert_eq!(game, before);
    }

    #[test]
    fn explicit_false_does_not_request_promotion() {
        let mut game = entity();
        let changes = GameChanges {
            is_current: Some(false),
            ..GameChanges::default()
        };
        assert!(!changes.apply(&mut game));
        assert!(!game.is_current);
    }
}
