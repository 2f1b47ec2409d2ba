use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::{GameChanges, GameEntity, GameId, GameStatus},
    dto::{format_timestamp, validation},
};

fn default_estimated_hours() -> f64 {
    40.0
}

/// Payload creating a new record on the caller's shelf.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGameRequest {
    /// Display title of the game.
    pub title: String,
    /// Platform the game is played on.
    pub platform: String,
    /// Initial shelf status; defaults to `backlog`.
    #[serde(default)]
    pub status: GameStatus,
    /// Optional cover art location.
    #[serde(default)]
    pub cover_art_url: Option<String>,
    /// Expected playtime to completion in hours; defaults to 40.
    #[serde(default = "default_estimated_hours")]
    pub estimated_hours: f64,
}

impl Validate for CreateGameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.title.trim().is_empty() {
            errors.add("title", validation::empty_field("title"));
        }
        if self.platform.trim().is_empty() {
            errors.add("platform", validation::empty_field("platform"));
        }
        if let Err(e) = validation::validate_estimated_hours(self.estimated_hours) {
            errors.add("estimated_hours", e);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Partial update applied to one record; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateGameRequest {
    /// Replace the total hours played.
    #[serde(default)]
    pub hours_played: Option<f64>,
    /// Add hours on top of the current total.
    #[serde(default)]
    pub add_hours: Option<f64>,
    /// Replace the completion estimate.
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    /// `true` promotes the record to the single now-playing slot; `false`
    /// is ignored.
    #[serde(default)]
    pub is_current: Option<bool>,
    /// Replace the shelf status.
    #[serde(default)]
    pub status: Option<GameStatus>,
    /// Replace the title.
    #[serde(default)]
    pub title: Option<String>,
    /// Replace the platform.
    #[serde(default)]
    pub platform: Option<String>,
    /// Replace the cover art location.
    #[serde(default)]
    pub cover_art_url: Option<String>,
}

impl Validate for UpdateGameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(hours) = self.hours_played {
            if let Err(e) = validation::validate_hours(hours) {
                errors.add("hours_played", e);
            }
        }
        if let Some(hours) = self.add_hours {
            if let Err(e) = validation::validate_hours(hours) {
                errors.add("add_hours", e);
            }
        }
        if let Some(estimate) = self.estimated_hours {
            if let Err(e) = validation::validate_estimated_hours(estimate) {
                errors.add("estimated_hours", e);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl From<UpdateGameRequest> for GameChanges {
    fn from(request: UpdateGameRequest) -> Self {
        Self {
            title: request.title,
            platform: request.platform,
            cover_art_url: request.cover_art_url,
            status: request.status,
            hours_played: request.hours_played,
            add_hours: request.add_hours,
            estimated_hours: request.estimated_hours,
            is_current: request.is_current,
        }
    }
}

/// Full projection of a game record returned to its owner.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameResponse {
    /// Record identifier.
    pub id: GameId,
    /// Display title of the game.
    pub title: String,
    /// Platform the game is played on.
    pub platform: String,
    /// Current shelf status.
    pub status: GameStatus,
    /// Optional cover art location.
    pub cover_art_url: Option<String>,
    /// Total hours played so far.
    pub hours_played: f64,
    /// Expected playtime to completion in hours.
    pub estimated_hours: f64,
    /// Derived completion percentage in `[0, 100]`.
    pub completion_percent: u8,
    /// Whether this record holds the now-playing slot.
    pub is_current: bool,
    /// Last time this record held the now-playing slot, RFC 3339.
    pub last_now_playing_at: Option<String>,
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
    /// Last mutation timestamp, RFC 3339.
    pub updated_at: String,
}

impl From<GameEntity> for GameResponse {
    fn from(entity: GameEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            platform: entity.platform,
            status: entity.status,
            cover_art_url: entity.cover_art_url,
            hours_played: entity.hours_played,
            estimated_hours: entity.estimated_hours,
            completion_percent: entity.completion_percent,
            is_current: entity.is_current,
            last_now_playing_at: entity.last_now_playing_at.map(format_timestamp),
            created_at: format_timestamp(entity.created_at),
            updated_at: format_timestamp(entity.updated_at),
        }
    }
}

/// Acknowledgement returned after a record has been removed.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteGameResponse {
    /// Identifier of the record that was removed.
    pub deleted: GameId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_rejects_blank_metadata_and_bad_estimate() {
        let request = CreateGameRequest {
            title: "  ".into(),
            platform: "PC".into(),
            status: GameStatus::Backlog,
            cover_art_url: None,
            estimated_hours: 0.0,
        };

        let errors = request.validate().unwrap_err();
        assert!(errors.errors().contains_key("title"));
        assert!(errors.errors().contains_key("estimated_hours"));
        assert!(!errors.errors().contains_key("platform"));
    }

    #[test]
    fn update_request_accepts_an_empty_patch() {
        assert!(UpdateGameRequest::default().validate().is_ok());
    }

    #[test]
    fn update_request_rejects_negative_hours() {
        let request = UpdateGameRequest {
            hours_played: Some(-5.0),
            ..UpdateGameRequest::default()
        };
        assert!(request.validate().is_err());

        let request = UpdateGameRequest {
            add_hours: Some(-1.0),
            ..UpdateGameRequest::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn status_travels_as_a_lowercase_string() {
        let value = serde_json::to_value(GameStatus::Playing).expect("serialize");
        assert_eq!(value, serde_json::json!("playing"));

        let patch: UpdateGameRequest =
            serde_json::from_value(serde_json::json!({"status": "completed"})).expect("parse");
        assert_eq!(patch.status, Some(GameStatus::Completed));

        // Unknown statuses are rejected at the boundary.
        assert!(serde_json::from_value::<UpdateGameRequest>(serde_json::json!({"status": "paused"}))
            .is_err());
    }
}
