use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::api_error::ApiError;
use crate::models::match_model::add_stat;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub mobile_number: String,
    pub jersey_number: String,
    pub age: i32,
    pub height: f64,
    pub weight: f64,
    pub image: String,
    pub document: String,
    pub current_team: Option<Uuid>,
    pub total_points: i64,
    pub total_assists: i64,
    pub total_rebounds: i64,
    #[sqlx(json)]
    pub match_history: Vec<MatchHistoryEntry>,
    pub created_at: DateTime<Utc>,
}

/// A player's own record of one match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchHistoryEntry {
    pub match_id: Uuid,
    pub tournament_id: Uuid,
    pub team_id: Uuid,
    pub points_scored: i64,
    pub assists: i64,
    pub rebounds: i64,
    pub did_not_play: bool,
}

impl MatchHistoryEntry {
    pub fn unplayed(match_id: Uuid, tournament_id: Uuid, team_id: Uuid) -> Self {
        Self {
            match_id,
            tournament_id,
            team_id,
            points_scored: 0,
            assists: 0,
            rebounds: 0,
            did_not_play: true,
        }
    }
}

impl Player {
    pub fn history_for(&self, match_id: Uuid) -> Option<&MatchHistoryEntry> {
        self.match_history.iter().find(|h| h.match_id == match_id)
    }

    pub fn history_for_mut(&mut self, match_id: Uuid) -> Option<&mut MatchHistoryEntry> {
        self.match_history.iter_mut().find(|h| h.match_id == match_id)
    }

    /// Derives cumulative totals from the match history. Totals are left
    /// untouched when a sum does not fit.
    pub fn recompute_totals(&mut self) -> Result<(), ApiError> {
        let (points, assists, rebounds) =
            self.match_history
                .iter()
                .try_fold((0, 0, 0), |(p, a, r), h| -> Result<_, ApiError> {
                    Ok((
                        add_stat(p, h.points_scored)?,
                        add_stat(a, h.assists)?,
                        add_stat(r, h.rebounds)?,
                    ))
                })?;
        self.total_points = points;
        self.total_assists = assists;
        self.total_rebounds = rebounds;
        Ok(())
    }

    pub fn brief(&self) -> PlayerBrief {
        PlayerBrief {
            id: self.id,
            name: self.name.clone(),
            jersey_number: self.jersey_number.clone(),
            image: self.image.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerBrief {
    pub id: Uuid,
    pub name: String,
    pub jersey_number: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePlayerRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 3, max = 32))]
    pub mobile_number: String,
    pub current_team: Uuid,
    #[validate(length(min = 1, max = 8))]
    pub jersey_number: String,
    #[validate(range(min = 1, max = 120))]
    pub age: i32,
    #[validate(range(min = 0.0, max = 300.0))]
    pub height: f64,
    #[validate(range(min = 0.0, max = 500.0))]
    pub weight: f64,
    #[validate(length(min = 1))]
    pub image: String,
    #[validate(length(min = 1))]
    pub document: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePlayerRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 3, max = 32))]
    pub mobile_number: Option<String>,
    #[validate(length(min = 1, max = 8))]
    pub jersey_number: Option<String>,
    #[validate(range(min = 1, max = 120))]
    pub age: Option<i32>,
    #[validate(range(min = 0.0, max = 300.0))]
    pub height: Option<f64>,
    #[validate(range(min = 0.0, max = 500.0))]
    pub weight: Option<f64>,
    pub image: Option<String>,
    pub document: Option<String>,
}

impl UpdatePlayerRequest {
    /// Identity fields only; totals and history belong to the reconciler.
    pub fn apply_to(self, player: &mut Player) {
        if let Some(name) = self.name {
            player.name = name;
        }
        if let Some(mobile_number) = self.mobile_number {
            player.mobile_number = mobile_number;
        }
        if let Some(jersey_number) = self.jersey_number {
            player.jersey_number = jersey_number;
        }
        if let Some(age) = self.age {
            player.age = age;
        }
        if let Some(height) = self.height {
            player.height = height;
        }
        if let Some(weight) = self.weight {
            player.weight = weight;
        }
        if let Some(image) = self.image {
            player.image = image;
        }
        if let Some(document) = self.document {
            player.document = document;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerHistoryView {
    #[serde(flatten)]
    pub entry: MatchHistoryEntry,
    pub match_date: Option<NaiveDate>,
    pub team_1_name: Option<String>,
    pub team_2_name: Option<String>,
    pub tournament_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDetail {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub jersey_number: String,
    pub age: i32,
    pub height: f64,
    pub weight: f64,
    pub current_team: Option<Uuid>,
    pub total_points: i64,
    pub total_assists: i64,
    pub total_rebounds: i64,
    pub match_history: Vec<PlayerHistoryView>,
}
