use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::player::{Player, PlayerBrief};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Team {
    pub id: Uuid,
    #[sqlx(json)]
    pub details: TeamDetails,
    #[sqlx(json)]
    pub coach: Option<Coach>,
    /// Roster in insertion order.
    pub players: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamDetails {
    pub name: String,
    pub origin: String,
    pub logo: String,
    pub primary_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct Coach {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 32))]
    pub phone_number: String,
    #[validate(length(max = 32))]
    pub contact_number_2: Option<String>,
    pub image: Option<String>,
}

impl Team {
    pub fn name(&self) -> &str {
        &self.details.name
    }

    pub fn add_player(&mut self, player_id: Uuid) {
        if !self.players.contains(&player_id) {
            self.players.push(player_id);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTeamRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub origin: String,
    #[validate(length(min = 1))]
    pub logo: String,
    pub primary_number: Option<String>,
    #[validate(nested)]
    pub coach: Option<Coach>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTeamRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub origin: Option<String>,
    pub logo: Option<String>,
    pub primary_number: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub coach_name: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub coach_phone_number: Option<String>,
    pub coach_image: Option<String>,
}

impl UpdateTeamRequest {
    pub fn apply_to(self, team: &mut Team) {
        if let Some(name) = self.name {
            team.details.name = name;
        }
        if let Some(origin) = self.origin {
            team.details.origin = origin;
        }
        if let Some(logo) = self.logo {
            team.details.logo = logo;
        }
        if let Some(primary_number) = self.primary_number {
            team.details.primary_number = Some(primary_number);
        }

        // Coach name and phone are only replaced together
        if let (Some(name), Some(phone_number)) = (self.coach_name, self.coach_phone_number) {
            match team.coach.as_mut() {
                Some(coach) => {
                    coach.name = name;
                    coach.phone_number = phone_number;
                }
                None => {
                    team.coach = Some(Coach {
                        name,
                        phone_number,
                        contact_number_2: None,
                        image: None,
                    });
                }
            }
        }
        if let (Some(coach), Some(image)) = (&mut team.coach, self.coach_image) {
            coach.image = Some(image);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TeamNamesRequest {
    #[validate(length(max = 500))]
    pub team_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamName {
    pub team_id: Uuid,
    pub team_name: String,
    pub coach_name: String,
}

impl From<&Team> for TeamName {
    fn from(team: &Team) -> Self {
        Self {
            team_id: team.id,
            team_name: team.name().to_string(),
            coach_name: team
                .coach
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "No coach assigned".to_string()),
        }
    }
}

/// Team with its roster expanded to full player records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamResponse {
    #[serde(flatten)]
    pub team: Team,
    pub roster: Vec<Player>,
}

/// Team with its roster expanded to player briefs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamWithPlayers {
    pub id: Uuid,
    pub details: TeamDetails,
    pub coach: Option<Coach>,
    pub players: Vec<PlayerBrief>,
}
