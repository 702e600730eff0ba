use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::api_error::ApiError;
use crate::models::match_model::MatchBrief;
use crate::models::team::TeamWithPlayers;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Tournament {
    pub id: Uuid,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registering_start_date: DateTime<Utc>,
    pub location: String,
    #[sqlx(json)]
    pub organizer: Organizer,
    #[sqlx(json)]
    pub prize_pool: PrizePool,
    pub poster_image: String,
    /// Registered teams, kept free of duplicates.
    pub teams: Vec<Uuid>,
    pub matches: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct Organizer {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 32))]
    pub phone_number: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct PrizePool {
    #[validate(length(min = 1))]
    pub first_prize: String,
    #[validate(length(min = 1))]
    pub second_prize: String,
    #[validate(length(min = 1))]
    pub third_prize: String,
    #[validate(length(min = 1))]
    pub entry_fee: String,
    #[validate(length(min = 1))]
    pub mvp: String,
}

impl Tournament {
    pub fn is_registered(&self, team_id: Uuid) -> bool {
        self.teams.contains(&team_id)
    }

    /// Registers a team once; returns false when it was already registered.
    pub fn register_team(&mut self, team_id: Uuid) -> bool {
        if self.is_registered(team_id) {
            return false;
        }
        self.teams.push(team_id);
        true
    }

    pub fn validate_schedule(&self) -> Result<(), ApiError> {
        check_schedule(self.registering_start_date, self.start_date, self.end_date)
    }
}

/// `registering_start_date < start_date < end_date`
pub fn check_schedule(
    registering_start_date: DateTime<Utc>,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> Result<(), ApiError> {
    if start_date >= end_date {
        return Err(ApiError::validation("Start date must be before end date"));
    }
    if registering_start_date >= start_date {
        return Err(ApiError::validation(
            "Registering start date must be before tournament start date",
        ));
    }
    Ok(())
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTournamentRequest {
    #[validate(length(min = 1, max = 255), custom(function = "non_blank"))]
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registering_start_date: DateTime<Utc>,
    #[validate(length(min = 1, max = 255))]
    pub location: String,
    #[validate(nested)]
    pub organizer: Organizer,
    #[validate(nested)]
    pub prize_pool: PrizePool,
    #[validate(length(min = 1))]
    pub poster_image: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateOrganizerRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub phone_number: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePrizePoolRequest {
    pub first_prize: Option<String>,
    pub second_prize: Option<String>,
    pub third_prize: Option<String>,
    pub entry_fee: Option<String>,
    pub mvp: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTournamentRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub registering_start_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 255))]
    pub location: Option<String>,
    #[validate(nested)]
    pub organizer: Option<UpdateOrganizerRequest>,
    pub prize_pool: Option<UpdatePrizePoolRequest>,
    pub poster_image: Option<String>,
}

impl UpdateTournamentRequest {
    /// Merges the provided fields into `tournament`, nested objects field by field.
    pub fn apply_to(self, tournament: &mut Tournament) {
        if let Some(name) = self.name {
            tournament.name = name;
        }
        if let Some(start_date) = self.start_date {
            tournament.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            tournament.end_date = end_date;
        }
        if let Some(registering_start_date) = self.registering_start_date {
            tournament.registering_start_date = registering_start_date;
        }
        if let Some(location) = self.location {
            tournament.location = location;
        }
        if let Some(poster_image) = self.poster_image {
            tournament.poster_image = poster_image;
        }
        if let Some(organizer) = self.organizer {
            if let Some(name) = organizer.name {
                tournament.organizer.name = name;
            }
            if let Some(phone_number) = organizer.phone_number {
                tournament.organizer.phone_number = phone_number;
            }
            if let Some(image) = organizer.image {
                tournament.organizer.image = Some(image);
            }
        }
        if let Some(prize_pool) = self.prize_pool {
            let pool = &mut tournament.prize_pool;
            for (target, value) in [
                (&mut pool.first_prize, prize_pool.first_prize),
                (&mut pool.second_prize, prize_pool.second_prize),
                (&mut pool.third_prize, prize_pool.third_prize),
                (&mut pool.entry_fee, prize_pool.entry_fee),
                (&mut pool.mvp, prize_pool.mvp),
            ] {
                if let Some(value) = value.filter(|v| !v.is_empty()) {
                    *target = value;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssignTeamRequest {
    pub team_id: Uuid,
    pub tournament_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignTeamResponse {
    pub message: String,
    pub tournament: Tournament,
}

/// Landing-page view: every list is ordered by start date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentOverview {
    pub latest_tournament: Option<Tournament>,
    pub upcoming_tournaments: Vec<Tournament>,
    pub all_tournaments: Vec<Tournament>,
}

impl TournamentOverview {
    pub fn build(mut tournaments: Vec<Tournament>, now: DateTime<Utc>) -> Self {
        tournaments.sort_by_key(|t| t.start_date);

        let upcoming_tournaments: Vec<Tournament> = tournaments
            .iter()
            .filter(|t| t.start_date >= now)
            .cloned()
            .collect();

        Self {
            latest_tournament: upcoming_tournaments.first().cloned(),
            upcoming_tournaments,
            all_tournaments: tournaments,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentDetail {
    #[serde(flatten)]
    pub tournament: Tournament,
    pub team_details: Vec<TeamWithPlayers>,
    pub match_details: Vec<MatchBrief>,
}
