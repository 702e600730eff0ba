use chrono::Utc;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::api_error::ApiError;
use crate::models::*;
use crate::service::tournament_service::order_like;
use crate::store::SharedStore;

#[derive(Clone)]
pub struct TeamService {
    store: SharedStore,
}

impl TeamService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Team>, ApiError> {
        self.store.list_teams().await
    }

    /// Team with its roster expanded, in roster order.
    pub async fn get_detail(&self, id: Uuid) -> Result<TeamResponse, ApiError> {
        let team = self
            .store
            .get_team(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Team not found"))?;

        let players = self.store.get_players(&team.players).await?;
        let roster = order_like(players, &team.players, |p| p.id);

        Ok(TeamResponse { team, roster })
    }

    pub async fn create(&self, request: CreateTeamRequest) -> Result<Team, ApiError> {
        request.validate()?;

        let team = Team {
            id: Uuid::new_v4(),
            details: TeamDetails {
                name: request.name,
                origin: request.origin,
                logo: request.logo,
                primary_number: request.primary_number,
            },
            coach: request.coach,
            players: vec![],
            created_at: Utc::now(),
        };

        let mut tx = self.store.begin().await?;
        tx.put_team(&team).await?;
        tx.commit().await?;

        info!(team_id = %team.id, name = %team.details.name, "Team created");
        Ok(team)
    }

    pub async fn update(&self, id: Uuid, request: UpdateTeamRequest) -> Result<Team, ApiError> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let mut team = tx
            .lock_team(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Team not found"))?;

        request.apply_to(&mut team);

        tx.put_team(&team).await?;
        tx.commit().await?;

        info!(team_id = %id, "Team updated");
        Ok(team)
    }

    pub async fn set_coach(&self, id: Uuid, coach: Coach) -> Result<Team, ApiError> {
        coach.validate()?;

        let mut tx = self.store.begin().await?;
        let mut team = tx
            .lock_team(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Team not found"))?;

        team.coach = Some(coach);

        tx.put_team(&team).await?;
        tx.commit().await?;

        info!(team_id = %id, "Coach assigned to team");
        Ok(team)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.store.delete_team(id).await? {
            return Err(ApiError::not_found("Team not found"));
        }
        info!(team_id = %id, "Team deleted");
        Ok(())
    }

    /// Names for the given ids, in request order; unknown ids are skipped.
    pub async fn team_names(&self, request: TeamNamesRequest) -> Result<Vec<TeamName>, ApiError> {
        request.validate()?;

        let teams = self.store.get_teams(&request.team_ids).await?;
        let by_id: HashMap<Uuid, &Team> = teams.iter().map(|t| (t.id, t)).collect();

        Ok(request
            .team_ids
            .iter()
            .filter_map(|id| by_id.get(id).map(|team| TeamName::from(*team)))
            .collect())
    }
}

/// Expands each team's roster into player briefs with one store round trip.
pub(crate) async fn teams_with_players(
    store: &SharedStore,
    teams: &[Team],
) -> Result<Vec<TeamWithPlayers>, ApiError> {
    let player_ids: Vec<Uuid> = teams.iter().flat_map(|t| t.players.iter().copied()).collect();
    let players: HashMap<Uuid, Player> = store
        .get_players(&player_ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    Ok(teams
        .iter()
        .map(|team| with_players(team, &players))
        .collect())
}

pub(crate) fn with_players(team: &Team, players: &HashMap<Uuid, Player>) -> TeamWithPlayers {
    TeamWithPlayers {
        id: team.id,
        details: team.details.clone(),
        coach: team.coach.clone(),
        players: team
            .players
            .iter()
            .filter_map(|id| players.get(id).map(Player::brief))
            .collect(),
    }
}
