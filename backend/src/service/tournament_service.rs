use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::api_error::ApiError;
use crate::models::*;
use crate::service::match_service::brief_matches;
use crate::service::team_service::teams_with_players;
use crate::store::SharedStore;

#[derive(Clone)]
pub struct TournamentService {
    store: SharedStore,
}

impl TournamentService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn overview(&self) -> Result<TournamentOverview, ApiError> {
        let tournaments = self.store.list_tournaments().await?;
        Ok(TournamentOverview::build(tournaments, Utc::now()))
    }

    pub async fn list(&self) -> Result<Vec<Tournament>, ApiError> {
        self.store.list_tournaments().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Tournament, ApiError> {
        self.store
            .get_tournament(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Tournament not found"))
    }

    /// Tournament with registered teams and scheduled matches expanded.
    pub async fn get_detail(&self, id: Uuid) -> Result<TournamentDetail, ApiError> {
        let tournament = self.get(id).await?;

        let teams = self.store.get_teams(&tournament.teams).await?;
        let matches = self.store.get_matches(&tournament.matches).await?;

        let teams = order_like(teams, &tournament.teams, |t| t.id);
        let matches = order_like(matches, &tournament.matches, |m| m.id);

        let team_details = teams_with_players(&self.store, &teams).await?;
        let match_details = brief_matches(&self.store, &matches).await?;

        Ok(TournamentDetail {
            tournament,
            team_details,
            match_details,
        })
    }

    pub async fn create(&self, request: CreateTournamentRequest) -> Result<Tournament, ApiError> {
        request.validate()?;
        check_schedule(
            request.registering_start_date,
            request.start_date,
            request.end_date,
        )?;

        let tournament = Tournament {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            start_date: request.start_date,
            end_date: request.end_date,
            registering_start_date: request.registering_start_date,
            location: request.location,
            organizer: request.organizer,
            prize_pool: request.prize_pool,
            poster_image: request.poster_image,
            teams: vec![],
            matches: vec![],
            created_at: Utc::now(),
        };

        let mut tx = self.store.begin().await?;
        tx.put_tournament(&tournament).await?;
        tx.commit().await?;

        info!(tournament_id = %tournament.id, name = %tournament.name, "Tournament created");
        Ok(tournament)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateTournamentRequest,
    ) -> Result<Tournament, ApiError> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let mut tournament = tx
            .lock_tournament(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Tournament not found"))?;

        request.apply_to(&mut tournament);
        tournament.validate_schedule()?;

        tx.put_tournament(&tournament).await?;
        tx.commit().await?;

        info!(tournament_id = %id, "Tournament updated");
        Ok(tournament)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.store.delete_tournament(id).await? {
            return Err(ApiError::not_found("Tournament not found"));
        }
        info!(tournament_id = %id, "Tournament deleted");
        Ok(())
    }

    /// Registers a team; registering it again changes nothing.
    pub async fn assign_team(&self, request: AssignTeamRequest) -> Result<Tournament, ApiError> {
        let mut tx = self.store.begin().await?;

        let mut tournament = tx
            .lock_tournament(request.tournament_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Tournament not found"))?;
        if tx.lock_team(request.team_id).await?.is_none() {
            return Err(ApiError::not_found("Team not found"));
        }

        if tournament.register_team(request.team_id) {
            tx.put_tournament(&tournament).await?;
            tx.commit().await?;
            info!(
                tournament_id = %tournament.id,
                team_id = %request.team_id,
                "Team assigned to tournament"
            );
        }

        Ok(tournament)
    }
}

/// Reorders `records` to follow `ids`, dropping ids with no record.
pub(crate) fn order_like<T, F>(records: Vec<T>, ids: &[Uuid], id_of: F) -> Vec<T>
where
    F: Fn(&T) -> Uuid,
{
    let mut by_id: std::collections::HashMap<Uuid, T> =
        records.into_iter().map(|r| (id_of(&r), r)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::*;
    use chrono::Duration;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_create_rejects_inverted_schedule() {
        let league = League::new();
        let mut request = tournament_request("Spring Open");
        request.end_date = request.start_date - Duration::hours(1);

        let err = league.tournaments.create(request).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_update_checks_merged_schedule() {
        let league = League::new();
        let tournament = league.tournament("Spring Open").await;

        let update = UpdateTournamentRequest {
            registering_start_date: Some(tournament.start_date + Duration::days(1)),
            ..Default::default()
        };
        assert_err!(league.tournaments.update(tournament.id, update).await);

        let update = UpdateTournamentRequest {
            location: Some("Harbor Hall".to_string()),
            ..Default::default()
        };
        let updated = assert_ok!(league.tournaments.update(tournament.id, update).await);
        assert_eq!(updated.location, "Harbor Hall");
        assert_eq!(updated.name, tournament.name);
    }

    #[tokio::test]
    async fn test_assign_team_is_idempotent() {
        let league = League::new();
        let tournament = league.tournament("Spring Open").await;
        let team = league.team("Falcons").await;

        let request = AssignTeamRequest {
            team_id: team.id,
            tournament_id: tournament.id,
        };
        assert_ok!(league.tournaments.assign_team(request.clone()).await);
        let again = assert_ok!(league.tournaments.assign_team(request).await);

        assert_eq!(again.teams, vec![team.id]);
    }

    #[tokio::test]
    async fn test_assign_unknown_team_is_not_found() {
        let league = League::new();
        let tournament = league.tournament("Spring Open").await;

        let err = league
            .tournaments
            .assign_team(AssignTeamRequest {
                team_id: Uuid::new_v4(),
                tournament_id: tournament.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Team not found"));
    }

    #[tokio::test]
    async fn test_detail_expands_teams_and_matches() {
        let league = League::new();
        let fixture = league.fixture().await;

        let detail = assert_ok!(league.tournaments.get_detail(fixture.tournament.id).await);

        assert_eq!(detail.team_details.len(), 2);
        assert_eq!(detail.team_details[0].players.len(), 2);
        assert_eq!(detail.match_details.len(), 1);
        assert_eq!(detail.match_details[0].team_1_name.as_deref(), Some("Falcons"));
    }

    #[tokio::test]
    async fn test_delete_missing_tournament() {
        let league = League::new();
        let err = league.tournaments.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
