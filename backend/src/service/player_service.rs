use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::api_error::ApiError;
use crate::models::*;
use crate::store::SharedStore;

#[derive(Clone)]
pub struct PlayerService {
    store: SharedStore,
}

impl PlayerService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Player>, ApiError> {
        self.store.list_players().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Player, ApiError> {
        self.store
            .get_player(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Player not found"))
    }

    /// Profile with each history entry expanded to match date, team names
    /// and tournament name.
    pub async fn get_detail(&self, id: Uuid) -> Result<PlayerDetail, ApiError> {
        let player = self.get(id).await?;

        let match_ids: Vec<Uuid> = player.match_history.iter().map(|h| h.match_id).collect();
        let matches: HashMap<Uuid, Match> = self
            .store
            .get_matches(&match_ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let mut team_ids: HashSet<Uuid> = HashSet::new();
        let mut tournament_ids: HashSet<Uuid> = HashSet::new();
        for game in matches.values() {
            team_ids.insert(game.team_1);
            team_ids.insert(game.team_2);
            tournament_ids.insert(game.tournament_id);
        }

        let team_ids: Vec<Uuid> = team_ids.into_iter().collect();
        let team_names: HashMap<Uuid, String> = self
            .store
            .get_teams(&team_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t.details.name))
            .collect();

        let tournament_ids: Vec<Uuid> = tournament_ids.into_iter().collect();
        let tournament_names: HashMap<Uuid, String> = self
            .store
            .get_tournaments(&tournament_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();

        let match_history = player
            .match_history
            .iter()
            .map(|entry| {
                let game = matches.get(&entry.match_id);
                PlayerHistoryView {
                    entry: entry.clone(),
                    match_date: game.map(|g| g.date),
                    team_1_name: game.and_then(|g| team_names.get(&g.team_1).cloned()),
                    team_2_name: game.and_then(|g| team_names.get(&g.team_2).cloned()),
                    tournament_name: game
                        .and_then(|g| tournament_names.get(&g.tournament_id).cloned()),
                }
            })
            .collect();

        Ok(PlayerDetail {
            id: player.id,
            name: player.name,
            image: player.image,
            jersey_number: player.jersey_number,
            age: player.age,
            height: player.height,
            weight: player.weight,
            current_team: player.current_team,
            total_points: player.total_points,
            total_assists: player.total_assists,
            total_rebounds: player.total_rebounds,
            match_history,
        })
    }

    /// Creates a player and appends it to its team's roster in one unit of work.
    pub async fn create(&self, request: CreatePlayerRequest) -> Result<Player, ApiError> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let mut team = tx
            .lock_team(request.current_team)
            .await?
            .ok_or_else(|| ApiError::not_found("Team not found"))?;

        let player = Player {
            id: Uuid::new_v4(),
            name: request.name,
            mobile_number: request.mobile_number,
            jersey_number: request.jersey_number,
            age: request.age,
            height: request.height,
            weight: request.weight,
            image: request.image,
            document: request.document,
            current_team: Some(team.id),
            total_points: 0,
            total_assists: 0,
            total_rebounds: 0,
            match_history: vec![],
            created_at: Utc::now(),
        };
        team.add_player(player.id);

        tx.put_player(&player).await?;
        tx.put_team(&team).await?;
        tx.commit().await?;

        info!(player_id = %player.id, team_id = %team.id, "Player added to team");
        Ok(player)
    }

    pub async fn update(&self, id: Uuid, request: UpdatePlayerRequest) -> Result<Player, ApiError> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let mut player = tx
            .lock_players(&[id])
            .await?
            .pop()
            .ok_or_else(|| ApiError::not_found("Player not found"))?;

        request.apply_to(&mut player);

        tx.put_player(&player).await?;
        tx.commit().await?;

        info!(player_id = %id, "Player updated");
        Ok(player)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.store.delete_player(id).await? {
            return Err(ApiError::not_found("Player not found"));
        }
        info!(player_id = %id, "Player deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_create_requires_existing_team() {
        let league = League::new();
        let request = player_request(Uuid::new_v4(), "Alex");

        let err = league.players.create(request).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Team not found"));
        assert!(assert_ok!(league.players.list().await).is_empty());
    }

    #[tokio::test]
    async fn test_update_leaves_stats_alone() {
        let league = League::new();
        let fixture = league.fixture().await;
        let alex = fixture.team_1_players[0].id;

        league
            .reconcile(fixture.game.id, vec![delta(alex, 10, 2, 3)], vec![])
            .await;

        let updated = assert_ok!(
            league
                .players
                .update(
                    alex,
                    UpdatePlayerRequest {
                        jersey_number: Some("99".to_string()),
                        ..Default::default()
                    },
                )
                .await
        );

        assert_eq!(updated.jersey_number, "99");
        assert_eq!(updated.total_points, 10);
        assert_eq!(updated.match_history.len(), 1);
    }

    #[tokio::test]
    async fn test_detail_expands_history() {
        let league = League::new();
        let fixture = league.fixture().await;
        let alex = fixture.team_1_players[0].id;

        let detail = assert_ok!(league.players.get_detail(alex).await);

        assert_eq!(detail.match_history.len(), 1);
        let entry = &detail.match_history[0];
        assert_eq!(entry.entry.match_id, fixture.game.id);
        assert_eq!(entry.match_date, Some(fixture.game.date));
        assert_eq!(entry.team_1_name.as_deref(), Some("Falcons"));
        assert_eq!(entry.team_2_name.as_deref(), Some("Herons"));
        assert_eq!(entry.tournament_name.as_deref(), Some("Spring Open"));
    }

    #[tokio::test]
    async fn test_delete_missing_player() {
        let league = League::new();
        let err = league.players.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
