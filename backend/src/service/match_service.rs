use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::api_error::ApiError;
use crate::models::*;
use crate::service::team_service::with_players;
use crate::service::StatReconciler;
use crate::store::{lock_order, SharedStore};

#[derive(Clone)]
pub struct MatchService {
    store: SharedStore,
    reconciler: StatReconciler,
}

impl MatchService {
    pub fn new(store: SharedStore) -> Self {
        Self {
            reconciler: StatReconciler::new(store.clone()),
            store,
        }
    }

    pub async fn list(&self) -> Result<Vec<MatchSummary>, ApiError> {
        let matches = self.store.list_matches().await?;

        let team_ids: Vec<Uuid> = unique(matches.iter().flat_map(|m| [m.team_1, m.team_2]));
        let teams: HashMap<Uuid, Team> = self
            .store
            .get_teams(&team_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let tournament_ids: Vec<Uuid> = unique(matches.iter().map(|m| m.tournament_id));
        let tournament_names: HashMap<Uuid, String> = self
            .store
            .get_tournaments(&tournament_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();

        let player_ids: Vec<Uuid> = unique(teams.values().flat_map(|t| t.players.iter().copied()));
        let players: HashMap<Uuid, Player> = self
            .store
            .get_players(&player_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let roster = |team_id: Uuid| -> Vec<PlayerBrief> {
            teams
                .get(&team_id)
                .map(|team| with_players(team, &players).players)
                .unwrap_or_default()
        };

        Ok(matches
            .into_iter()
            .map(|game| MatchSummary {
                match_id: game.id,
                date: game.date,
                team_1_id: game.team_1,
                team_2_id: game.team_2,
                team_1_name: teams.get(&game.team_1).map(|t| t.details.name.clone()),
                team_2_name: teams.get(&game.team_2).map(|t| t.details.name.clone()),
                tournament_name: tournament_names.get(&game.tournament_id).cloned(),
                team_1_players: roster(game.team_1),
                team_2_players: roster(game.team_2),
                player_stats: game.player_stats,
            })
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Match, ApiError> {
        self.store
            .get_match(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Match not found"))
    }

    pub async fn get_detail(&self, id: Uuid) -> Result<MatchDetail, ApiError> {
        let game = self.get(id).await?;

        let teams: HashMap<Uuid, Team> = self
            .store
            .get_teams(&[game.team_1, game.team_2])
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let player_ids: Vec<Uuid> = unique(
            teams
                .values()
                .flat_map(|t| t.players.iter().copied())
                .chain(game.player_stats.iter().map(|s| s.player_id)),
        );
        let players: HashMap<Uuid, Player> = self
            .store
            .get_players(&player_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let tournament = self
            .store
            .get_tournament(game.tournament_id)
            .await?
            .map(|t| MatchTournamentInfo {
                id: t.id,
                name: t.name,
                location: t.location,
                start_date: t.start_date,
                end_date: t.end_date,
            });

        Ok(MatchDetail {
            team_1_details: teams.get(&game.team_1).map(|t| with_players(t, &players)),
            team_2_details: teams.get(&game.team_2).map(|t| with_players(t, &players)),
            tournament,
            player_stats_expanded: expand_stats(&game.player_stats, &players),
            match_data: game,
        })
    }

    /// Schedules a match between two registered teams. Every roster player
    /// starts with a zero stat row and a zero history entry, both marked
    /// did-not-play.
    pub async fn create(&self, request: CreateMatchRequest) -> Result<Match, ApiError> {
        request.validate()?;
        if request.team_1 == request.team_2 {
            return Err(ApiError::validation("A match needs two different teams"));
        }

        let mut tx = self.store.begin().await?;

        let mut tournament = tx
            .lock_tournament(request.tournament_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Tournament not found"))?;

        if !tournament.is_registered(request.team_1) || !tournament.is_registered(request.team_2) {
            return Err(ApiError::bad_request(
                "Both teams must be registered in the tournament",
            ));
        }

        let mut locked: HashMap<Uuid, Team> = HashMap::new();
        for team_id in lock_order(&[request.team_1, request.team_2]) {
            let team = tx
                .lock_team(team_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Team not found"))?;
            locked.insert(team_id, team);
        }
        let (Some(team_1), Some(team_2)) =
            (locked.remove(&request.team_1), locked.remove(&request.team_2))
        else {
            return Err(ApiError::not_found("Team not found"));
        };

        let mut game = Match {
            id: Uuid::new_v4(),
            tournament_id: tournament.id,
            team_1: team_1.id,
            team_2: team_2.id,
            date: request.date,
            time: request.time,
            location: request.location,
            team_1_score: 0,
            team_2_score: 0,
            winner: None,
            mvp: None,
            player_stats: vec![],
            created_at: Utc::now(),
        };

        let roster_ids: Vec<Uuid> = team_1
            .players
            .iter()
            .chain(team_2.players.iter())
            .copied()
            .collect();
        let mut players: HashMap<Uuid, Player> = tx
            .lock_players(&roster_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        for team in [&team_1, &team_2] {
            for player_id in &team.players {
                let Some(player) = players.get_mut(player_id) else {
                    continue;
                };
                if game.stat_for(*player_id).is_some() {
                    continue;
                }
                game.player_stats.push(PlayerStat::unplayed(*player_id, team.id));
                player.match_history.push(MatchHistoryEntry::unplayed(
                    game.id,
                    tournament.id,
                    team.id,
                ));
            }
        }

        let mut seeded: Vec<&Player> = players.values().collect();
        seeded.sort_by_key(|p| p.id);
        for player in seeded {
            tx.put_player(player).await?;
        }
        tx.put_match(&game).await?;

        tournament.matches.push(game.id);
        tx.put_tournament(&tournament).await?;
        tx.commit().await?;

        info!(
            match_id = %game.id,
            tournament_id = %tournament.id,
            team_1 = %game.team_1,
            team_2 = %game.team_2,
            seeded_players = game.player_stats.len(),
            "Match created and added to tournament"
        );

        Ok(game)
    }

    pub async fn update_stats(
        &self,
        id: Uuid,
        request: UpdateMatchStatsRequest,
    ) -> Result<UpdateMatchStatsResponse, ApiError> {
        let outcome = self.reconciler.reconcile(id, request).await?;

        let message = if outcome.applied {
            "Stats updated successfully"
        } else {
            "Stats already applied"
        };

        Ok(UpdateMatchStatsResponse {
            message: message.to_string(),
            applied: outcome.applied,
            match_data: outcome.game,
        })
    }

    pub async fn update_details(
        &self,
        id: Uuid,
        request: UpdateMatchDetailsRequest,
    ) -> Result<Match, ApiError> {
        request.validate()?;

        let mut tx = self.store.begin().await?;
        let mut game = tx
            .lock_match(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Match not found"))?;

        if let Some(mvp) = request.mvp {
            if game.stat_for(mvp).is_none() {
                return Err(ApiError::bad_request("MVP must have played in the match"));
            }
            game.mvp = Some(mvp);
        }
        if let Some(date) = request.date {
            game.date = date;
        }
        if let Some(time) = request.time {
            game.time = time;
        }
        if let Some(location) = request.location {
            game.location = Some(location);
        }

        tx.put_match(&game).await?;
        tx.commit().await?;

        info!(match_id = %id, "Match details updated");
        Ok(game)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.store.delete_match(id).await? {
            return Err(ApiError::not_found("Match not found"));
        }
        info!(match_id = %id, "Match deleted");
        Ok(())
    }
}

fn unique(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

fn expand_stats(stats: &[PlayerStat], players: &HashMap<Uuid, Player>) -> Vec<ExpandedPlayerStat> {
    stats
        .iter()
        .map(|stat| ExpandedPlayerStat {
            stat: stat.clone(),
            player: players.get(&stat.player_id).map(Player::brief),
        })
        .collect()
}

/// Matches with team names and stat rows expanded, for tournament pages.
pub(crate) async fn brief_matches(
    store: &SharedStore,
    matches: &[Match],
) -> Result<Vec<MatchBrief>, ApiError> {
    let team_ids = unique(matches.iter().flat_map(|m| [m.team_1, m.team_2]));
    let team_names: HashMap<Uuid, String> = store
        .get_teams(&team_ids)
        .await?
        .into_iter()
        .map(|t| (t.id, t.details.name))
        .collect();

    let player_ids = unique(
        matches
            .iter()
            .flat_map(|m| m.player_stats.iter().map(|s| s.player_id)),
    );
    let players: HashMap<Uuid, Player> = store
        .get_players(&player_ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    Ok(matches
        .iter()
        .map(|game| MatchBrief {
            team_1_name: team_names.get(&game.team_1).cloned(),
            team_2_name: team_names.get(&game.team_2).cloned(),
            player_stats_expanded: expand_stats(&game.player_stats, &players),
            match_data: game.clone(),
        })
        .collect())
}
