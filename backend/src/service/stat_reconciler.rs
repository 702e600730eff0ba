use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::api_error::ApiError;
use crate::models::{
    add_stat, Match, MatchHistoryEntry, Player, PlayerStat, StatDelta, UpdateMatchStatsRequest,
};
use crate::store::SharedStore;

/// Result of one reconciliation request.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub game: Match,
    /// False when the idempotency key had already been applied.
    pub applied: bool,
    /// Player ids named by a delta that do not exist.
    pub skipped_players: Vec<Uuid>,
}

/// Merges per-player stat deltas into a match's stat table and the players'
/// match history and totals, all inside one unit of work.
#[derive(Clone)]
pub struct StatReconciler {
    store: SharedStore,
}

impl StatReconciler {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn reconcile(
        &self,
        match_id: Uuid,
        request: UpdateMatchStatsRequest,
    ) -> Result<ReconcileOutcome, ApiError> {
        request.validate()?;

        let mut tx = self.store.begin().await?;

        let mut game = tx
            .lock_match(match_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Match not found"))?;

        if let Some(ref key) = request.idempotency_key {
            if tx.stat_update_applied(match_id, key).await? {
                info!(
                    match_id = %match_id,
                    idempotency_key = %key,
                    "Stat update already applied, returning current match"
                );
                return Ok(ReconcileOutcome {
                    game,
                    applied: false,
                    skipped_players: vec![],
                });
            }
        }

        let requested: Vec<Uuid> = request
            .team_1_players
            .iter()
            .chain(request.team_2_players.iter())
            .map(|delta| delta.player_id)
            .collect();

        let mut players: HashMap<Uuid, Player> = tx
            .lock_players(&requested)
            .await?
            .into_iter()
            .map(|player| (player.id, player))
            .collect();

        let mut touched: Vec<Uuid> = Vec::new();
        let mut skipped_players: Vec<Uuid> = Vec::new();

        let sides = [
            (game.team_1, &request.team_1_players),
            (game.team_2, &request.team_2_players),
        ];
        for (team_id, deltas) in sides {
            for delta in deltas {
                let Some(player) = players.get_mut(&delta.player_id) else {
                    warn!(
                        match_id = %match_id,
                        player_id = %delta.player_id,
                        "Skipping stat delta for unknown player"
                    );
                    if !skipped_players.contains(&delta.player_id) {
                        skipped_players.push(delta.player_id);
                    }
                    continue;
                };

                apply_delta(&mut game, player, team_id, delta)?;
                if !touched.contains(&player.id) {
                    touched.push(player.id);
                }
            }
        }

        settle_result(&mut game)?;

        touched.sort();
        for player_id in &touched {
            if let Some(player) = players.get(player_id) {
                tx.put_player(player).await?;
            }
        }
        tx.put_match(&game).await?;
        if let Some(ref key) = request.idempotency_key {
            tx.record_stat_update(match_id, key).await?;
        }
        tx.commit().await?;

        info!(
            match_id = %match_id,
            players_updated = touched.len(),
            players_skipped = skipped_players.len(),
            team_1_score = game.team_1_score,
            team_2_score = game.team_2_score,
            winner = ?game.winner,
            "Match stats reconciled"
        );

        Ok(ReconcileOutcome {
            game,
            applied: true,
            skipped_players,
        })
    }
}

/// Did-not-play marker after a delta: an explicit value wins, otherwise a
/// non-zero delta means the player took the floor.
fn next_marker(current: bool, delta: &StatDelta) -> bool {
    match delta.did_not_play {
        Some(value) => value,
        None if !delta.is_zero() => false,
        None => current,
    }
}

/// Applies one delta to both copies of the player's performance in `game`
/// and re-derives the player's totals from history. Nothing changes when a
/// counter would overflow.
pub fn apply_delta(
    game: &mut Match,
    player: &mut Player,
    team_id: Uuid,
    delta: &StatDelta,
) -> Result<(), ApiError> {
    let mut entry = player
        .history_for(game.id)
        .cloned()
        .unwrap_or_else(|| MatchHistoryEntry {
            did_not_play: false,
            ..MatchHistoryEntry::unplayed(game.id, game.tournament_id, team_id)
        });
    entry.points_scored = add_stat(entry.points_scored, delta.points)?;
    entry.assists = add_stat(entry.assists, delta.assists)?;
    entry.rebounds = add_stat(entry.rebounds, delta.rebounds)?;
    entry.did_not_play = next_marker(entry.did_not_play, delta);

    let mut stat = game.stat_for(player.id).cloned().unwrap_or(PlayerStat {
        did_not_play: false,
        ..PlayerStat::unplayed(player.id, team_id)
    });
    stat.points = add_stat(stat.points, delta.points)?;
    stat.assists = add_stat(stat.assists, delta.assists)?;
    stat.rebounds = add_stat(stat.rebounds, delta.rebounds)?;
    stat.did_not_play = next_marker(stat.did_not_play, delta);

    let mut updated = player.clone();
    match updated.history_for_mut(game.id) {
        Some(existing) => *existing = entry,
        None => updated.match_history.push(entry),
    }
    updated.recompute_totals()?;

    *player = updated;
    match game.stat_for_mut(player.id) {
        Some(existing) => *existing = stat,
        None => game.player_stats.push(stat),
    }

    debug!(
        match_id = %game.id,
        player_id = %player.id,
        points = delta.points,
        assists = delta.assists,
        rebounds = delta.rebounds,
        "Applied stat delta"
    );
    Ok(())
}

/// Sum of `points` over the stat rows carrying `team_id`.
pub fn team_score(game: &Match, team_id: Uuid) -> Result<i64, ApiError> {
    game.player_stats
        .iter()
        .filter(|stat| stat.team_id == team_id)
        .try_fold(0, |total, stat| add_stat(total, stat.points))
}

/// Strictly higher score wins; a tie has no winner.
pub fn decide_winner(team_1: Uuid, score_1: i64, team_2: Uuid, score_2: i64) -> Option<Uuid> {
    match score_1.cmp(&score_2) {
        std::cmp::Ordering::Greater => Some(team_1),
        std::cmp::Ordering::Less => Some(team_2),
        std::cmp::Ordering::Equal => None,
    }
}

/// Recomputes both team scores and the winner from the stat table.
pub fn settle_result(game: &mut Match) -> Result<(), ApiError> {
    let team_1_score = team_score(game, game.team_1)?;
    let team_2_score = team_score(game, game.team_2)?;
    game.team_1_score = team_1_score;
    game.team_2_score = team_2_score;
    game.winner = decide_winner(game.team_1, team_1_score, game.team_2, team_2_score);
    Ok(())
}
