use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

use crate::api_error::ApiError;
use crate::models::{Match, Player, Team, Tournament};
use crate::store::{lock_order, EntityStore, StoreTransaction};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    tournaments: HashMap<Uuid, Tournament>,
    teams: HashMap<Uuid, Team>,
    players: HashMap<Uuid, Player>,
    matches: HashMap<Uuid, Match>,
    stat_updates: HashSet<(Uuid, String)>,
}

/// In-process store. A unit of work holds the whole state exclusively and
/// edits a copy, which replaces the state on commit.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_creation<T, F>(records: impl Iterator<Item = T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> (DateTime<Utc>, Uuid),
{
    let mut records: Vec<T> = records.collect();
    records.sort_by_key(|r| key(r));
    records
}

fn pick<T: Clone>(map: &HashMap<Uuid, T>, ids: &[Uuid]) -> Vec<T> {
    ids.iter().filter_map(|id| map.get(id).cloned()).collect()
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn ping(&self) -> Result<(), ApiError> {
        let _state = self.state.lock().await;
        Ok(())
    }

    async fn list_tournaments(&self) -> Result<Vec<Tournament>, ApiError> {
        let state = self.state.lock().await;
        Ok(sorted_by_creation(state.tournaments.values().cloned(), |t| {
            (t.created_at, t.id)
        }))
    }

    async fn get_tournament(&self, id: Uuid) -> Result<Option<Tournament>, ApiError> {
        Ok(self.state.lock().await.tournaments.get(&id).cloned())
    }

    async fn get_tournaments(&self, ids: &[Uuid]) -> Result<Vec<Tournament>, ApiError> {
        Ok(pick(&self.state.lock().await.tournaments, ids))
    }

    async fn delete_tournament(&self, id: Uuid) -> Result<bool, ApiError> {
        Ok(self.state.lock().await.tournaments.remove(&id).is_some())
    }

    async fn list_teams(&self) -> Result<Vec<Team>, ApiError> {
        let state = self.state.lock().await;
        Ok(sorted_by_creation(state.teams.values().cloned(), |t| {
            (t.created_at, t.id)
        }))
    }

    async fn get_team(&self, id: Uuid) -> Result<Option<Team>, ApiError> {
        Ok(self.state.lock().await.teams.get(&id).cloned())
    }

    async fn get_teams(&self, ids: &[Uuid]) -> Result<Vec<Team>, ApiError> {
        Ok(pick(&self.state.lock().await.teams, ids))
    }

    async fn delete_team(&self, id: Uuid) -> Result<bool, ApiError> {
        Ok(self.state.lock().await.teams.remove(&id).is_some())
    }

    async fn list_players(&self) -> Result<Vec<Player>, ApiError> {
        let state = self.state.lock().await;
        Ok(sorted_by_creation(state.players.values().cloned(), |p| {
            (p.created_at, p.id)
        }))
    }

    async fn get_player(&self, id: Uuid) -> Result<Option<Player>, ApiError> {
        Ok(self.state.lock().await.players.get(&id).cloned())
    }

    async fn get_players(&self, ids: &[Uuid]) -> Result<Vec<Player>, ApiError> {
        Ok(pick(&self.state.lock().await.players, ids))
    }

    async fn delete_player(&self, id: Uuid) -> Result<bool, ApiError> {
        Ok(self.state.lock().await.players.remove(&id).is_some())
    }

    async fn list_matches(&self) -> Result<Vec<Match>, ApiError> {
        let state = self.state.lock().await;
        Ok(sorted_by_creation(state.matches.values().cloned(), |m| {
            (m.created_at, m.id)
        }))
    }

    async fn get_match(&self, id: Uuid) -> Result<Option<Match>, ApiError> {
        Ok(self.state.lock().await.matches.get(&id).cloned())
    }

    async fn get_matches(&self, ids: &[Uuid]) -> Result<Vec<Match>, ApiError> {
        Ok(pick(&self.state.lock().await.matches, ids))
    }

    async fn delete_match(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut state = self.state.lock().await;
        let removed = state.matches.remove(&id).is_some();
        if removed {
            state.stat_updates.retain(|(match_id, _)| *match_id != id);
        }
        Ok(removed)
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, ApiError> {
        let guard = self.state.clone().lock_owned().await;
        let working = (*guard).clone();
        debug!("Opened in-memory unit of work");
        Ok(Box::new(MemoryTransaction { guard, working }))
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn lock_tournament(&mut self, id: Uuid) -> Result<Option<Tournament>, ApiError> {
        Ok(self.working.tournaments.get(&id).cloned())
    }

    async fn lock_team(&mut self, id: Uuid) -> Result<Option<Team>, ApiError> {
        Ok(self.working.teams.get(&id).cloned())
    }

    async fn lock_match(&mut self, id: Uuid) -> Result<Option<Match>, ApiError> {
        Ok(self.working.matches.get(&id).cloned())
    }

    async fn lock_players(&mut self, ids: &[Uuid]) -> Result<Vec<Player>, ApiError> {
        Ok(pick(&self.working.players, &lock_order(ids)))
    }

    async fn put_tournament(&mut self, tournament: &Tournament) -> Result<(), ApiError> {
        self.working
            .tournaments
            .insert(tournament.id, tournament.clone());
        Ok(())
    }

    async fn put_team(&mut self, team: &Team) -> Result<(), ApiError> {
        self.working.teams.insert(team.id, team.clone());
        Ok(())
    }

    async fn put_player(&mut self, player: &Player) -> Result<(), ApiError> {
        self.working.players.insert(player.id, player.clone());
        Ok(())
    }

    async fn put_match(&mut self, game: &Match) -> Result<(), ApiError> {
        self.working.matches.insert(game.id, game.clone());
        Ok(())
    }

    async fn stat_update_applied(&mut self, match_id: Uuid, key: &str) -> Result<bool, ApiError> {
        Ok(self
            .working
            .stat_updates
            .contains(&(match_id, key.to_string())))
    }

    async fn record_stat_update(&mut self, match_id: Uuid, key: &str) -> Result<(), ApiError> {
        self.working.stat_updates.insert((match_id, key.to_string()));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), ApiError> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamDetails;

    fn team(name: &str) -> Team {
        Team {
            id: Uuid::new_v4(),
            details: TeamDetails {
                name: name.to_string(),
                origin: "Riverside".to_string(),
                logo: String::new(),
                primary_number: None,
            },
            coach: None,
            players: vec![],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = MemoryStore::new();
        let falcons = team("Falcons");

        let mut tx = store.begin().await.unwrap();
        tx.put_team(&falcons).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.get_team(falcons.id).await.unwrap(), Some(falcons));
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let store = MemoryStore::new();
        let falcons = team("Falcons");

        {
            let mut tx = store.begin().await.unwrap();
            tx.put_team(&falcons).await.unwrap();
        }

        assert!(store.get_team(falcons.id).await.unwrap().is_none());
        assert!(store.list_teams().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_reports_missing_records() {
        let store = MemoryStore::new();
        let falcons = team("Falcons");

        let mut tx = store.begin().await.unwrap();
        tx.put_team(&falcons).await.unwrap();
        tx.commit().await.unwrap();

        assert!(store.delete_team(falcons.id).await.unwrap());
        assert!(!store.delete_team(falcons.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_stat_update_keys_are_scoped_to_match() {
        let store = MemoryStore::new();
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());

        let mut tx = store.begin().await.unwrap();
        tx.record_stat_update(first, "q1").await.unwrap();
        assert!(tx.stat_update_applied(first, "q1").await.unwrap());
        assert!(!tx.stat_update_applied(second, "q1").await.unwrap());
        tx.commit().await.unwrap();
    }
}
