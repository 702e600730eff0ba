//! Entity store: persistence for tournaments, teams, players and matches.
//!
//! Reads go straight through [`EntityStore`]. Every multi-record write runs
//! inside a [`StoreTransaction`], which holds its records locked until it is
//! committed. Dropping a transaction without committing discards its writes.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::api_error::ApiError;
use crate::models::{Match, Player, Team, Tournament};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type SharedStore = Arc<dyn EntityStore>;

#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn ping(&self) -> Result<(), ApiError>;

    async fn list_tournaments(&self) -> Result<Vec<Tournament>, ApiError>;
    async fn get_tournament(&self, id: Uuid) -> Result<Option<Tournament>, ApiError>;
    async fn get_tournaments(&self, ids: &[Uuid]) -> Result<Vec<Tournament>, ApiError>;
    async fn delete_tournament(&self, id: Uuid) -> Result<bool, ApiError>;

    async fn list_teams(&self) -> Result<Vec<Team>, ApiError>;
    async fn get_team(&self, id: Uuid) -> Result<Option<Team>, ApiError>;
    async fn get_teams(&self, ids: &[Uuid]) -> Result<Vec<Team>, ApiError>;
    async fn delete_team(&self, id: Uuid) -> Result<bool, ApiError>;

    async fn list_players(&self) -> Result<Vec<Player>, ApiError>;
    async fn get_player(&self, id: Uuid) -> Result<Option<Player>, ApiError>;
    async fn get_players(&self, ids: &[Uuid]) -> Result<Vec<Player>, ApiError>;
    async fn delete_player(&self, id: Uuid) -> Result<bool, ApiError>;

    async fn list_matches(&self) -> Result<Vec<Match>, ApiError>;
    async fn get_match(&self, id: Uuid) -> Result<Option<Match>, ApiError>;
    async fn get_matches(&self, ids: &[Uuid]) -> Result<Vec<Match>, ApiError>;
    async fn delete_match(&self, id: Uuid) -> Result<bool, ApiError>;

    /// Opens a unit of work. Never call other store methods while one is open.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, ApiError>;
}

/// A unit of work over the store.
///
/// `lock_*` loads records for update. Callers lock in one fixed order:
/// tournament, teams by ascending id, match, then players by ascending id.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn lock_tournament(&mut self, id: Uuid) -> Result<Option<Tournament>, ApiError>;
    async fn lock_team(&mut self, id: Uuid) -> Result<Option<Team>, ApiError>;
    async fn lock_match(&mut self, id: Uuid) -> Result<Option<Match>, ApiError>;
    /// Missing ids are left out; the result is ordered by id.
    async fn lock_players(&mut self, ids: &[Uuid]) -> Result<Vec<Player>, ApiError>;

    async fn put_tournament(&mut self, tournament: &Tournament) -> Result<(), ApiError>;
    async fn put_team(&mut self, team: &Team) -> Result<(), ApiError>;
    async fn put_player(&mut self, player: &Player) -> Result<(), ApiError>;
    async fn put_match(&mut self, game: &Match) -> Result<(), ApiError>;

    async fn stat_update_applied(&mut self, match_id: Uuid, key: &str) -> Result<bool, ApiError>;
    async fn record_stat_update(&mut self, match_id: Uuid, key: &str) -> Result<(), ApiError>;

    async fn commit(self: Box<Self>) -> Result<(), ApiError>;
}

/// Sorted, de-duplicated copy of `ids`.
pub(crate) fn lock_order(ids: &[Uuid]) -> Vec<Uuid> {
    let mut ordered = ids.to_vec();
    ordered.sort();
    ordered.dedup();
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_order_sorts_and_dedups() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let c = Uuid::from_u128(3);
        assert_eq!(lock_order(&[c, a, b, a]), vec![a, b, c]);
    }
}
