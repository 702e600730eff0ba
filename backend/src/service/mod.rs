// Service layer for the league backend
pub mod match_service;
pub mod player_service;
pub mod stat_reconciler;
pub mod team_service;
pub mod tournament_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use match_service::MatchService;
pub use player_service::PlayerService;
pub use stat_reconciler::StatReconciler;
pub use team_service::TeamService;
pub use tournament_service::TournamentService;
