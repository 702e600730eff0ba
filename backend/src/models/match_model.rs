use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::api_error::ApiError;
use crate::models::player::PlayerBrief;
use crate::models::team::TeamWithPlayers;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Match {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub team_1: Uuid,
    pub team_2: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub location: Option<String>,
    pub team_1_score: i64,
    pub team_2_score: i64,
    pub winner: Option<Uuid>,
    pub mvp: Option<Uuid>,
    #[sqlx(json)]
    pub player_stats: Vec<PlayerStat>,
    pub created_at: DateTime<Utc>,
}

/// One row of a match's stat table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerStat {
    pub player_id: Uuid,
    pub team_id: Uuid,
    pub points: i64,
    pub assists: i64,
    pub rebounds: i64,
    pub did_not_play: bool,
}

impl PlayerStat {
    pub fn unplayed(player_id: Uuid, team_id: Uuid) -> Self {
        Self {
            player_id,
            team_id,
            points: 0,
            assists: 0,
            rebounds: 0,
            did_not_play: true,
        }
    }
}

impl Match {
    pub fn stat_for(&self, player_id: Uuid) -> Option<&PlayerStat> {
        self.player_stats.iter().find(|s| s.player_id == player_id)
    }

    pub fn stat_for_mut(&mut self, player_id: Uuid) -> Option<&mut PlayerStat> {
        self.player_stats.iter_mut().find(|s| s.player_id == player_id)
    }
}

/// Largest value a single delta field may carry.
pub const MAX_STAT_DELTA: i64 = 1000;

/// Adds two stat counters, rejecting a sum that does not fit.
pub fn add_stat(current: i64, delta: i64) -> Result<i64, ApiError> {
    current
        .checked_add(delta)
        .ok_or_else(|| ApiError::validation("Stat total out of range"))
}

/// Per-player increment for one match. Omitted numbers count as zero.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct StatDelta {
    pub player_id: Uuid,
    #[serde(default)]
    #[validate(range(min = 0, max = MAX_STAT_DELTA))]
    pub points: i64,
    #[serde(default)]
    #[validate(range(min = 0, max = MAX_STAT_DELTA))]
    pub assists: i64,
    #[serde(default)]
    #[validate(range(min = 0, max = MAX_STAT_DELTA))]
    pub rebounds: i64,
    #[serde(default)]
    pub did_not_play: Option<bool>,
}

impl StatDelta {
    pub fn is_zero(&self) -> bool {
        self.points == 0 && self.assists == 0 && self.rebounds == 0
    }
}

/// Stat update for a match; the first list plays for `team_1`, the second for `team_2`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateMatchStatsRequest {
    #[serde(default)]
    #[validate(nested)]
    pub team_1_players: Vec<StatDelta>,
    #[serde(default)]
    #[validate(nested)]
    pub team_2_players: Vec<StatDelta>,
    /// Replaying an already applied key leaves the match untouched.
    #[validate(length(min = 1, max = 128))]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMatchRequest {
    pub tournament_id: Uuid,
    pub team_1: Uuid,
    pub team_2: Uuid,
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 32))]
    pub time: String,
    #[validate(length(max = 255))]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateMatchDetailsRequest {
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 32))]
    pub time: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    pub mvp: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMatchResponse {
    pub message: String,
    #[serde(rename = "match")]
    pub match_data: Match,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMatchStatsResponse {
    pub message: String,
    pub applied: bool,
    #[serde(rename = "match")]
    pub match_data: Match,
}

/// Stat row with the player expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandedPlayerStat {
    #[serde(flatten)]
    pub stat: PlayerStat,
    pub player: Option<PlayerBrief>,
}

/// Compact match view used inside tournament details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchBrief {
    #[serde(flatten)]
    pub match_data: Match,
    pub team_1_name: Option<String>,
    pub team_2_name: Option<String>,
    pub player_stats_expanded: Vec<ExpandedPlayerStat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub match_id: Uuid,
    pub date: NaiveDate,
    pub team_1_id: Uuid,
    pub team_2_id: Uuid,
    pub player_stats: Vec<PlayerStat>,
    pub team_1_name: Option<String>,
    pub team_2_name: Option<String>,
    pub tournament_name: Option<String>,
    pub team_1_players: Vec<PlayerBrief>,
    pub team_2_players: Vec<PlayerBrief>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchTournamentInfo {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDetail {
    #[serde(flatten)]
    pub match_data: Match,
    pub team_1_details: Option<TeamWithPlayers>,
    pub team_2_details: Option<TeamWithPlayers>,
    pub tournament: Option<MatchTournamentInfo>,
    pub player_stats_expanded: Vec<ExpandedPlayerStat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_delta_defaults() {
        let json = r#"{"player_id":"6f1c1a9e-2f55-4c47-9a55-4f3f7f8b2a10","points":12}"#;
        let delta: StatDelta = serde_json::from_str(json).unwrap();
        assert_eq!(delta.points, 12);
        assert_eq!(delta.assists, 0);
        assert_eq!(delta.rebounds, 0);
        assert_eq!(delta.did_not_play, None);
        assert!(!delta.is_zero());
    }

    #[test]
    fn test_add_stat_rejects_overflow() {
        assert_eq!(add_stat(40, 2).unwrap(), 42);
        assert!(matches!(
            add_stat(i64::MAX, 1),
            Err(ApiError::ValidationError(_))
        ));
    }

    #[test]
    fn test_oversized_delta_fails_validation() {
        let delta = StatDelta {
            player_id: Uuid::new_v4(),
            points: MAX_STAT_DELTA + 1,
            assists: 0,
            rebounds: 0,
            did_not_play: None,
        };
        assert!(delta.validate().is_err());
    }

    #[test]
    fn test_negative_delta_fails_validation() {
        let request = UpdateMatchStatsRequest {
            team_1_players: vec![StatDelta {
                player_id: Uuid::new_v4(),
                points: -3,
                assists: 0,
                rebounds: 0,
                did_not_play: None,
            }],
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_match_response_uses_match_key() {
        let response = CreateMatchResponse {
            message: "ok".to_string(),
            match_data: Match {
                id: Uuid::new_v4(),
                tournament_id: Uuid::new_v4(),
                team_1: Uuid::new_v4(),
                team_2: Uuid::new_v4(),
                date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
                time: "18:30".to_string(),
                location: None,
                team_1_score: 0,
                team_2_score: 0,
                winner: None,
                mvp: None,
                player_stats: vec![],
                created_at: Utc::now(),
            },
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("match").is_some());
    }
}
