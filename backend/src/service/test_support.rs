//! Shared league fixtures for service tests, backed by the in-memory store
//! unless a test supplies its own.

use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::*;
use crate::service::stat_reconciler::{ReconcileOutcome, StatReconciler};
use crate::service::{MatchService, PlayerService, TeamService, TournamentService};
use crate::store::{MemoryStore, SharedStore};

pub struct League {
    pub store: SharedStore,
    pub tournaments: TournamentService,
    pub teams: TeamService,
    pub players: PlayerService,
    pub matches: MatchService,
    pub reconciler: StatReconciler,
}

pub struct Fixture {
    pub tournament: Tournament,
    pub team_1: Team,
    pub team_2: Team,
    pub game: Match,
    pub team_1_players: Vec<Player>,
    pub team_2_players: Vec<Player>,
}

impl Fixture {
    pub fn all_players(&self) -> impl Iterator<Item = &Player> {
        self.team_1_players.iter().chain(self.team_2_players.iter())
    }
}

impl League {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: SharedStore) -> Self {
        Self {
            tournaments: TournamentService::new(store.clone()),
            teams: TeamService::new(store.clone()),
            players: PlayerService::new(store.clone()),
            matches: MatchService::new(store.clone()),
            reconciler: StatReconciler::new(store.clone()),
            store,
        }
    }

    pub async fn tournament(&self, name: &str) -> Tournament {
        self.tournaments
            .create(tournament_request(name))
            .await
            .expect("create tournament")
    }

    pub async fn team(&self, name: &str) -> Team {
        self.teams
            .create(CreateTeamRequest {
                name: name.to_string(),
                origin: "Riverside".to_string(),
                logo: format!("https://cdn.example.com/{}.png", name.to_lowercase()),
                primary_number: None,
                coach: None,
            })
            .await
            .expect("create team")
    }

    pub async fn player(&self, team_id: Uuid, name: &str) -> Player {
        self.players
            .create(player_request(team_id, name))
            .await
            .expect("create player")
    }

    pub async fn register(&self, tournament_id: Uuid, team_id: Uuid) -> Tournament {
        self.tournaments
            .assign_team(AssignTeamRequest {
                team_id,
                tournament_id,
            })
            .await
            .expect("assign team")
    }

    pub async fn reconcile(
        &self,
        match_id: Uuid,
        team_1_players: Vec<StatDelta>,
        team_2_players: Vec<StatDelta>,
    ) -> ReconcileOutcome {
        self.reconciler
            .reconcile(
                match_id,
                UpdateMatchStatsRequest {
                    team_1_players,
                    team_2_players,
                    idempotency_key: None,
                },
            )
            .await
            .expect("reconcile stats")
    }

    /// "Spring Open" with "Falcons" (Alex, Blake) against "Herons" (Casey, Drew).
    pub async fn fixture(&self) -> Fixture {
        let tournament = self.tournament("Spring Open").await;
        let team_1 = self.team("Falcons").await;
        let team_2 = self.team("Herons").await;

        let team_1_players = vec![
            self.player(team_1.id, "Alex").await,
            self.player(team_1.id, "Blake").await,
        ];
        let team_2_players = vec![
            self.player(team_2.id, "Casey").await,
            self.player(team_2.id, "Drew").await,
        ];

        self.register(tournament.id, team_1.id).await;
        let tournament = self.register(tournament.id, team_2.id).await;

        let game = self
            .matches
            .create(match_request(tournament.id, team_1.id, team_2.id))
            .await
            .expect("create match");

        Fixture {
            tournament,
            team_1,
            team_2,
            game,
            team_1_players,
            team_2_players,
        }
    }
}

pub fn tournament_request(name: &str) -> CreateTournamentRequest {
    let start_date = Utc::now() + Duration::days(30);
    CreateTournamentRequest {
        name: name.to_string(),
        start_date,
        end_date: start_date + Duration::days(3),
        registering_start_date: start_date - Duration::days(14),
        location: "City Arena".to_string(),
        organizer: Organizer {
            name: "Jordan".to_string(),
            phone_number: "555-0100".to_string(),
            image: None,
        },
        prize_pool: PrizePool {
            first_prize: "5000".to_string(),
            second_prize: "2500".to_string(),
            third_prize: "1000".to_string(),
            entry_fee: "100".to_string(),
            mvp: "500".to_string(),
        },
        poster_image: "https://cdn.example.com/poster.png".to_string(),
    }
}

pub fn player_request(team_id: Uuid, name: &str) -> CreatePlayerRequest {
    CreatePlayerRequest {
        name: name.to_string(),
        mobile_number: "555-0199".to_string(),
        current_team: team_id,
        jersey_number: "7".to_string(),
        age: 24,
        height: 190.0,
        weight: 85.0,
        image: "https://cdn.example.com/player.png".to_string(),
        document: "https://cdn.example.com/id.pdf".to_string(),
    }
}

pub fn match_request(tournament_id: Uuid, team_1: Uuid, team_2: Uuid) -> CreateMatchRequest {
    CreateMatchRequest {
        tournament_id,
        team_1,
        team_2,
        date: NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid date"),
        time: "18:30".to_string(),
        location: Some("Court 1".to_string()),
    }
}

pub fn delta(player_id: Uuid, points: i64, assists: i64, rebounds: i64) -> StatDelta {
    StatDelta {
        player_id,
        points,
        assists,
        rebounds,
        did_not_play: None,
    }
}
