use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::api_error::ApiError;
use crate::db::DbPool;
use crate::models::{Match, Player, Team, Tournament};
use crate::store::{lock_order, EntityStore, StoreTransaction};

const SELECT_TOURNAMENTS: &str = r#"
    SELECT id, name, start_date, end_date, registering_start_date, location,
           organizer, prize_pool, poster_image, teams, matches, created_at
    FROM tournaments
"#;

const SELECT_TEAMS: &str = r#"
    SELECT id, details, coach, players, created_at
    FROM teams
"#;

const SELECT_PLAYERS: &str = r#"
    SELECT id, name, mobile_number, jersey_number, age, height, weight, image, document,
           current_team, total_points, total_assists, total_rebounds, match_history, created_at
    FROM players
"#;

const SELECT_MATCHES: &str = r#"
    SELECT id, tournament_id, team_1, team_2, date, time, location, team_1_score,
           team_2_score, winner, mvp, player_stats, created_at
    FROM matches
"#;

/// PostgreSQL-backed store. Embedded documents live in JSONB columns and
/// reference lists in `UUID[]` columns.
#[derive(Clone)]
pub struct PgStore {
    db_pool: DbPool,
}

impl PgStore {
    pub fn new(db_pool: DbPool) -> Self {
        Self { db_pool }
    }
}

fn by_id(select: &str) -> String {
    format!("{} WHERE id = $1", select)
}

fn by_ids(select: &str) -> String {
    format!("{} WHERE id = ANY($1) ORDER BY id", select)
}

fn ordered(select: &str) -> String {
    format!("{} ORDER BY created_at, id", select)
}

async fn delete_by_id(pool: &DbPool, table: &str, id: Uuid) -> Result<bool, ApiError> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", table))
        .bind(id)
        .execute(pool)
        .await
        .map_err(ApiError::database_error)?;
    Ok(result.rows_affected() > 0)
}

#[async_trait]
impl EntityStore for PgStore {
    async fn ping(&self) -> Result<(), ApiError> {
        crate::db::health_check(&self.db_pool).await
    }

    async fn list_tournaments(&self) -> Result<Vec<Tournament>, ApiError> {
        sqlx::query_as::<_, Tournament>(&ordered(SELECT_TOURNAMENTS))
            .fetch_all(&self.db_pool)
            .await
            .map_err(ApiError::database_error)
    }

    async fn get_tournament(&self, id: Uuid) -> Result<Option<Tournament>, ApiError> {
        sqlx::query_as::<_, Tournament>(&by_id(SELECT_TOURNAMENTS))
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(ApiError::database_error)
    }

    async fn get_tournaments(&self, ids: &[Uuid]) -> Result<Vec<Tournament>, ApiError> {
        sqlx::query_as::<_, Tournament>(&by_ids(SELECT_TOURNAMENTS))
            .bind(ids)
            .fetch_all(&self.db_pool)
            .await
            .map_err(ApiError::database_error)
    }

    async fn delete_tournament(&self, id: Uuid) -> Result<bool, ApiError> {
        delete_by_id(&self.db_pool, "tournaments", id).await
    }

    async fn list_teams(&self) -> Result<Vec<Team>, ApiError> {
        sqlx::query_as::<_, Team>(&ordered(SELECT_TEAMS))
            .fetch_all(&self.db_pool)
            .await
            .map_err(ApiError::database_error)
    }

    async fn get_team(&self, id: Uuid) -> Result<Option<Team>, ApiError> {
        sqlx::query_as::<_, Team>(&by_id(SELECT_TEAMS))
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(ApiError::database_error)
    }

    async fn get_teams(&self, ids: &[Uuid]) -> Result<Vec<Team>, ApiError> {
        sqlx::query_as::<_, Team>(&by_ids(SELECT_TEAMS))
            .bind(ids)
            .fetch_all(&self.db_pool)
            .await
            .map_err(ApiError::database_error)
    }

    async fn delete_team(&self, id: Uuid) -> Result<bool, ApiError> {
        delete_by_id(&self.db_pool, "teams", id).await
    }

    async fn list_players(&self) -> Result<Vec<Player>, ApiError> {
        sqlx::query_as::<_, Player>(&ordered(SELECT_PLAYERS))
            .fetch_all(&self.db_pool)
            .await
            .map_err(ApiError::database_error)
    }

    async fn get_player(&self, id: Uuid) -> Result<Option<Player>, ApiError> {
        sqlx::query_as::<_, Player>(&by_id(SELECT_PLAYERS))
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(ApiError::database_error)
    }

    async fn get_players(&self, ids: &[Uuid]) -> Result<Vec<Player>, ApiError> {
        sqlx::query_as::<_, Player>(&by_ids(SELECT_PLAYERS))
            .bind(ids)
            .fetch_all(&self.db_pool)
            .await
            .map_err(ApiError::database_error)
    }

    async fn delete_player(&self, id: Uuid) -> Result<bool, ApiError> {
        delete_by_id(&self.db_pool, "players", id).await
    }

    async fn list_matches(&self) -> Result<Vec<Match>, ApiError> {
        sqlx::query_as::<_, Match>(&ordered(SELECT_MATCHES))
            .fetch_all(&self.db_pool)
            .await
            .map_err(ApiError::database_error)
    }

    async fn get_match(&self, id: Uuid) -> Result<Option<Match>, ApiError> {
        sqlx::query_as::<_, Match>(&by_id(SELECT_MATCHES))
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(ApiError::database_error)
    }

    async fn get_matches(&self, ids: &[Uuid]) -> Result<Vec<Match>, ApiError> {
        sqlx::query_as::<_, Match>(&by_ids(SELECT_MATCHES))
            .bind(ids)
            .fetch_all(&self.db_pool)
            .await
            .map_err(ApiError::database_error)
    }

    async fn delete_match(&self, id: Uuid) -> Result<bool, ApiError> {
        // match_stat_updates rows go with the match (ON DELETE CASCADE)
        delete_by_id(&self.db_pool, "matches", id).await
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, ApiError> {
        let tx = self
            .db_pool
            .begin()
            .await
            .map_err(ApiError::database_error)?;
        Ok(Box::new(PgTransaction { tx }))
    }
}

struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

fn for_update(select: &str) -> String {
    format!("{} WHERE id = $1 FOR UPDATE", select)
}

#[async_trait]
impl StoreTransaction for PgTransaction {
    async fn lock_tournament(&mut self, id: Uuid) -> Result<Option<Tournament>, ApiError> {
        sqlx::query_as::<_, Tournament>(&for_update(SELECT_TOURNAMENTS))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(ApiError::database_error)
    }

    async fn lock_team(&mut self, id: Uuid) -> Result<Option<Team>, ApiError> {
        sqlx::query_as::<_, Team>(&for_update(SELECT_TEAMS))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(ApiError::database_error)
    }

    async fn lock_match(&mut self, id: Uuid) -> Result<Option<Match>, ApiError> {
        sqlx::query_as::<_, Match>(&for_update(SELECT_MATCHES))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(ApiError::database_error)
    }

    async fn lock_players(&mut self, ids: &[Uuid]) -> Result<Vec<Player>, ApiError> {
        let ordered_ids = lock_order(ids);
        sqlx::query_as::<_, Player>(&format!(
            "{} WHERE id = ANY($1) ORDER BY id FOR UPDATE",
            SELECT_PLAYERS
        ))
        .bind(&ordered_ids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(ApiError::database_error)
    }

    async fn put_tournament(&mut self, tournament: &Tournament) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO tournaments (
                id, name, start_date, end_date, registering_start_date, location,
                organizer, prize_pool, poster_image, teams, matches, created_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12
            )
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                registering_start_date = EXCLUDED.registering_start_date,
                location = EXCLUDED.location,
                organizer = EXCLUDED.organizer,
                prize_pool = EXCLUDED.prize_pool,
                poster_image = EXCLUDED.poster_image,
                teams = EXCLUDED.teams,
                matches = EXCLUDED.matches
            "#,
        )
        .bind(tournament.id)
        .bind(&tournament.name)
        .bind(tournament.start_date)
        .bind(tournament.end_date)
        .bind(tournament.registering_start_date)
        .bind(&tournament.location)
        .bind(Json(&tournament.organizer))
        .bind(Json(&tournament.prize_pool))
        .bind(&tournament.poster_image)
        .bind(&tournament.teams)
        .bind(&tournament.matches)
        .bind(tournament.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(ApiError::database_error)?;
        Ok(())
    }

    async fn put_team(&mut self, team: &Team) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO teams (id, details, coach, players, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                details = EXCLUDED.details,
                coach = EXCLUDED.coach,
                players = EXCLUDED.players
            "#,
        )
        .bind(team.id)
        .bind(Json(&team.details))
        .bind(Json(&team.coach))
        .bind(&team.players)
        .bind(team.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(ApiError::database_error)?;
        Ok(())
    }

    async fn put_player(&mut self, player: &Player) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO players (
                id, name, mobile_number, jersey_number, age, height, weight, image, document,
                current_team, total_points, total_assists, total_rebounds, match_history, created_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15
            )
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                mobile_number = EXCLUDED.mobile_number,
                jersey_number = EXCLUDED.jersey_number,
                age = EXCLUDED.age,
                height = EXCLUDED.height,
                weight = EXCLUDED.weight,
                image = EXCLUDED.image,
                document = EXCLUDED.document,
                current_team = EXCLUDED.current_team,
                total_points = EXCLUDED.total_points,
                total_assists = EXCLUDED.total_assists,
                total_rebounds = EXCLUDED.total_rebounds,
                match_history = EXCLUDED.match_history
            "#,
        )
        .bind(player.id)
        .bind(&player.name)
        .bind(&player.mobile_number)
        .bind(&player.jersey_number)
        .bind(player.age)
        .bind(player.height)
        .bind(player.weight)
        .bind(&player.image)
        .bind(&player.document)
        .bind(player.current_team)
        .bind(player.total_points)
        .bind(player.total_assists)
        .bind(player.total_rebounds)
        .bind(Json(&player.match_history))
        .bind(player.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(ApiError::database_error)?;
        Ok(())
    }

    async fn put_match(&mut self, game: &Match) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO matches (
                id, tournament_id, team_1, team_2, date, time, location, team_1_score,
                team_2_score, winner, mvp, player_stats, created_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13
            )
            ON CONFLICT (id) DO UPDATE SET
                date = EXCLUDED.date,
                time = EXCLUDED.time,
                location = EXCLUDED.location,
                team_1_score = EXCLUDED.team_1_score,
                team_2_score = EXCLUDED.team_2_score,
                winner = EXCLUDED.winner,
                mvp = EXCLUDED.mvp,
                player_stats = EXCLUDED.player_stats
            "#,
        )
        .bind(game.id)
        .bind(game.tournament_id)
        .bind(game.team_1)
        .bind(game.team_2)
        .bind(game.date)
        .bind(&game.time)
        .bind(&game.location)
        .bind(game.team_1_score)
        .bind(game.team_2_score)
        .bind(game.winner)
        .bind(game.mvp)
        .bind(Json(&game.player_stats))
        .bind(game.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(ApiError::database_error)?;
        Ok(())
    }

    async fn stat_update_applied(&mut self, match_id: Uuid, key: &str) -> Result<bool, ApiError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM match_stat_updates
                WHERE match_id = $1 AND idempotency_key = $2
            )
            "#,
        )
        .bind(match_id)
        .bind(key)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(ApiError::database_error)
    }

    async fn record_stat_update(&mut self, match_id: Uuid, key: &str) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO match_stat_updates (match_id, idempotency_key)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(match_id)
        .bind(key)
        .execute(&mut *self.tx)
        .await
        .map_err(ApiError::database_error)?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), ApiError> {
        self.tx.commit().await.map_err(ApiError::database_error)?;
        debug!("Committed database unit of work");
        Ok(())
    }
}
