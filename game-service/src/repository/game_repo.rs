use async_trait::async_trait;
use shared::{GameId, GameRecord, RankedGame, Result, ServiceError, UserId};
use sqlx::{PgPool, Row};
use tracing::{debug, error};

use crate::repository::GameRecordStore;

#[derive(Clone)]
pub struct GameRepository {
    pool: PgPool,
}

impl GameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GameRecordStore for GameRepository {
    async fn insert(
        &self,
        user_id: &UserId,
        score: i64,
        taps: i32,
        duration: i32,
    ) -> Result<GameId> {
        let row = sqlx::query(
            r#"
            INSERT INTO games (user_id, score, taps, duration)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(user_id.0)
        .bind(score)
        .bind(taps)
        .bind(duration)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(user_id = %user_id, error = %e, "Failed to insert game record");
            ServiceError::Database(e.to_string())
        })?;

        Ok(GameId(row.get("id")))
    }

    async fn top_scores(&self, limit: i64) -> Result<Vec<RankedGame>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id AS user_id, u.username, g.score, g.taps, g.played_at
            FROM games g
            INNER JOIN users u ON g.user_id = u.id
            ORDER BY g.score DESC, g.played_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch ranked games");
            ServiceError::Database(e.to_string())
        })?;

        let games = rows
            .iter()
            .map(|row| RankedGame {
                user_id: UserId(row.get("user_id")),
                username: row.get("username"),
                score: row.get("score"),
                taps: row.get("taps"),
                played_at: row.get("played_at"),
            })
            .collect::<Vec<_>>();

        debug!(count = games.len(), "Fetched ranked games");
        Ok(games)
    }

    async fn recent_for_user(&self, user_id: &UserId, limit: i64) -> Result<Vec<GameRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, score, taps, duration, played_at
            FROM games
            WHERE user_id = $1
            ORDER BY played_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.0)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| GameRecord {
                id: GameId(row.get("id")),
                user_id: UserId(row.get("user_id")),
                score: row.get("score"),
                taps: row.get("taps"),
                duration: row.get("duration"),
                played_at: row.get("played_at"),
            })
            .collect())
    }

    async fn best_score_for_user(&self, user_id: &UserId) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(MAX(score), 0) AS best_score
            FROM games
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.0)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("best_score"))
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM games WHERE user_id = $1")
            .bind(user_id.0)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("count"))
    }

    async fn count_all(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM games")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("count"))
    }
}
