//! PostgreSQL implementation of RankingStateRepository.
//!
//! Each fold is a single `INSERT ... ON CONFLICT DO UPDATE`, so concurrent
//! folds of the same row serialize on the row lock and none is lost. A batch
//! fold runs every upsert inside one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::domain::foundation::{ProfileId, Timestamp, UserId};
use crate::domain::ranking::{RankingError, RankingState};
use crate::ports::RankingStateRepository;

const COLUMNS: &str = "user_id, profile_id, cumulative_score, average_score, max_score, \
     observation_count, last_rank, consecutive_top_count, consecutive_drop_count, updated_at";

/// PostgreSQL implementation of the RankingStateRepository port.
pub struct PostgresRankingStateRepository {
    pool: PgPool,
}

impl PostgresRankingStateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a ranking state.
#[derive(Debug, sqlx::FromRow)]
struct RankingStateRow {
    user_id: String,
    profile_id: String,
    cumulative_score: f64,
    average_score: f64,
    max_score: f64,
    observation_count: i32,
    last_rank: i32,
    consecutive_top_count: i32,
    consecutive_drop_count: i32,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RankingStateRow> for RankingState {
    type Error = RankingError;

    fn try_from(row: RankingStateRow) -> Result<Self, Self::Error> {
        let corrupt = |what: &str, e: String| {
            RankingError::infrastructure(format!("Invalid {} in ranking state row: {}", what, e))
        };
        let count = |what: &str, v: i32| u32::try_from(v).map_err(|e| corrupt(what, e.to_string()));

        Ok(RankingState {
            user_id: UserId::new(row.user_id).map_err(|e| corrupt("user_id", e.to_string()))?,
            profile_id: ProfileId::new(row.profile_id)
                .map_err(|e| corrupt("profile_id", e.to_string()))?,
            cumulative_score: row.cumulative_score,
            average_score: row.average_score,
            max_score: row.max_score,
            observation_count: count("observation_count", row.observation_count)?,
            last_rank: count("last_rank", row.last_rank)?,
            consecutive_top_count: count("consecutive_top_count", row.consecutive_top_count)?,
            consecutive_drop_count: count("consecutive_drop_count", row.consecutive_drop_count)?,
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn db_error(action: &str, e: sqlx::Error) -> RankingError {
    RankingError::infrastructure(format!("Failed to {}: {}", action, e))
}

fn rank_param(rank: u32) -> Result<i32, RankingError> {
    i32::try_from(rank).map_err(|_| RankingError::validation("rank", "rank exceeds storage range"))
}

/// Atomic fold of one observation. Every SET expression sees the old row.
async fn fold_one<'e, E>(
    executor: E,
    user_id: &UserId,
    profile_id: &ProfileId,
    score: f64,
    rank: u32,
) -> Result<RankingState, RankingError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        INSERT INTO user_profile_ranking_state AS s (
            id, user_id, profile_id, cumulative_score, average_score, max_score,
            observation_count, last_rank, consecutive_top_count, consecutive_drop_count, updated_at
        ) VALUES (
            $1, $2, $3, $4, $4, $4,
            1, $5, CASE WHEN $5 = 1 THEN 1 ELSE 0 END, 0, NOW()
        )
        ON CONFLICT (user_id, profile_id) DO UPDATE SET
            observation_count = s.observation_count + 1,
            cumulative_score = s.cumulative_score + EXCLUDED.cumulative_score,
            average_score = (s.cumulative_score + EXCLUDED.cumulative_score) / (s.observation_count + 1),
            max_score = GREATEST(s.max_score, EXCLUDED.max_score),
            consecutive_top_count = CASE WHEN EXCLUDED.last_rank = 1 THEN s.consecutive_top_count + 1 ELSE 0 END,
            consecutive_drop_count = CASE WHEN EXCLUDED.last_rank = 1 THEN 0 ELSE s.consecutive_drop_count + 1 END,
            last_rank = EXCLUDED.last_rank,
            updated_at = NOW()
        RETURNING {}
        "#,
        COLUMNS
    );

    let row: RankingStateRow = sqlx::query_as(&sql)
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.as_str())
        .bind(profile_id.as_str())
        .bind(score)
        .bind(rank_param(rank)?)
        .fetch_one(executor)
        .await
        .map_err(|e| db_error("fold ranking state", e))?;

    RankingState::try_from(row)
}

#[async_trait]
impl RankingStateRepository for PostgresRankingStateRepository {
    async fn observe(
        &self,
        user_id: &UserId,
        profile_id: &ProfileId,
        score: f64,
        rank: u32,
    ) -> Result<RankingState, RankingError> {
        RankingState::check_observation(score, rank)?;
        fold_one(&self.pool, user_id, profile_id, score, rank).await
    }

    async fn observe_ranking(
        &self,
        user_id: &UserId,
        ranked: &[(ProfileId, f64)],
    ) -> Result<Vec<RankingState>, RankingError> {
        for (i, (_, score)) in ranked.iter().enumerate() {
            RankingState::check_observation(*score, i as u32 + 1)?;
        }
        let all_profiles = || ranked.iter().map(|(p, _)| p.clone()).collect::<Vec<_>>();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RankingError::fold_failed(all_profiles(), e.to_string()))?;

        let mut folded = Vec::with_capacity(ranked.len());
        for (i, (profile_id, score)) in ranked.iter().enumerate() {
            match fold_one(&mut *tx, user_id, profile_id, *score, i as u32 + 1).await {
                Ok(state) => folded.push(state),
                Err(e) => {
                    // Dropping the transaction rolls back the rows already folded
                    tracing::error!(
                        "Ranking fold for user {} failed at profile {}: {}",
                        user_id,
                        profile_id,
                        e
                    );
                    return Err(RankingError::fold_failed(all_profiles(), e.to_string()));
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| RankingError::fold_failed(all_profiles(), e.to_string()))?;
        Ok(folded)
    }

    async fn find(
        &self,
        user_id: &UserId,
        profile_id: &ProfileId,
    ) -> Result<Option<RankingState>, RankingError> {
        let sql = format!(
            "SELECT {} FROM user_profile_ranking_state WHERE user_id = $1 AND profile_id = $2",
            COLUMNS
        );
        let row: Option<RankingStateRow> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .bind(profile_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("find ranking state", e))?;

        row.map(RankingState::try_from).transpose()
    }

    async fn find_for_user(&self, user_id: &UserId) -> Result<Vec<RankingState>, RankingError> {
        let sql = format!(
            r#"
            SELECT {} FROM user_profile_ranking_state
            WHERE user_id = $1
            ORDER BY average_score DESC, last_rank ASC
            "#,
            COLUMNS
        );
        let rows: Vec<RankingStateRow> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list ranking states", e))?;

        rows.into_iter().map(RankingState::try_from).collect()
    }

    async fn top_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<RankingState>, RankingError> {
        let sql = format!(
            r#"
            SELECT {} FROM user_profile_ranking_state
            WHERE user_id = $1
            ORDER BY average_score DESC, last_rank ASC
            LIMIT $2
            "#,
            COLUMNS
        );
        let rows: Vec<RankingStateRow> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list top ranking states", e))?;

        rows.into_iter().map(RankingState::try_from).collect()
    }

    async fn purge_user(&self, user_id: &UserId) -> Result<u64, RankingError> {
        let result = sqlx::query("DELETE FROM user_profile_ranking_state WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("purge ranking states", e))?;

        Ok(result.rows_affected())
    }
}
