//! RankingStateRepository port - durable per-(user, profile) statistics.
//!
//! The repository is the only writer of ranking states. Every write is a
//! fold of one `(score, rank)` observation; there is no generic update.

use async_trait::async_trait;

use crate::domain::foundation::{ProfileId, UserId};
use crate::domain::ranking::{RankingError, RankingState};

/// Repository port for ranking-state aggregation.
///
/// Implementations must ensure:
/// - A fold of one row is atomic with respect to concurrent folds of the same row
/// - `observe_ranking` applies all rows or none
/// - Rows are created lazily on first observation
#[async_trait]
pub trait RankingStateRepository: Send + Sync {
    /// Fold one observation into the (user, profile) state, creating it if absent.
    async fn observe(
        &self,
        user_id: &UserId,
        profile_id: &ProfileId,
        score: f64,
        rank: u32,
    ) -> Result<RankingState, RankingError>;

    /// Fold a full ranked list, using each entry's 1-based position as its rank.
    ///
    /// # Errors
    ///
    /// - `FoldFailed` listing every profile that was not folded
    async fn observe_ranking(
        &self,
        user_id: &UserId,
        ranked: &[(ProfileId, f64)],
    ) -> Result<Vec<RankingState>, RankingError>;

    /// Find the state of one (user, profile) pair.
    async fn find(
        &self,
        user_id: &UserId,
        profile_id: &ProfileId,
    ) -> Result<Option<RankingState>, RankingError>;

    /// All states of a user, best first (average desc, last rank asc).
    async fn find_for_user(&self, user_id: &UserId) -> Result<Vec<RankingState>, RankingError>;

    /// The single best state of a user, if any.
    async fn best_for_user(&self, user_id: &UserId) -> Result<Option<RankingState>, RankingError> {
        Ok(self.find_for_user(user_id).await?.into_iter().next())
    }

    /// The `limit` best states of a user.
    async fn top_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<RankingState>, RankingError> {
        let mut states = self.find_for_user(user_id).await?;
        states.truncate(limit);
        Ok(states)
    }

    /// Delete every state of a user. Returns the number of rows removed.
    async fn purge_user(&self, user_id: &UserId) -> Result<u64, RankingError>;
}
