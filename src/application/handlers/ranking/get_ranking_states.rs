//! Query handlers for reading ranking states.

use std::sync::Arc;

use crate::domain::foundation::{ProfileId, UserId};
use crate::domain::ranking::{RankingError, RankingState};
use crate::ports::RankingStateRepository;

/// Default size of a top-profiles read.
pub const DEFAULT_TOP_LIMIT: usize = 5;

/// Largest top-profiles read accepted.
pub const MAX_TOP_LIMIT: usize = 20;

/// Query for a user's ranking states, best first.
#[derive(Debug, Clone)]
pub struct GetRankingStatesQuery {
    pub user_id: UserId,
    /// `Some(n)` restricts the result to the `n` best rows (1..=20).
    pub limit: Option<usize>,
}

/// Query for a single (user, profile) state.
#[derive(Debug, Clone)]
pub struct GetRankingStateQuery {
    pub user_id: UserId,
    pub profile_id: ProfileId,
}

/// Handler for ranking-state reads.
pub struct GetRankingStatesHandler {
    repository: Arc<dyn RankingStateRepository>,
}

impl GetRankingStatesHandler {
    pub fn new(repository: Arc<dyn RankingStateRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: GetRankingStatesQuery,
    ) -> Result<Vec<RankingState>, RankingError> {
        match query.limit {
            None => self.repository.find_for_user(&query.user_id).await,
            Some(limit) if (1..=MAX_TOP_LIMIT).contains(&limit) => {
                self.repository.top_for_user(&query.user_id, limit).await
            }
            Some(limit) => Err(RankingError::validation(
                "limit",
                format!("must be between 1 and {}, got {}", MAX_TOP_LIMIT, limit),
            )),
        }
    }

    /// Reads one state; a missing row is `RankingError::NotFound`.
    pub async fn handle_one(&self, query: GetRankingStateQuery) -> Result<RankingState, RankingError> {
        self.repository
            .find(&query.user_id, &query.profile_id)
            .await?
            .ok_or_else(|| RankingError::not_found(query.user_id, query.profile_id))
    }
}
