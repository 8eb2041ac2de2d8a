//! PurgeRankingStatesHandler - explicit deletion of a user's ranking states.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::ranking::RankingError;
use crate::ports::RankingStateRepository;

#[derive(Debug, Clone)]
pub struct PurgeRankingStatesCommand {
    pub user_id: UserId,
}

/// Number of rows removed.
pub type PurgeRankingStatesResult = u64;

pub struct PurgeRankingStatesHandler {
    repository: Arc<dyn RankingStateRepository>,
}

impl PurgeRankingStatesHandler {
    pub fn new(repository: Arc<dyn RankingStateRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: PurgeRankingStatesCommand,
    ) -> Result<PurgeRankingStatesResult, RankingError> {
        let deleted = self.repository.purge_user(&cmd.user_id).await?;
        tracing::info!(user_id = %cmd.user_id, deleted, "Purged ranking states");
        Ok(deleted)
    }
}
