//! GetRankingSummaryHandler - aggregate statistics over a user's states.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::ranking::{RankingError, RankingSummary};
use crate::ports::RankingStateRepository;

#[derive(Debug, Clone)]
pub struct GetRankingSummaryQuery {
    pub user_id: UserId,
}

pub struct GetRankingSummaryHandler {
    repository: Arc<dyn RankingStateRepository>,
}

impl GetRankingSummaryHandler {
    pub fn new(repository: Arc<dyn RankingStateRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetRankingSummaryQuery) -> Result<RankingSummary, RankingError> {
        let states = self.repository.find_for_user(&query.user_id).await?;
        Ok(RankingSummary::from_states(query.user_id, &states))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryRankingStateRepository;
    use crate::domain::foundation::ProfileId;

    #[tokio::test]
    async fn summarizes_all_rows() {
        let repo = Arc::new(InMemoryRankingStateRepository::new());
        let user = UserId::new("u-1").unwrap();
        let ranked = [
            (ProfileId::new("P3").unwrap(), 0.8),
            (ProfileId::new("P1").unwrap(), 0.2),
        ];
        repo.observe_ranking(&user, &ranked).await.unwrap();
        repo.observe_ranking(&user, &ranked).await.unwrap();

        let summary = GetRankingSummaryHandler::new(repo)
            .handle(GetRankingSummaryQuery { user_id: user })
            .await
            .unwrap();

        assert_eq!(summary.total_profiles, 2);
        assert_eq!(summary.top_ranked_profile_id.unwrap().as_str(), "P3");
        assert_eq!(summary.total_observations, 4);
        assert!((summary.highest_average_score - 0.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_user_has_empty_summary() {
        let summary = GetRankingSummaryHandler::new(Arc::new(InMemoryRankingStateRepository::new()))
            .handle(GetRankingSummaryQuery {
                user_id: UserId::new("nobody").unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(summary.total_profiles, 0);
        assert!(summary.top_ranked_profile_id.is_none());
    }
}
