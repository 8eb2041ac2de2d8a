//! GetAssignmentStatusHandler - Query handler for a user's assignment status.

use std::sync::Arc;

use super::assign_profile::{prompt_count, AssignmentOutcome};
use crate::domain::assignment::{AssignmentError, AssignmentPolicy, AssignmentStatus, ConfidenceLevel};
use crate::domain::foundation::UserId;
use crate::domain::ranking::best_ranked;
use crate::ports::{AccountStore, RankingStateRepository};

/// Query for a user's current assignment status.
#[derive(Debug, Clone)]
pub struct GetAssignmentStatusQuery {
    pub user_id: UserId,
}

/// Handler for assignment status reads.
///
/// Unknown users yield a `NOT_FOUND` outcome rather than an error.
pub struct GetAssignmentStatusHandler {
    accounts: Arc<dyn AccountStore>,
    rankings: Arc<dyn RankingStateRepository>,
    policy: AssignmentPolicy,
}

impl GetAssignmentStatusHandler {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        rankings: Arc<dyn RankingStateRepository>,
        policy: AssignmentPolicy,
    ) -> Self {
        Self {
            accounts,
            rankings,
            policy,
        }
    }

    pub async fn handle(
        &self,
        query: GetAssignmentStatusQuery,
    ) -> Result<AssignmentOutcome, AssignmentError> {
        let Some(account) = self.accounts.find_account(&query.user_id).await? else {
            return Ok(AssignmentOutcome::not_found());
        };

        let rankings = self.rankings.find_for_user(&query.user_id).await?;
        let best = best_ranked(&rankings);

        let (status, confidence_level) = match (&account.assigned_profile_id, best) {
            (Some(_), Some(best)) => (
                AssignmentStatus::Assigned,
                self.policy.confidence_for(best.average_score),
            ),
            (Some(_), None) => (AssignmentStatus::Assigned, ConfidenceLevel::Medium),
            (None, _) => (AssignmentStatus::Pending, ConfidenceLevel::Low),
        };

        Ok(AssignmentOutcome {
            status,
            confidence_level,
            mode: Some(account.mode),
            prompt_count: prompt_count(&rankings),
            assigned_profile_id: account.assigned_profile_id,
            rankings,
        })
    }
}
