//! Shared application state for the HTTP adapters.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::application::handlers::assignment::{
    AssignProfileHandler, GetAssignmentStatusHandler,
};
use crate::application::handlers::ranking::{
    GetProfileDriftHandler, GetRankingStatesHandler, GetRankingSummaryHandler,
    PurgeRankingStatesHandler,
};
use crate::domain::assignment::AssignmentPolicy;
use crate::ports::{AccountStore, AssignmentPublisher, ProfileCatalog, RankingStateRepository};

/// Drift consumer status as seen by `/health`.
#[derive(Debug, Clone, Default)]
pub enum ConsumerStatus {
    /// No consumer was started for this process.
    #[default]
    Disabled,
    /// Flag owned by the running consumer.
    Tracked(Arc<AtomicBool>),
}

impl ConsumerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumerStatus::Disabled => "disabled",
            ConsumerStatus::Tracked(flag) if flag.load(Ordering::SeqCst) => "running",
            ConsumerStatus::Tracked(_) => "stopped",
        }
    }
}

/// Shared application state containing all dependencies.
///
/// Cloned for each request; handlers are built on demand from the
/// Arc-wrapped ports.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn ProfileCatalog>,
    pub rankings: Arc<dyn RankingStateRepository>,
    pub accounts: Arc<dyn AccountStore>,
    pub publisher: Arc<dyn AssignmentPublisher>,
    pub policy: AssignmentPolicy,
    pub consumer: ConsumerStatus,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn ProfileCatalog>,
        rankings: Arc<dyn RankingStateRepository>,
        accounts: Arc<dyn AccountStore>,
        publisher: Arc<dyn AssignmentPublisher>,
        policy: AssignmentPolicy,
    ) -> Self {
        Self {
            catalog,
            rankings,
            accounts,
            publisher,
            policy,
            consumer: ConsumerStatus::Disabled,
        }
    }

    pub fn with_consumer_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.consumer = ConsumerStatus::Tracked(flag);
        self
    }

    pub fn assign_profile_handler(&self) -> AssignProfileHandler {
        AssignProfileHandler::new(
            self.catalog.clone(),
            self.rankings.clone(),
            self.accounts.clone(),
            self.publisher.clone(),
            self.policy,
        )
    }

    pub fn assignment_status_handler(&self) -> GetAssignmentStatusHandler {
        GetAssignmentStatusHandler::new(
            self.accounts.clone(),
            self.rankings.clone(),
            self.policy,
        )
    }

    pub fn ranking_states_handler(&self) -> GetRankingStatesHandler {
        GetRankingStatesHandler::new(self.rankings.clone())
    }

    pub fn ranking_summary_handler(&self) -> GetRankingSummaryHandler {
        GetRankingSummaryHandler::new(self.rankings.clone())
    }

    pub fn profile_drift_handler(&self) -> GetProfileDriftHandler {
        GetProfileDriftHandler::new(self.rankings.clone())
    }

    pub fn purge_handler(&self) -> PurgeRankingStatesHandler {
        PurgeRankingStatesHandler::new(self.rankings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumer_status_follows_flag() {
        assert_eq!(ConsumerStatus::Disabled.as_str(), "disabled");

        let flag = Arc::new(AtomicBool::new(true));
        let status = ConsumerStatus::Tracked(flag.clone());
        assert_eq!(status.as_str(), "running");

        flag.store(false, Ordering::SeqCst);
        assert_eq!(status.as_str(), "stopped");
    }
}
