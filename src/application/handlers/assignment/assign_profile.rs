//! AssignProfileHandler - folds observations into ranking state and commits
//! a profile once the evidence clears the mode's bar.

use std::sync::Arc;

use crate::domain::assignment::{
    AssignmentDecision, AssignmentError, AssignmentPolicy, AssignmentStatus, ConfidenceLevel,
    ProfileAssigned, ProfileMode,
};
use crate::domain::foundation::{ProfileId, Timestamp, UserId};
use crate::domain::matching::{BehaviorObservation, ProfileMatcher};
use crate::domain::ranking::RankingState;
use crate::ports::{AccountStore, AssignmentPublisher, ProfileCatalog, RankingStateRepository};

/// Observations in the shape the caller sent them.
///
/// Cold start takes exactly one `Single`; drift fallback takes a non-empty
/// `Batch`. A one-element batch is still a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BehaviorInput {
    Single(BehaviorObservation),
    Batch(Vec<BehaviorObservation>),
}

impl BehaviorInput {
    pub fn observations(&self) -> &[BehaviorObservation] {
        match self {
            BehaviorInput::Single(observation) => std::slice::from_ref(observation),
            BehaviorInput::Batch(observations) => observations,
        }
    }

    fn shape(&self) -> &'static str {
        match self {
            BehaviorInput::Single(_) => "a single observation",
            BehaviorInput::Batch(_) => "an observation array",
        }
    }
}

/// Command to process one or more observations for a user.
#[derive(Debug, Clone)]
pub struct AssignProfileCommand {
    pub user_id: UserId,
    /// Mode the caller believes the account is in. Checked, never trusted.
    pub requested_mode: Option<ProfileMode>,
    pub behavior: BehaviorInput,
    pub trigger_event_id: Option<String>,
}

/// Result of an assignment call or status query.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOutcome {
    pub status: AssignmentStatus,
    pub confidence_level: ConfidenceLevel,
    /// `None` when the user is unknown.
    pub mode: Option<ProfileMode>,
    pub prompt_count: u32,
    pub assigned_profile_id: Option<ProfileId>,
    /// Best first.
    pub rankings: Vec<RankingState>,
}

impl AssignmentOutcome {
    pub fn not_found() -> Self {
        Self {
            status: AssignmentStatus::NotFound,
            confidence_level: ConfidenceLevel::None,
            mode: None,
            prompt_count: 0,
            assigned_profile_id: None,
            rankings: Vec::new(),
        }
    }
}

/// Observation count shared by all of a user's rows.
pub(crate) fn prompt_count(states: &[RankingState]) -> u32 {
    states.iter().map(|s| s.observation_count).max().unwrap_or(0)
}

/// Handler for the assignment orchestrator.
pub struct AssignProfileHandler {
    catalog: Arc<dyn ProfileCatalog>,
    rankings: Arc<dyn RankingStateRepository>,
    accounts: Arc<dyn AccountStore>,
    publisher: Arc<dyn AssignmentPublisher>,
    policy: AssignmentPolicy,
}

impl AssignProfileHandler {
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
        }
    }

    pub async fn handle(
        &self,
        cmd: AssignProfileCommand,
    ) -> Result<AssignmentOutcome, AssignmentError> {
        // 1. The stored mode is authoritative
        let account = self
            .accounts
            .find_account(&cmd.user_id)
            .await?
            .ok_or_else(|| AssignmentError::user_not_found(cmd.user_id.clone()))?;
        let mode = account.mode;

        if let Some(requested) = cmd.requested_mode {
            if requested != mode {
                return Err(AssignmentError::mode_mismatch(requested, mode));
            }
        }
        if !mode.is_assignable() {
            return Err(AssignmentError::mode_not_assignable(mode));
        }

        // 2. Shape and range checks before anything is written
        self.validate_shape(mode, &cmd.behavior)?;

        // 3. One weight configuration for the whole request
        let profiles = self.catalog.load_profiles().await?;
        let weights = self.catalog.load_weights().await?;
        if profiles.is_empty() {
            tracing::warn!("Profile catalog is empty; nothing to rank for user {}", cmd.user_id);
        }

        // 4. Match and fold each observation in order
        let mut count = prompt_count(&self.rankings.find_for_user(&cmd.user_id).await?);
        for observation in cmd.behavior.observations() {
            let prompt_number = count + 1;
            let regime = self.policy.regime_for(mode, prompt_number);
            let result = ProfileMatcher::rank(&profiles, &weights, observation, regime);

            for entry in &result.ranked {
                tracing::debug!(
                    user_id = %cmd.user_id,
                    profile_id = %entry.profile_id,
                    raw = entry.breakdown.raw,
                    score = entry.score,
                    "Scored profile"
                );
            }

            let ranked: Vec<(ProfileId, f64)> = result
                .ranked
                .iter()
                .map(|p| (p.profile_id.clone(), p.score))
                .collect();
            self.rankings.observe_ranking(&cmd.user_id, &ranked).await?;
            count = prompt_number;
        }

        // 5. Decide on the refreshed table
        let states = self.rankings.find_for_user(&cmd.user_id).await?;
        let decision = self.policy.decide(mode, &states);

        let outcome = match decision {
            AssignmentDecision::Commit {
                profile_id,
                confidence,
                average_score,
            } => {
                self.accounts
                    .commit_assignment(&cmd.user_id, &profile_id)
                    .await?;
                tracing::info!(
                    user_id = %cmd.user_id,
                    profile_id = %profile_id,
                    mode = %mode,
                    average_score,
                    "Profile assigned"
                );

                self.announce(ProfileAssigned {
                    user_id: cmd.user_id.clone(),
                    assigned_profile_id: profile_id.clone(),
                    confidence_level: confidence,
                    mode,
                    trigger_event_id: cmd.trigger_event_id.clone(),
                    assigned_at: Timestamp::now(),
                })
                .await;

                AssignmentOutcome {
                    status: AssignmentStatus::Assigned,
                    confidence_level: confidence,
                    mode: Some(mode),
                    prompt_count: count,
                    assigned_profile_id: Some(profile_id),
                    rankings: states,
                }
            }
            AssignmentDecision::Pending { leading_profile } => {
                tracing::debug!(
                    "Assignment pending for user {} (leader: {:?}, prompts: {})",
                    cmd.user_id,
                    leading_profile.as_ref().map(|p| p.as_str()),
                    count
                );
                AssignmentOutcome {
                    status: AssignmentStatus::Pending,
                    confidence_level: ConfidenceLevel::Low,
                    mode: Some(mode),
                    prompt_count: count,
                    assigned_profile_id: None,
                    rankings: states,
                }
            }
        };

        Ok(outcome)
    }

    fn validate_shape(
        &self,
        mode: ProfileMode,
        behavior: &BehaviorInput,
    ) -> Result<(), AssignmentError> {
        match (mode, behavior) {
            (ProfileMode::ColdStart, BehaviorInput::Batch(_)) => {
                return Err(AssignmentError::invalid_shape(
                    mode,
                    format!("expected a single observation, got {}", behavior.shape()),
                ));
            }
            (ProfileMode::DriftFallback, BehaviorInput::Single(_)) => {
                return Err(AssignmentError::invalid_shape(
                    mode,
                    format!("expected an observation array, got {}", behavior.shape()),
                ));
            }
            (ProfileMode::DriftFallback, BehaviorInput::Batch(observations))
                if observations.is_empty() =>
            {
                return Err(AssignmentError::invalid_shape(
                    mode,
                    "expected at least one observation",
                ));
            }
            _ => {}
        }

        for (i, observation) in behavior.observations().iter().enumerate() {
            observation.validate().map_err(|e| {
                AssignmentError::validation(format!("behavior[{}].{}", i, e.field()), e.to_string())
            })?;
        }
        Ok(())
    }

    /// Publishes the assignment. Failures are logged and swallowed: the
    /// commitment is already persisted.
    async fn announce(&self, event: ProfileAssigned) {
        match self.publisher.publish(&event).await {
            Ok(message_id) => tracing::info!(
                user_id = %event.user_id,
                profile_id = %event.assigned_profile_id,
                message_id = %message_id,
                "Published profile.assigned event"
            ),
            Err(e) => tracing::error!(
                "Failed to publish profile.assigned event for user {}: {}",
                event.user_id,
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryAccountStore, InMemoryAssignmentPublisher, InMemoryProfileCatalog,
        InMemoryRankingStateRepository,
    };
    use crate::domain::matching::ProfileDefinition;

    // ════════════════════════════════════════════════════════════════════════════
    // Fixtures
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        handler: AssignProfileHandler,
        rankings: Arc<InMemoryRankingStateRepository>,
        accounts: Arc<InMemoryAccountStore>,
        publisher: Arc<InMemoryAssignmentPublisher>,
    }

    fn pid(s: &str) -> ProfileId {
        ProfileId::new(s).unwrap()
    }

    fn user() -> UserId {
        UserId::new("550e8400-e29b-41d4-a716-446655440000").unwrap()
    }

    fn catalog() -> Vec<ProfileDefinition> {
        vec![
            ProfileDefinition::new(pid("P1"), "Learner")
                .with_primary_intent("LEARNING", 1.0)
                .with_interest("PROGRAMMING", 0.3),
            ProfileDefinition::new(pid("P3"), "Problem Solver")
                .with_primary_intent("PROBLEM_SOLVING", 1.0)
                .with_interest("PROGRAMMING", 0.8)
                .with_signal("MULTI_STEP", 0.7),
        ]
    }

    fn problem_solving() -> BehaviorObservation {
        BehaviorObservation::default()
            .with_intent("PROBLEM_SOLVING", 0.9)
            .with_interest("PROGRAMMING", 0.9)
            .with_behavior_level("ADVANCED")
            .with_signal("MULTI_STEP", 0.8)
            .with_scalars(0.8, 0.85)
    }

    fn fixture(mode: ProfileMode) -> Fixture {
        let rankings = Arc::new(InMemoryRankingStateRepository::new());
        let accounts = Arc::new(InMemoryAccountStore::new());
        let publisher = Arc::new(InMemoryAssignmentPublisher::new());
        accounts.insert(user(), mode);

        let handler = AssignProfileHandler::new(
            Arc::new(InMemoryProfileCatalog::with_profiles(catalog())),
            rankings.clone(),
            accounts.clone(),
            publisher.clone(),
            AssignmentPolicy::default(),
        );
        Fixture {
            handler,
            rankings,
            accounts,
            publisher,
        }
    }

    fn command(behavior: BehaviorInput) -> AssignProfileCommand {
        AssignProfileCommand {
            user_id: user(),
            requested_mode: None,
            behavior,
            trigger_event_id: None,
        }
    }

    fn single(observation: BehaviorObservation) -> BehaviorInput {
        BehaviorInput::Single(observation)
    }

    fn batch(observations: Vec<BehaviorObservation>) -> BehaviorInput {
        BehaviorInput::Batch(observations)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Cold start
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn cold_start_assigns_after_three_consistent_prompts() {
        let f = fixture(ProfileMode::ColdStart);

        for expected_count in 1..=2 {
            let outcome = f.handler.handle(command(single(problem_solving()))).await.unwrap();
            assert_eq!(outcome.status, AssignmentStatus::Pending);
            assert_eq!(outcome.confidence_level, ConfidenceLevel::Low);
            assert_eq!(outcome.prompt_count, expected_count);
            assert_eq!(outcome.rankings[0].profile_id, pid("P3"));
        }

        let outcome = f.handler.handle(command(single(problem_solving()))).await.unwrap();
        assert_eq!(outcome.status, AssignmentStatus::Assigned);
        assert_eq!(outcome.assigned_profile_id, Some(pid("P3")));
        assert_eq!(outcome.confidence_level, ConfidenceLevel::High);
        assert_eq!(outcome.mode, Some(ProfileMode::ColdStart));
        assert_eq!(outcome.prompt_count, 3);

        let account = f.accounts.account(&user()).unwrap();
        assert_eq!(account.assigned_profile_id, Some(pid("P3")));
        assert_eq!(account.mode, ProfileMode::ColdStart);

        let published = f.publisher.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].assigned_profile_id, pid("P3"));
        assert_eq!(published[0].trigger_event_id, None);
    }

    #[tokio::test]
    async fn cold_start_rejects_batches() {
        let f = fixture(ProfileMode::ColdStart);
        let err = f
            .handler
            .handle(command(batch(vec![problem_solving(), problem_solving()])))
            .await
            .unwrap_err();
        assert!(matches!(err, AssignmentError::InvalidShape { .. }));
        assert_eq!(f.rankings.row_count(), 0);
    }

    #[tokio::test]
    async fn cold_start_rejects_one_element_batch() {
        let f = fixture(ProfileMode::ColdStart);
        let err = f
            .handler
            .handle(command(batch(vec![problem_solving()])))
            .await
            .unwrap_err();
        assert!(matches!(err, AssignmentError::InvalidShape { .. }));
        assert_eq!(f.rankings.row_count(), 0);
    }

    #[tokio::test]
    async fn every_profile_is_folded_each_prompt() {
        let f = fixture(ProfileMode::ColdStart);
        let outcome = f.handler.handle(command(single(problem_solving()))).await.unwrap();
        assert_eq!(outcome.rankings.len(), 2);
        assert!(outcome.rankings.iter().all(|s| s.observation_count == 1));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Drift fallback
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn drift_batch_advances_every_profile_by_batch_size() {
        let f = fixture(ProfileMode::DriftFallback);
        let outcome = f
            .handler
            .handle(command(batch(vec![problem_solving(); 5])))
            .await
            .unwrap();

        assert_eq!(outcome.prompt_count, 5);
        assert!(outcome.rankings.iter().all(|s| s.observation_count == 5));
    }

    #[tokio::test]
    async fn drift_fallback_commits_with_trigger_id() {
        let f = fixture(ProfileMode::DriftFallback);
        let mut cmd = command(batch(vec![problem_solving(); 3]));
        cmd.trigger_event_id = Some("drift-evt-1".to_string());

        let outcome = f.handler.handle(cmd).await.unwrap();

        assert_eq!(outcome.status, AssignmentStatus::Assigned);
        let published = f.publisher.published();
        assert_eq!(published[0].mode, ProfileMode::DriftFallback);
        assert_eq!(published[0].trigger_event_id.as_deref(), Some("drift-evt-1"));
    }

    #[tokio::test]
    async fn drift_fallback_needs_three_top_runs() {
        let f = fixture(ProfileMode::DriftFallback);
        let outcome = f
            .handler
            .handle(command(batch(vec![problem_solving(); 2])))
            .await
            .unwrap();
        assert_eq!(outcome.status, AssignmentStatus::Pending);
        assert!(f.publisher.published().is_empty());
    }

    #[tokio::test]
    async fn drift_fallback_rejects_empty_batch() {
        let f = fixture(ProfileMode::DriftFallback);
        let err = f.handler.handle(command(batch(vec![]))).await.unwrap_err();
        assert!(matches!(err, AssignmentError::InvalidShape { .. }));
    }

    #[tokio::test]
    async fn drift_fallback_rejects_single_observation() {
        let f = fixture(ProfileMode::DriftFallback);
        let err = f
            .handler
            .handle(command(single(problem_solving())))
            .await
            .unwrap_err();
        assert!(matches!(err, AssignmentError::InvalidShape { .. }));
        assert_eq!(f.rankings.row_count(), 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Client errors
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let f = fixture(ProfileMode::ColdStart);
        let mut cmd = command(single(problem_solving()));
        cmd.user_id = UserId::new("ghost").unwrap();
        let err = f.handler.handle(cmd).await.unwrap_err();
        assert!(matches!(err, AssignmentError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn mode_mismatch_is_rejected_without_mutation() {
        let f = fixture(ProfileMode::ColdStart);
        let mut cmd = command(single(problem_solving()));
        cmd.requested_mode = Some(ProfileMode::DriftFallback);
        let err = f.handler.handle(cmd).await.unwrap_err();
        assert_eq!(
            err,
            AssignmentError::mode_mismatch(ProfileMode::DriftFallback, ProfileMode::ColdStart)
        );
        assert_eq!(f.rankings.row_count(), 0);
    }

    #[tokio::test]
    async fn hybrid_accounts_are_not_assignable() {
        let f = fixture(ProfileMode::Hybrid);
        let err = f.handler.handle(command(single(problem_solving()))).await.unwrap_err();
        assert_eq!(err, AssignmentError::mode_not_assignable(ProfileMode::Hybrid));
    }

    #[tokio::test]
    async fn out_of_range_observation_is_rejected() {
        let f = fixture(ProfileMode::ColdStart);
        let bad = problem_solving().with_scalars(1.5, 0.5);
        let err = f.handler.handle(command(single(bad))).await.unwrap_err();
        match err {
            AssignmentError::ValidationFailed { field, .. } => {
                assert_eq!(field, "behavior[0].complexity")
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(f.rankings.row_count(), 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Infrastructure
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn publish_failure_does_not_fail_assignment() {
        let f = fixture(ProfileMode::DriftFallback);
        f.publisher.set_failing(true);
        let outcome = f
            .handler
            .handle(command(batch(vec![problem_solving(); 3])))
            .await
            .unwrap();
        assert_eq!(outcome.status, AssignmentStatus::Assigned);
        assert_eq!(f.accounts.commits().len(), 1);
    }

    #[tokio::test]
    async fn ranking_store_failure_is_retryable() {
        let f = fixture(ProfileMode::ColdStart);
        f.rankings.set_unavailable(true);
        let err = f.handler.handle(command(single(problem_solving()))).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(f.accounts.commits().is_empty());
    }
}
