//! In-memory ranking-state repository.
//!
//! # Security Note
//!
//! This adapter is for **testing and local runs only**. It uses `.expect()`
//! on lock operations which will panic if locks are poisoned.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::domain::foundation::{ProfileId, UserId};
use crate::domain::ranking::{sort_best_first, RankingError, RankingState};
use crate::ports::RankingStateRepository;

type Key = (UserId, ProfileId);

/// Ranking states held in a single mutex-guarded map.
///
/// A batch fold computes every new row before writing any, so a failure
/// leaves the map unchanged.
pub struct InMemoryRankingStateRepository {
    states: Mutex<HashMap<Key, RankingState>>,
    unavailable: AtomicBool,
}

impl InMemoryRankingStateRepository {
    pub fn new() -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    // === Test Helpers ===

    /// Makes every subsequent call fail with an infrastructure error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Total number of stored rows across all users.
    pub fn row_count(&self) -> usize {
        self.states
            .lock()
            .expect("InMemoryRankingStateRepository: lock poisoned")
            .len()
    }

    fn check_available(&self) -> Result<(), RankingError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RankingError::infrastructure("ranking store unavailable"));
        }
        Ok(())
    }
}

impl Default for InMemoryRankingStateRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RankingStateRepository for InMemoryRankingStateRepository {
    async fn observe(
        &self,
        user_id: &UserId,
        profile_id: &ProfileId,
        score: f64,
        rank: u32,
    ) -> Result<RankingState, RankingError> {
        self.check_available()?;
        RankingState::check_observation(score, rank)?;

        let mut states = self
            .states
            .lock()
            .expect("InMemoryRankingStateRepository: lock poisoned");
        let key = (user_id.clone(), profile_id.clone());
        let next = RankingState::observe(states.get(&key).cloned(), user_id, profile_id, score, rank);
        states.insert(key, next.clone());
        Ok(next)
    }

    async fn observe_ranking(
        &self,
        user_id: &UserId,
        ranked: &[(ProfileId, f64)],
    ) -> Result<Vec<RankingState>, RankingError> {
        let all_profiles = || ranked.iter().map(|(p, _)| p.clone()).collect::<Vec<_>>();
        if let Err(e) = self.check_available() {
            return Err(RankingError::fold_failed(all_profiles(), e.to_string()));
        }
        for (i, (_, score)) in ranked.iter().enumerate() {
            RankingState::check_observation(*score, i as u32 + 1)?;
        }

        let mut states = self
            .states
            .lock()
            .expect("InMemoryRankingStateRepository: lock poisoned");

        let folded: Vec<RankingState> = ranked
            .iter()
            .enumerate()
            .map(|(i, (profile_id, score))| {
                let key = (user_id.clone(), profile_id.clone());
                RankingState::observe(
                    states.get(&key).cloned(),
                    user_id,
                    profile_id,
                    *score,
                    i as u32 + 1,
                )
            })
            .collect();

        for state in &folded {
            states.insert(
                (state.user_id.clone(), state.profile_id.clone()),
                state.clone(),
            );
        }
        Ok(folded)
    }

    async fn find(
        &self,
        user_id: &UserId,
        profile_id: &ProfileId,
    ) -> Result<Option<RankingState>, RankingError> {
        self.check_available()?;
        let states = self
            .states
            .lock()
            .expect("InMemoryRankingStateRepository: lock poisoned");
        Ok(states.get(&(user_id.clone(), profile_id.clone())).cloned())
    }

    async fn find_for_user(&self, user_id: &UserId) -> Result<Vec<RankingState>, RankingError> {
        self.check_available()?;
        let mut found: Vec<RankingState> = self
            .states
            .lock()
            .expect("InMemoryRankingStateRepository: lock poisoned")
            .values()
            .filter(|s| &s.user_id == user_id)
            .cloned()
            .collect();
        sort_best_first(&mut found);
        Ok(found)
    }

    async fn purge_user(&self, user_id: &UserId) -> Result<u64, RankingError> {
        self.check_available()?;
        let mut states = self
            .states
            .lock()
            .expect("InMemoryRankingStateRepository: lock poisoned");
        let before = states.len();
        states.retain(|(user, _), _| user != user_id);
        Ok((before - states.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn pid(s: &str) -> ProfileId {
        ProfileId::new(s).unwrap()
    }

    #[tokio::test]
    async fn observe_creates_then_folds() {
        let repo = InMemoryRankingStateRepository::new();
        repo.observe(&uid("u"), &pid("P1"), 0.6, 1).await.unwrap();
        let state = repo.observe(&uid("u"), &pid("P1"), 0.2, 2).await.unwrap();
        assert_eq!(state.observation_count, 2);
        assert!((state.average_score - 0.4).abs() < 1e-12);
        assert_eq!(state.consecutive_drop_count, 1);
        assert_eq!(repo.row_count(), 1);
    }

    #[tokio::test]
    async fn observe_ranking_uses_positions_as_ranks() {
        let repo = InMemoryRankingStateRepository::new();
        let folded = repo
            .observe_ranking(&uid("u"), &[(pid("P3"), 0.8), (pid("P1"), 0.2)])
            .await
            .unwrap();
        assert_eq!(folded[0].last_rank, 1);
        assert_eq!(folded[0].consecutive_top_count, 1);
        assert_eq!(folded[1].last_rank, 2);
    }

    #[tokio::test]
    async fn find_for_user_is_best_first_and_scoped() {
        let repo = InMemoryRankingStateRepository::new();
        repo.observe_ranking(&uid("u"), &[(pid("P3"), 0.8), (pid("P1"), 0.2)])
            .await
            .unwrap();
        repo.observe(&uid("other"), &pid("P1"), 0.9, 1).await.unwrap();

        let states = repo.find_for_user(&uid("u")).await.unwrap();
        let ids: Vec<_> = states.iter().map(|s| s.profile_id.as_str()).collect();
        assert_eq!(ids, vec!["P3", "P1"]);

        let top = repo.top_for_user(&uid("u"), 1).await.unwrap();
        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn unavailable_batch_reports_every_profile_and_writes_nothing() {
        let repo = InMemoryRankingStateRepository::new();
        repo.set_unavailable(true);
        let err = repo
            .observe_ranking(&uid("u"), &[(pid("P1"), 0.5), (pid("P2"), 0.5)])
            .await
            .unwrap_err();
        match err {
            RankingError::FoldFailed {
                failed_profiles, ..
            } => assert_eq!(failed_profiles, vec![pid("P1"), pid("P2")]),
            other => panic!("unexpected error {:?}", other),
        }
        repo.set_unavailable(false);
        assert_eq!(repo.row_count(), 0);
    }

    #[tokio::test]
    async fn rejects_invalid_score() {
        let repo = InMemoryRankingStateRepository::new();
        assert!(repo.observe(&uid("u"), &pid("P1"), f64::NAN, 1).await.is_err());
        assert!(repo.observe(&uid("u"), &pid("P1"), 0.5, 0).await.is_err());
    }

    #[tokio::test]
    async fn purge_removes_only_that_user() {
        let repo = InMemoryRankingStateRepository::new();
        repo.observe(&uid("u"), &pid("P1"), 0.5, 1).await.unwrap();
        repo.observe(&uid("u"), &pid("P2"), 0.5, 2).await.unwrap();
        repo.observe(&uid("v"), &pid("P1"), 0.5, 1).await.unwrap();
        assert_eq!(repo.purge_user(&uid("u")).await.unwrap(), 2);
        assert_eq!(repo.row_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_folds_sum_exactly() {
        let repo = Arc::new(InMemoryRankingStateRepository::new());
        let mut handles = Vec::new();
        for _ in 0..20 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.observe(&uid("u"), &pid("P1"), 0.25, 1).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let state = repo.find(&uid("u"), &pid("P1")).await.unwrap().unwrap();
        assert_eq!(state.observation_count, 20);
        assert!((state.cumulative_score - 5.0).abs() < 1e-12);
    }
}
