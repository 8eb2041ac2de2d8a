//! Running statistics for one (user, profile) pair.

use serde::{Deserialize, Serialize};

use super::errors::RankingError;
use crate::domain::foundation::{ProfileId, Timestamp, UserId};

/// Aggregated match history of one profile for one user.
///
/// Created on the first observation and only ever changed by [`fold`](Self::fold).
/// At most one of the two run counters is nonzero at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingState {
    pub user_id: UserId,
    pub profile_id: ProfileId,
    pub cumulative_score: f64,
    pub average_score: f64,
    pub max_score: f64,
    pub observation_count: u32,
    /// 1 is best.
    pub last_rank: u32,
    pub consecutive_top_count: u32,
    pub consecutive_drop_count: u32,
    pub updated_at: Timestamp,
}

impl RankingState {
    /// Rejects observations no store may fold: non-finite or negative
    /// scores and rank 0.
    pub fn check_observation(score: f64, rank: u32) -> Result<(), RankingError> {
        if !score.is_finite() || score < 0.0 {
            return Err(RankingError::validation(
                "score",
                "must be a finite non-negative number",
            ));
        }
        if rank == 0 {
            return Err(RankingError::validation("rank", "ranks are 1-based"));
        }
        Ok(())
    }

    /// State after the very first observation of this pair.
    pub fn first(user_id: UserId, profile_id: ProfileId, score: f64, rank: u32) -> Self {
        Self {
            user_id,
            profile_id,
            cumulative_score: score,
            average_score: score,
            max_score: score,
            observation_count: 1,
            last_rank: rank,
            consecutive_top_count: u32::from(rank == 1),
            consecutive_drop_count: 0,
            updated_at: Timestamp::now(),
        }
    }

    /// Folds one more `(score, rank)` observation into the running statistics.
    pub fn fold(&mut self, score: f64, rank: u32) {
        self.observation_count += 1;
        self.cumulative_score += score;
        self.average_score = self.cumulative_score / f64::from(self.observation_count);
        if score > self.max_score {
            self.max_score = score;
        }
        if rank == 1 {
            self.consecutive_top_count += 1;
            self.consecutive_drop_count = 0;
        } else {
            self.consecutive_drop_count += 1;
            self.consecutive_top_count = 0;
        }
        self.last_rank = rank;
        self.updated_at = Timestamp::now();
    }

    /// Folds into an existing state, or starts a new one.
    pub fn observe(
        existing: Option<RankingState>,
        user_id: &UserId,
        profile_id: &ProfileId,
        score: f64,
        rank: u32,
    ) -> RankingState {
        match existing {
            Some(mut state) => {
                state.fold(score, rank);
                state
            }
            None => RankingState::first(user_id.clone(), profile_id.clone(), score, rank),
        }
    }
}

/// Picks the strongest state: highest average score, ties broken by the
/// lower (better) last rank.
pub fn best_ranked(states: &[RankingState]) -> Option<&RankingState> {
    states.iter().min_by(|a, b| {
        b.average_score
            .total_cmp(&a.average_score)
            .then(a.last_rank.cmp(&b.last_rank))
    })
}

/// Orders states best-first using the same rule as [`best_ranked`].
pub fn sort_best_first(states: &mut [RankingState]) {
    states.sort_by(|a, b| {
        b.average_score
            .total_cmp(&a.average_score)
            .then(a.last_rank.cmp(&b.last_rank))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn uid() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn pid(s: &str) -> ProfileId {
        ProfileId::new(s).unwrap()
    }

    #[test]
    fn check_observation_rejects_rank_zero_and_nan() {
        assert!(RankingState::check_observation(0.0, 1).is_ok());
        assert!(RankingState::check_observation(0.5, 0).is_err());
        assert!(RankingState::check_observation(f64::NAN, 1).is_err());
        assert!(RankingState::check_observation(-0.1, 2).is_err());
    }

    #[test]
    fn first_top_rank_starts_top_run() {
        let state = RankingState::first(uid(), pid("P1"), 0.4, 1);
        assert_eq!(state.observation_count, 1);
        assert_eq!(state.cumulative_score, 0.4);
        assert_eq!(state.average_score, 0.4);
        assert_eq!(state.max_score, 0.4);
        assert_eq!(state.consecutive_top_count, 1);
        assert_eq!(state.consecutive_drop_count, 0);
    }

    #[test]
    fn first_lower_rank_does_not_count_as_drop() {
        let state = RankingState::first(uid(), pid("P2"), 0.1, 3);
        assert_eq!(state.consecutive_top_count, 0);
        assert_eq!(state.consecutive_drop_count, 0);
        assert_eq!(state.last_rank, 3);
    }

    #[test]
    fn fold_updates_average_and_max() {
        let mut state = RankingState::first(uid(), pid("P1"), 0.4, 1);
        state.fold(0.8, 1);
        state.fold(0.3, 2);
        assert_eq!(state.observation_count, 3);
        assert!((state.cumulative_score - 1.5).abs() < 1e-12);
        assert!((state.average_score - 0.5).abs() < 1e-12);
        assert_eq!(state.max_score, 0.8);
        assert_eq!(state.last_rank, 2);
    }

    #[test]
    fn losing_top_rank_resets_top_run() {
        let mut state = RankingState::first(uid(), pid("P1"), 0.5, 1);
        state.fold(0.5, 1);
        assert_eq!(state.consecutive_top_count, 2);
        state.fold(0.2, 2);
        assert_eq!(state.consecutive_top_count, 0);
        assert_eq!(state.consecutive_drop_count, 1);
        state.fold(0.6, 1);
        assert_eq!(state.consecutive_top_count, 1);
        assert_eq!(state.consecutive_drop_count, 0);
    }

    #[test]
    fn observe_creates_then_folds() {
        let state = RankingState::observe(None, &uid(), &pid("P1"), 0.2, 2);
        let state = RankingState::observe(Some(state), &uid(), &pid("P1"), 0.4, 2);
        assert_eq!(state.observation_count, 2);
        assert_eq!(state.consecutive_drop_count, 1);
    }

    #[test]
    fn best_ranked_prefers_average_then_rank() {
        let mut a = RankingState::first(uid(), pid("A"), 0.5, 2);
        let b = RankingState::first(uid(), pid("B"), 0.5, 1);
        let c = RankingState::first(uid(), pid("C"), 0.3, 3);
        assert_eq!(best_ranked(&[a.clone(), b.clone(), c.clone()]).unwrap().profile_id, pid("B"));

        a.fold(0.9, 1);
        let mut states = vec![c, b, a];
        sort_best_first(&mut states);
        let order: Vec<_> = states.iter().map(|s| s.profile_id.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
    }

    #[test]
    fn best_ranked_of_nothing_is_none() {
        assert!(best_ranked(&[]).is_none());
    }

    proptest! {
        #[test]
        fn cumulative_is_exact_sum_and_counters_exclusive(
            observations in proptest::collection::vec((0.0f64..=1.0, 1u32..=5), 1..40)
        ) {
            let (first_score, first_rank) = observations[0];
            let mut state = RankingState::first(uid(), pid("P1"), first_score, first_rank);
            for (score, rank) in observations.iter().skip(1) {
                state.fold(*score, *rank);
                prop_assert!(state.consecutive_top_count == 0 || state.consecutive_drop_count == 0);
            }
            let sum: f64 = observations.iter().map(|(s, _)| s).sum();
            let max = observations.iter().map(|(s, _)| *s).fold(f64::MIN, f64::max);
            prop_assert_eq!(state.observation_count as usize, observations.len());
            prop_assert!((state.cumulative_score - sum).abs() < 1e-9);
            prop_assert_eq!(state.max_score, max);
            prop_assert!((state.average_score - sum / observations.len() as f64).abs() < 1e-9);
        }
    }
}
