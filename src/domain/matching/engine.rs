//! Profile matcher - weighted multi-factor scoring of one observation
//! against the profile catalog.

use serde::Serialize;

use super::observation::BehaviorObservation;
use super::profile::{ProfileDefinition, WeightedAssociation};
use super::weights::{WeightConfiguration, WeightRegime, WeightSet};
use crate::domain::foundation::ProfileId;

/// Score given to the behavior-level component when the observed label is
/// not among the profile's qualifying labels.
pub const BEHAVIOR_LEVEL_MISMATCH_SCORE: f64 = 0.5;

/// Per-factor components behind one profile's raw score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorBreakdown {
    pub intent: f64,
    pub interest: f64,
    pub complexity: f64,
    pub style: f64,
    pub consistency: f64,
    /// `None` when the behavior-level weight is zero and the component was skipped.
    pub behavior_level: Option<f64>,
    pub raw: f64,
}

/// One entry of a ranked match result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileScore {
    pub profile_id: ProfileId,
    /// Normalized score; all scores of one result sum to 1 unless every raw score was 0.
    pub score: f64,
    pub breakdown: FactorBreakdown,
}

/// Ranked, normalized result of matching one observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub ranked: Vec<ProfileScore>,
    pub regime: WeightRegime,
    pub weights_version: String,
}

impl MatchResult {
    /// Top-ranked profile, if the catalog was non-empty.
    pub fn best(&self) -> Option<&ProfileScore> {
        self.ranked.first()
    }

    /// Normalized score of the top-ranked profile, or 0 for an empty catalog.
    pub fn confidence(&self) -> f64 {
        self.best().map(|p| p.score).unwrap_or(0.0)
    }

    /// `(profile_id, score, rank)` triples with 1-based ranks.
    pub fn ranks(&self) -> impl Iterator<Item = (&ProfileId, f64, u32)> {
        self.ranked
            .iter()
            .enumerate()
            .map(|(i, p)| (&p.profile_id, p.score, i as u32 + 1))
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Stateless profile matcher.
pub struct ProfileMatcher;

impl ProfileMatcher {
    /// Scores every profile against the observation and ranks them.
    ///
    /// Raw scores are divided by their sum; when the sum is zero every
    /// normalized score stays zero. Sorting is stable, so ties keep catalog
    /// order.
    pub fn rank(
        profiles: &[ProfileDefinition],
        weights: &WeightConfiguration,
        observation: &BehaviorObservation,
        regime: WeightRegime,
    ) -> MatchResult {
        let active = weights.for_regime(regime);

        let scored: Vec<(ProfileId, FactorBreakdown)> = profiles
            .iter()
            .map(|profile| (profile.id.clone(), Self::score(profile, observation, active)))
            .collect();

        let total: f64 = scored.iter().map(|(_, b)| b.raw).sum();
        let divisor = if total == 0.0 { 1.0 } else { total };

        let mut ranked: Vec<ProfileScore> = scored
            .into_iter()
            .map(|(profile_id, breakdown)| ProfileScore {
                profile_id,
                score: breakdown.raw / divisor,
                breakdown,
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        MatchResult {
            ranked,
            regime,
            weights_version: weights.version().to_string(),
        }
    }

    /// Computes the raw weighted score of a single profile.
    pub fn score(
        profile: &ProfileDefinition,
        observation: &BehaviorObservation,
        weights: &WeightSet,
    ) -> FactorBreakdown {
        let intent = weighted_overlap(&profile.intents, |name| observation.intents.get(name));
        let interest = weighted_overlap(&profile.interests, |name| observation.interests.get(name));
        let style = weighted_overlap(&profile.signals, |name| observation.signals.get(name));
        let complexity = observation.complexity;
        let consistency = observation.consistency;

        let behavior_level = (weights.behavior_level > 0.0).then(|| {
            if profile.qualifies_for_level(&observation.behavior_level) {
                1.0
            } else {
                BEHAVIOR_LEVEL_MISMATCH_SCORE
            }
        });

        let raw = weights.intent * intent
            + weights.interest * interest
            + weights.complexity * complexity
            + weights.style * style
            + weights.consistency * consistency
            + behavior_level.map_or(0.0, |level| weights.behavior_level * level);

        FactorBreakdown {
            intent,
            interest,
            complexity,
            style,
            consistency,
            behavior_level,
            raw,
        }
    }
}

fn weighted_overlap<'a, F>(associations: &[WeightedAssociation], affinity: F) -> f64
where
    F: Fn(&str) -> Option<&'a f64>,
{
    associations
        .iter()
        .map(|a| affinity(&a.name).copied().unwrap_or(0.0) * a.weight)
        .sum()
}
