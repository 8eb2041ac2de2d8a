//! Assignment policy configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::assignment::AssignmentPolicy;

/// Commitment thresholds and the optional catalog and account seeds.
///
/// Every field defaults to the built-in [`AssignmentPolicy`].
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentConfig {
    #[serde(default = "defaults::min_prompts_cold_start")]
    pub min_prompts_cold_start: u32,

    #[serde(default = "defaults::cold_start_threshold")]
    pub cold_start_threshold: f64,

    #[serde(default = "defaults::cold_start_min_top_count")]
    pub cold_start_min_top_count: u32,

    #[serde(default = "defaults::fallback_threshold")]
    pub fallback_threshold: f64,

    #[serde(default = "defaults::fallback_min_top_count")]
    pub fallback_min_top_count: u32,

    #[serde(default = "defaults::high_confidence_threshold")]
    pub high_confidence_threshold: f64,

    #[serde(default = "defaults::bootstrap_window")]
    pub bootstrap_window: u32,

    /// YAML catalog used instead of the database tables
    pub catalog_seed_path: Option<String>,

    /// YAML account list loaded into the in-memory account store
    pub account_seed_path: Option<String>,
}

impl AssignmentConfig {
    pub fn policy(&self) -> AssignmentPolicy {
        AssignmentPolicy {
            min_prompts_cold_start: self.min_prompts_cold_start,
            cold_start_threshold: self.cold_start_threshold,
            cold_start_min_top_count: self.cold_start_min_top_count,
            fallback_threshold: self.fallback_threshold,
            fallback_min_top_count: self.fallback_min_top_count,
            high_confidence_threshold: self.high_confidence_threshold,
            bootstrap_window: self.bootstrap_window,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("cold_start_threshold", self.cold_start_threshold),
            ("fallback_threshold", self.fallback_threshold),
            ("high_confidence_threshold", self.high_confidence_threshold),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::InvalidThreshold { name, value });
            }
        }
        for (name, value) in [
            ("assignment.min_prompts_cold_start", self.min_prompts_cold_start),
            ("assignment.cold_start_min_top_count", self.cold_start_min_top_count),
            ("assignment.fallback_min_top_count", self.fallback_min_top_count),
            ("assignment.bootstrap_window", self.bootstrap_window),
        ] {
            if value == 0 {
                return Err(ValidationError::MustBePositive(name));
            }
        }
        Ok(())
    }
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        let policy = AssignmentPolicy::default();
        Self {
            min_prompts_cold_start: policy.min_prompts_cold_start,
            cold_start_threshold: policy.cold_start_threshold,
            cold_start_min_top_count: policy.cold_start_min_top_count,
            fallback_threshold: policy.fallback_threshold,
            fallback_min_top_count: policy.fallback_min_top_count,
            high_confidence_threshold: policy.high_confidence_threshold,
            bootstrap_window: policy.bootstrap_window,
            catalog_seed_path: None,
            account_seed_path: None,
        }
    }
}

mod defaults {
    use crate::domain::assignment::AssignmentPolicy;

    pub fn min_prompts_cold_start() -> u32 {
        AssignmentPolicy::default().min_prompts_cold_start
    }

    pub fn cold_start_threshold() -> f64 {
        AssignmentPolicy::default().cold_start_threshold
    }

    pub fn cold_start_min_top_count() -> u32 {
        AssignmentPolicy::default().cold_start_min_top_count
    }

    pub fn fallback_threshold() -> f64 {
        AssignmentPolicy::default().fallback_threshold
    }

    pub fn fallback_min_top_count() -> u32 {
        AssignmentPolicy::default().fallback_min_top_count
    }

    pub fn high_confidence_threshold() -> f64 {
        AssignmentPolicy::default().high_confidence_threshold
    }

    pub fn bootstrap_window() -> u32 {
        AssignmentPolicy::default().bootstrap_window
    }
}
