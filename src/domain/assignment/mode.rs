//! Assignment modes, statuses, and confidence levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Operating mode stored on the user's account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileMode {
    /// Evidence-scarce initial phase.
    ColdStart,
    /// Predefined and dynamic profiles both in use; not handled here.
    Hybrid,
    /// Dynamic profiles only; not handled here.
    DynamicOnly,
    /// Re-evaluation after an external drift detector fired.
    DriftFallback,
}

impl ProfileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileMode::ColdStart => "COLD_START",
            ProfileMode::Hybrid => "HYBRID",
            ProfileMode::DynamicOnly => "DYNAMIC_ONLY",
            ProfileMode::DriftFallback => "DRIFT_FALLBACK",
        }
    }

    /// Whether predefined-profile assignment runs in this mode.
    pub fn is_assignable(&self) -> bool {
        matches!(self, ProfileMode::ColdStart | ProfileMode::DriftFallback)
    }
}

impl fmt::Display for ProfileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProfileMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COLD_START" => Ok(ProfileMode::ColdStart),
            "HYBRID" => Ok(ProfileMode::Hybrid),
            "DYNAMIC_ONLY" => Ok(ProfileMode::DynamicOnly),
            "DRIFT_FALLBACK" => Ok(ProfileMode::DriftFallback),
            other => Err(ValidationError::invalid_format(
                "mode",
                format!("unknown profile mode '{}'", other),
            )),
        }
    }
}

/// Outcome status of an assignment call or status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Assigned,
    Pending,
    NotFound,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "ASSIGNED",
            AssignmentStatus::Pending => "PENDING",
            AssignmentStatus::NotFound => "NOT_FOUND",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Confidence attached to an assignment outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    None,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "HIGH",
            ConfidenceLevel::Medium => "MEDIUM",
            ConfidenceLevel::Low => "LOW",
            ConfidenceLevel::None => "NONE",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_round_trip_through_strings() {
        for mode in [
            ProfileMode::ColdStart,
            ProfileMode::Hybrid,
            ProfileMode::DynamicOnly,
            ProfileMode::DriftFallback,
        ] {
            assert_eq!(mode.as_str().parse::<ProfileMode>().unwrap(), mode);
        }
    }

    #[test]
    fn mode_parsing_is_case_insensitive() {
        assert_eq!("cold_start".parse::<ProfileMode>().unwrap(), ProfileMode::ColdStart);
        assert!("WARM".parse::<ProfileMode>().is_err());
    }

    #[test]
    fn only_cold_start_and_fallback_are_assignable() {
        assert!(ProfileMode::ColdStart.is_assignable());
        assert!(ProfileMode::DriftFallback.is_assignable());
        assert!(!ProfileMode::Hybrid.is_assignable());
        assert!(!ProfileMode::DynamicOnly.is_assignable());
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&ProfileMode::DriftFallback).unwrap(),
            "\"DRIFT_FALLBACK\""
        );
        assert_eq!(
            serde_json::to_string(&AssignmentStatus::NotFound).unwrap(),
            "\"NOT_FOUND\""
        );
        assert_eq!(serde_json::to_string(&ConfidenceLevel::None).unwrap(), "\"NONE\"");
    }
}
