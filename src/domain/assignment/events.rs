//! Inbound drift events and outbound assignment events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::mode::{ConfidenceLevel, ProfileMode};
use crate::domain::foundation::{ProfileId, Timestamp, UserId, ValidationError};

/// Severity reported by the external drift detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriftSeverity {
    Weak,
    Moderate,
    Strong,
}

impl DriftSeverity {
    /// Whether this severity triggers re-evaluation.
    pub fn is_actionable(&self) -> bool {
        matches!(self, DriftSeverity::Moderate | DriftSeverity::Strong)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DriftSeverity::Weak => "WEAK",
            DriftSeverity::Moderate => "MODERATE",
            DriftSeverity::Strong => "STRONG",
        }
    }
}

impl fmt::Display for DriftSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DriftSeverity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WEAK" => Ok(DriftSeverity::Weak),
            "MODERATE" => Ok(DriftSeverity::Moderate),
            "STRONG" => Ok(DriftSeverity::Strong),
            other => Err(ValidationError::invalid_format(
                "severity",
                format!("unknown drift severity '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DriftEventWire {
    #[serde(default)]
    drift_event_id: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    severity: Option<String>,
}

/// A "drift detected" notification for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftEvent {
    pub drift_event_id: Option<String>,
    pub user_id: UserId,
    pub severity: DriftSeverity,
}

impl DriftEvent {
    /// Parses the JSON carried in a stream entry's `payload` field.
    ///
    /// A missing severity is read as WEAK. A missing or blank user id, an
    /// unknown severity, or invalid JSON is a validation error.
    pub fn parse(payload: &str) -> Result<Self, ValidationError> {
        let wire: DriftEventWire = serde_json::from_str(payload)
            .map_err(|e| ValidationError::invalid_format("payload", e.to_string()))?;

        let severity = match wire.severity.as_deref() {
            None => DriftSeverity::Weak,
            Some(s) => s.parse()?,
        };
        let user_id = UserId::new(wire.user_id.unwrap_or_default())?;
        let drift_event_id = wire.drift_event_id.filter(|id| !id.trim().is_empty());

        Ok(Self {
            drift_event_id,
            user_id,
            severity,
        })
    }
}

/// Emitted whenever an assignment call commits a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileAssigned {
    pub user_id: UserId,
    pub assigned_profile_id: ProfileId,
    pub confidence_level: ConfidenceLevel,
    pub mode: ProfileMode,
    pub trigger_event_id: Option<String>,
    pub assigned_at: Timestamp,
}

impl ProfileAssigned {
    /// JSON body placed in the outbound stream entry's `payload` field.
    pub fn to_payload(&self) -> ProfileAssignedPayload {
        ProfileAssignedPayload {
            user_id: self.user_id.to_string(),
            assigned_profile_id: self.assigned_profile_id.to_string(),
            confidence_level: self.confidence_level,
            mode: self.mode,
            trigger_event_id: self.trigger_event_id.clone().unwrap_or_default(),
            assigned_at: self.assigned_at.unix_seconds(),
        }
    }
}

/// Wire form of [`ProfileAssigned`]: absent trigger ids become `""` and the
/// timestamp is Unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileAssignedPayload {
    pub user_id: String,
    pub assigned_profile_id: String,
    pub confidence_level: ConfidenceLevel,
    pub mode: ProfileMode,
    pub trigger_event_id: String,
    pub assigned_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn parses_actionable_event() {
        let event = DriftEvent::parse(
            r#"{"drift_event_id":"drift-evt-1","user_id":"u-1","severity":"STRONG"}"#,
        )
        .unwrap();
        assert_eq!(event.drift_event_id.as_deref(), Some("drift-evt-1"));
        assert_eq!(event.user_id.as_str(), "u-1");
        assert!(event.severity.is_actionable());
    }

    #[test]
    fn missing_severity_is_weak() {
        let event = DriftEvent::parse(r#"{"user_id":"u-1"}"#).unwrap();
        assert_eq!(event.severity, DriftSeverity::Weak);
        assert!(!event.severity.is_actionable());
        assert_eq!(event.drift_event_id, None);
    }

    #[test]
    fn rejects_missing_user_and_bad_json() {
        assert!(DriftEvent::parse(r#"{"severity":"MODERATE"}"#).is_err());
        assert!(DriftEvent::parse("not json").is_err());
        assert!(DriftEvent::parse(r#"{"user_id":"u","severity":"EXTREME"}"#).is_err());
    }

    #[test]
    fn payload_uses_empty_trigger_and_unix_seconds() {
        let event = ProfileAssigned {
            user_id: UserId::new("u-1").unwrap(),
            assigned_profile_id: ProfileId::new("P3").unwrap(),
            confidence_level: ConfidenceLevel::High,
            mode: ProfileMode::ColdStart,
            trigger_event_id: None,
            assigned_at: Timestamp::from_datetime(
                Utc.with_ymd_and_hms(2025, 2, 26, 11, 4, 50).unwrap(),
            ),
        };
        let json = serde_json::to_value(event.to_payload()).unwrap();
        assert_eq!(json["trigger_event_id"], "");
        assert_eq!(json["confidence_level"], "HIGH");
        assert_eq!(json["mode"], "COLD_START");
        assert_eq!(json["assigned_at"], 1_740_567_890);
    }
}
