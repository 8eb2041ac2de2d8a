//! HandleDriftEventHandler - turns one inbound drift event into a
//! drift-fallback assignment over the user's recent behavior window.
//!
//! The handler never acknowledges anything itself. It reports an outcome or
//! a [`DriftHandlingError`]; the consumer acks everything except retryable
//! errors.

use std::sync::Arc;

use super::super::assignment::{
    AssignProfileCommand, AssignProfileHandler, AssignmentOutcome, BehaviorInput,
};
use crate::domain::assignment::{AssignmentError, DriftEvent, DriftSeverity, ProfileMode};
use crate::domain::foundation::{ErrorCode, UserId};
use crate::ports::{BehaviorSourceError, RecentBehaviorSource};

/// Command carrying one raw stream entry.
#[derive(Debug, Clone)]
pub struct HandleDriftEventCommand {
    pub entry_id: String,
    /// Value of the entry's `payload` field, if present.
    pub payload: Option<String>,
}

/// Why an event was accepted without running an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Severity below MODERATE.
    NotActionable(DriftSeverity),
    /// The upstream returned an empty window.
    NoRecentBehavior,
}

/// Successful handling of a drift event.
#[derive(Debug, Clone, PartialEq)]
pub enum DriftOutcome {
    Skipped { user_id: UserId, reason: SkipReason },
    Processed { user_id: UserId, outcome: AssignmentOutcome },
}

/// Errors from drift handling.
#[derive(Debug, Clone, PartialEq)]
pub enum DriftHandlingError {
    /// Payload missing, not JSON, missing a user id, or with an unknown severity.
    MalformedEvent(String),

    /// Fetching the recent window failed.
    Upstream(BehaviorSourceError),

    /// The orchestrator rejected or failed the batch.
    Assignment(AssignmentError),
}

impl DriftHandlingError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        DriftHandlingError::MalformedEvent(reason.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            DriftHandlingError::MalformedEvent(_) => ErrorCode::InvalidFormat,
            DriftHandlingError::Upstream(err) => err.code(),
            DriftHandlingError::Assignment(err) => err.code(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            DriftHandlingError::MalformedEvent(reason) => format!("Malformed drift event: {}", reason),
            DriftHandlingError::Upstream(err) => err.to_string(),
            DriftHandlingError::Assignment(err) => err.message(),
        }
    }

    /// Retryable errors leave the entry unacknowledged for redelivery.
    ///
    /// A mode mismatch counts as retryable here: the detector that emits the
    /// event also flips the account mode, and that write may land after the
    /// event is read.
    pub fn is_retryable(&self) -> bool {
        match self {
            DriftHandlingError::MalformedEvent(_) => false,
            DriftHandlingError::Upstream(err) => err.is_retryable(),
            DriftHandlingError::Assignment(AssignmentError::ModeMismatch { .. }) => true,
            DriftHandlingError::Assignment(err) => err.is_retryable(),
        }
    }
}

impl std::fmt::Display for DriftHandlingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for DriftHandlingError {}

impl From<BehaviorSourceError> for DriftHandlingError {
    fn from(err: BehaviorSourceError) -> Self {
        DriftHandlingError::Upstream(err)
    }
}

impl From<AssignmentError> for DriftHandlingError {
    fn from(err: AssignmentError) -> Self {
        DriftHandlingError::Assignment(err)
    }
}

/// Handler for inbound drift events.
pub struct HandleDriftEventHandler {
    behaviors: Arc<dyn RecentBehaviorSource>,
    assigner: Arc<AssignProfileHandler>,
    recent_limit: u32,
}

impl HandleDriftEventHandler {
    pub fn new(
        behaviors: Arc<dyn RecentBehaviorSource>,
        assigner: Arc<AssignProfileHandler>,
        recent_limit: u32,
    ) -> Self {
        Self {
            behaviors,
            assigner,
            recent_limit,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleDriftEventCommand,
    ) -> Result<DriftOutcome, DriftHandlingError> {
        // 1. Parse
        let payload = cmd
            .payload
            .as_deref()
            .ok_or_else(|| DriftHandlingError::malformed("entry has no payload field"))?;
        let event =
            DriftEvent::parse(payload).map_err(|e| DriftHandlingError::malformed(e.to_string()))?;

        // 2. Severity gate
        if !event.severity.is_actionable() {
            tracing::debug!(
                "Skipping drift event {} ({:?}): severity {} not actionable",
                cmd.entry_id,
                event.drift_event_id,
                event.severity
            );
            return Ok(DriftOutcome::Skipped {
                user_id: event.user_id,
                reason: SkipReason::NotActionable(event.severity),
            });
        }

        tracing::info!(
            entry_id = %cmd.entry_id,
            user_id = %event.user_id,
            severity = %event.severity,
            drift_event_id = ?event.drift_event_id,
            "Processing drift event"
        );

        // 3. Recent window
        let recent = self
            .behaviors
            .fetch_recent(&event.user_id, self.recent_limit)
            .await?;
        if recent.is_empty() {
            tracing::warn!(
                "No recent behaviors found for user {}, skipping drift fallback",
                event.user_id
            );
            return Ok(DriftOutcome::Skipped {
                user_id: event.user_id,
                reason: SkipReason::NoRecentBehavior,
            });
        }

        // 4. Drift-fallback assignment over the whole window
        let outcome = self
            .assigner
            .handle(AssignProfileCommand {
                user_id: event.user_id.clone(),
                requested_mode: Some(ProfileMode::DriftFallback),
                behavior: BehaviorInput::Batch(recent),
                trigger_event_id: event.drift_event_id.clone(),
            })
            .await?;

        tracing::info!(
            user_id = %event.user_id,
            status = %outcome.status,
            profile_id = ?outcome.assigned_profile_id.as_ref().map(|p| p.as_str()),
            "Drift fallback result"
        );

        Ok(DriftOutcome::Processed {
            user_id: event.user_id,
            outcome,
        })
    }
}
