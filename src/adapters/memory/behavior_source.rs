//! In-memory recent-behavior source.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::domain::foundation::UserId;
use crate::domain::matching::BehaviorObservation;
use crate::ports::{BehaviorSourceError, RecentBehaviorSource};

/// Serves canned observations per user, or a canned failure.
///
/// # Panics
///
/// Methods panic if an internal lock is poisoned.
pub struct InMemoryBehaviorSource {
    behaviors: RwLock<HashMap<UserId, Vec<BehaviorObservation>>>,
    failure: RwLock<Option<BehaviorSourceError>>,
    calls: AtomicUsize,
}

impl InMemoryBehaviorSource {
    pub fn new() -> Self {
        Self {
            behaviors: RwLock::new(HashMap::new()),
            failure: RwLock::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_recent(&self, user_id: UserId, observations: Vec<BehaviorObservation>) {
        self.behaviors
            .write()
            .expect("InMemoryBehaviorSource: lock poisoned")
            .insert(user_id, observations);
    }

    // === Test Helpers ===

    /// Makes every fetch fail with `error` until cleared with `None`.
    pub fn set_failure(&self, error: Option<BehaviorSourceError>) {
        *self
            .failure
            .write()
            .expect("InMemoryBehaviorSource: lock poisoned") = error;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryBehaviorSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecentBehaviorSource for InMemoryBehaviorSource {
    async fn fetch_recent(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<BehaviorObservation>, BehaviorSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self
            .failure
            .read()
            .expect("InMemoryBehaviorSource: lock poisoned")
            .clone()
        {
            return Err(err);
        }
        let behaviors = self
            .behaviors
            .read()
            .expect("InMemoryBehaviorSource: lock poisoned");
        let recent = behaviors.get(user_id).cloned().unwrap_or_default();
        let skip = recent.len().saturating_sub(limit as usize);
        Ok(recent.into_iter().skip(skip).collect())
    }
}
