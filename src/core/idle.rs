//! Idle/active signalling and idle-slot abstractions.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SaverError;

/// Topic delivered when the user becomes idle.
pub const IDLE_TOPIC: &str = "idle";
/// Topic delivered when the user becomes active again.
pub const ACTIVE_TOPIC: &str = "active";

/// User activity signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdleSignal {
    /// No input for at least the subscribed threshold.
    Idle,
    /// Input resumed.
    Active,
}

impl IdleSignal {
    /// Topic string for this signal.
    #[must_use]
    pub const fn topic(self) -> &'static str {
        match self {
            Self::Idle => IDLE_TOPIC,
            Self::Active => ACTIVE_TOPIC,
        }
    }
}

impl fmt::Display for IdleSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.topic())
    }
}

impl FromStr for IdleSignal {
    type Err = SaverError;

    fn from_str(topic: &str) -> Result<Self, Self::Err> {
        match topic {
            IDLE_TOPIC => Ok(Self::Idle),
            ACTIVE_TOPIC => Ok(Self::Active),
            other => Err(SaverError::UnexpectedSignal(other.to_string())),
        }
    }
}

/// Receiver of idle/active notifications.
pub trait IdleObserver: Send + Sync + 'static {
    /// Handle a raw topic. Unknown topics are a contract violation and must
    /// be reported as [`SaverError::UnexpectedSignal`].
    fn observe(&self, topic: &str) -> Result<(), SaverError>;
}

/// A single observer registration with an idle service.
///
/// Registrations are never edited; a threshold change produces a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdleSubscription {
    /// Registration identifier assigned at subscribe time.
    pub id: Uuid,
    /// Inactivity threshold this registration was made with.
    pub threshold: Duration,
}

impl IdleSubscription {
    /// Create a registration value with a fresh identifier.
    #[must_use]
    pub fn new(threshold: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            threshold,
        }
    }
}

/// Host service that reports user idleness.
pub trait IdleService: Send + Sync + 'static {
    /// Register an observer that is told `idle` after `threshold` of
    /// inactivity and `active` when input resumes.
    fn add_observer(
        &self,
        observer: Arc<dyn IdleObserver>,
        threshold: Duration,
    ) -> Result<IdleSubscription, SaverError>;

    /// Drop a registration. Unknown registrations are ignored.
    fn remove_observer(&self, subscription: &IdleSubscription);
}

/// Cooperative "run when idle" hook.
///
/// Called after the debounce timer fires; the write starts once this
/// resolves.
#[async_trait]
pub trait IdleSlot: Send + Sync + 'static {
    /// Resolve at the next opportunity with no higher-priority work pending.
    async fn wait_for_idle(&self);
}
