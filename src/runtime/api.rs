//! Serializable status surface for diagnostics endpoints.

use serde::{Deserialize, Serialize};

use crate::config::SaverConfig;
use crate::core::{
    DurableWriter, IdleSubscription, SaveScheduler, SaverStats, Snapshot, StateProducer,
};

/// Point-in-time view of a scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerStatus {
    /// Debounce timer armed.
    pub timer_armed: bool,
    /// Timer fired, waiting for an idle slot.
    pub waiting_for_idle: bool,
    /// Last reported idle state.
    pub user_idle: bool,
    /// Milliseconds since the last write attempt, if any.
    pub since_last_save_ms: Option<u64>,
    /// Active configuration.
    pub config: SaverConfig,
    /// Current idle registration.
    pub subscription: Option<IdleSubscription>,
    /// Counters.
    pub stats: SaverStats,
}

/// Capture a scheduler's status.
pub fn status<S, P, W>(scheduler: &SaveScheduler<S, P, W>) -> SchedulerStatus
where
    S: Snapshot,
    P: StateProducer<S>,
    W: DurableWriter<S>,
{
    SchedulerStatus {
        timer_armed: scheduler.is_timer_armed(),
        waiting_for_idle: scheduler.is_waiting_for_idle(),
        user_idle: scheduler.is_user_idle(),
        since_last_save_ms: scheduler
            .last_save_time()
            .map(|t| u64::try_from(t.elapsed().as_millis()).unwrap_or(u64::MAX)),
        config: scheduler.config(),
        subscription: scheduler.idle_subscription(),
        stats: scheduler.stats(),
    }
}
