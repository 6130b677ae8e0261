//! Idle-slot implementations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::ActivityIdleService;
use crate::core::IdleSlot;

/// Yields to the runtime once so queued tasks run before the write starts.
#[derive(Debug, Clone, Copy, Default)]
pub struct YieldIdleSlot;

#[async_trait]
impl IdleSlot for YieldIdleSlot {
    async fn wait_for_idle(&self) {
        tokio::task::yield_now().await;
    }
}

/// Waits for a lull in user activity, bounded by a timeout.
///
/// Resolves once no activity was recorded for `quiet_period`, or after
/// `timeout` regardless, so a busy user cannot postpone a save forever.
pub struct QuietPeriodIdleSlot {
    activity: Arc<ActivityIdleService>,
    quiet_period: Duration,
    timeout: Duration,
}

impl QuietPeriodIdleSlot {
    /// Create a slot over an activity source.
    #[must_use]
    pub const fn new(
        activity: Arc<ActivityIdleService>,
        quiet_period: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            activity,
            quiet_period,
            timeout,
        }
    }
}

#[async_trait]
impl IdleSlot for QuietPeriodIdleSlot {
    async fn wait_for_idle(&self) {
        let deadline = Instant::now() + self.timeout;
        loop {
            let quiet_until = self.activity.last_activity() + self.quiet_period;
            let now = Instant::now();
            if now >= quiet_until || now >= deadline {
                return;
            }
            tokio::time::sleep_until(quiet_until.min(deadline)).await;
        }
    }
}
