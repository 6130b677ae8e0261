//! Idle service that derives idleness from activity pings.
//!
//! The host calls [`ActivityIdleService::record_activity`] on user input. A
//! monitor task compares the time since the last ping against each
//! registration's threshold and reports `idle` once it is exceeded; the next
//! ping reports `active` to every registration that was idle.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error};
use uuid::Uuid;

use crate::core::{IdleObserver, IdleService, IdleSignal, IdleSubscription, SaverError};

struct Registration {
    observer: Arc<dyn IdleObserver>,
    subscription: IdleSubscription,
    idle: bool,
}

/// Activity-tracking idle service.
pub struct ActivityIdleService {
    last_activity: Mutex<Instant>,
    registrations: Mutex<HashMap<Uuid, Registration>>,
    poll_interval: Duration,
}

impl ActivityIdleService {
    /// Create a service that checks thresholds every `poll_interval`.
    #[must_use]
    pub fn new(poll_interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            last_activity: Mutex::new(Instant::now()),
            registrations: Mutex::new(HashMap::new()),
            poll_interval,
        })
    }

    /// Time of the most recent activity ping.
    #[must_use]
    pub fn last_activity(&self) -> Instant {
        *self.last_activity.lock()
    }

    /// Time since the most recent activity ping.
    #[must_use]
    pub fn idle_duration(&self) -> Duration {
        self.last_activity().elapsed()
    }

    /// Note user activity; registrations that were idle are told `active`.
    pub fn record_activity(&self) {
        *self.last_activity.lock() = Instant::now();
        let woken: Vec<Arc<dyn IdleObserver>> = self
            .registrations
            .lock()
            .values_mut()
            .filter(|r| r.idle)
            .map(|r| {
                r.idle = false;
                Arc::clone(&r.observer)
            })
            .collect();
        Self::deliver(&woken, IdleSignal::Active);
    }

    /// Report `idle` to registrations whose threshold has been exceeded.
    ///
    /// The monitor task calls this every poll interval.
    pub fn check_thresholds(&self) {
        let quiet_for = self.idle_duration();
        let sleeping: Vec<Arc<dyn IdleObserver>> = self
            .registrations
            .lock()
            .values_mut()
            .filter(|r| !r.idle && quiet_for >= r.subscription.threshold)
            .map(|r| {
                r.idle = true;
                Arc::clone(&r.observer)
            })
            .collect();
        Self::deliver(&sleeping, IdleSignal::Idle);
    }

    /// Spawn the threshold monitor on the current runtime.
    ///
    /// The task stops on its own once the service is dropped.
    pub fn spawn_monitor(self: &Arc<Self>) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        let period = self.poll_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(service) = weak.upgrade() else {
                    debug!("idle monitor stopping, service dropped");
                    break;
                };
                service.check_thresholds();
            }
        })
    }

    fn deliver(observers: &[Arc<dyn IdleObserver>], signal: IdleSignal) {
        for observer in observers {
            if let Err(e) = observer.observe(signal.topic()) {
                error!("idle observer rejected `{}`: {}", signal, e);
            }
        }
    }
}

impl IdleService for ActivityIdleService {
    fn add_observer(
        &self,
        observer: Arc<dyn IdleObserver>,
        threshold: Duration,
    ) -> Result<IdleSubscription, SaverError> {
        if threshold.is_zero() {
            return Err(SaverError::InvalidConfig(
                "idle threshold must be greater than 0".into(),
            ));
        }
        let subscription = IdleSubscription::new(threshold);
        self.registrations.lock().insert(
            subscription.id,
            Registration {
                observer,
                subscription,
                idle: false,
            },
        );
        debug!(id = %subscription.id, ?threshold, "idle observer added");
        Ok(subscription)
    }

    fn remove_observer(&self, subscription: &IdleSubscription) {
        self.registrations.lock().remove(&subscription.id);
    }
}
