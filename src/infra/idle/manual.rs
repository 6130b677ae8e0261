//! Idle service driven by explicit calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::core::{IdleObserver, IdleService, IdleSignal, IdleSubscription, SaverError};

struct Registration {
    observer: Arc<dyn IdleObserver>,
    subscription: IdleSubscription,
}

/// Idle service whose signals are pushed by the embedder (or a test).
///
/// Useful when the host already has its own notion of idleness and only
/// needs to forward it.
#[derive(Default)]
pub struct ManualIdleService {
    registrations: Mutex<HashMap<Uuid, Registration>>,
}

impl ManualIdleService {
    /// Create a service with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a typed signal to every observer.
    pub fn signal(&self, signal: IdleSignal) -> Result<(), SaverError> {
        self.notify(signal.topic())
    }

    /// Deliver a raw topic to every observer.
    ///
    /// Stops at and returns the first observer error.
    pub fn notify(&self, topic: &str) -> Result<(), SaverError> {
        let observers: Vec<Arc<dyn IdleObserver>> = self
            .registrations
            .lock()
            .values()
            .map(|r| Arc::clone(&r.observer))
            .collect();
        for observer in observers {
            observer.observe(topic)?;
        }
        Ok(())
    }

    /// Live registrations.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<IdleSubscription> {
        self.registrations
            .lock()
            .values()
            .map(|r| r.subscription)
            .collect()
    }

    /// Number of live registrations.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.registrations.lock().len()
    }
}

impl IdleService for ManualIdleService {
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
            },
        );
        Ok(subscription)
    }

    fn remove_observer(&self, subscription: &IdleSubscription) {
        self.registrations.lock().remove(&subscription.id);
    }
}
