//! Debounced, idle-aware save scheduler.
//!
//! Many "please persist" requests are coalesced into few writes. A delayed
//! save goes through two stages: a timer that enforces the minimum interval
//! since the last write, then an idle-slot wait so the write does not compete
//! with foreground work. The interval depends on whether the user is idle.
//!
//! State lives behind a `parking_lot::Mutex` that is never held across an
//! `.await`. Spawned continuations carry the generation they were armed with
//! and bail out if a `cancel()` (or any re-arm) happened while they slept.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, oneshot};
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::SaverConfig;
use crate::core::stats::SaverCounters;
use crate::core::{
    DurableWriter, FilterContext, IdleObserver, IdleService, IdleSignal, IdleSlot,
    IdleSubscription, SaveEnvironment, SaverError, SaverStats, Snapshot, SnapshotFilter,
    StateProducer,
};
use crate::runtime::TokioSpawner;

/// Topic name of the write-complete notification.
pub const WRITE_COMPLETE_TOPIC: &str = "persistence-write-complete";

const WRITE_COMPLETE_CAPACITY: usize = 16;

/// Broadcast after every successful write. Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteComplete;

/// Result of a single save attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The snapshot was written.
    Written,
    /// Persistence is disabled; nothing was collected or written.
    Skipped,
    /// Collection or writing failed. The next save will try again.
    Failed(String),
}

/// Future returned by [`SaveScheduler::save_now`].
pub type SaveFuture = Pin<Box<dyn Future<Output = SaveOutcome> + Send + 'static>>;

/// Delay before a delayed save may run.
///
/// `max(last_save + interval - now, min_delay, 0)`; a scheduler that never
/// saved only waits `min_delay`.
#[must_use]
pub fn compute_delay(
    last_save: Option<Instant>,
    interval: Duration,
    now: Instant,
    min_delay: Duration,
) -> Duration {
    let until_allowed = last_save.map_or(Duration::ZERO, |last| {
        (last + interval).saturating_duration_since(now)
    });
    until_allowed.max(min_delay)
}

struct SchedulerState {
    pending_timer: Option<AbortHandle>,
    pending_idle: Option<AbortHandle>,
    generation: u64,
    last_save: Option<Instant>,
    is_idle: bool,
    was_idle_at_schedule: bool,
    config: SaverConfig,
    idle_service: Option<Arc<dyn IdleService>>,
    subscription: Option<IdleSubscription>,
}

impl SchedulerState {
    fn cancel_pending(&mut self) {
        if let Some(timer) = self.pending_timer.take() {
            timer.abort();
        }
        if let Some(idle) = self.pending_idle.take() {
            idle.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    const fn is_pending(&self) -> bool {
        self.pending_timer.is_some() || self.pending_idle.is_some()
    }
}

struct Shared<S, P, W> {
    state: Mutex<SchedulerState>,
    producer: P,
    writer: W,
    filters: Vec<Box<dyn SnapshotFilter<S>>>,
    environment: Arc<dyn SaveEnvironment>,
    idle_slot: Arc<dyn IdleSlot>,
    spawner: TokioSpawner,
    counters: SaverCounters,
    write_complete: broadcast::Sender<WriteComplete>,
}

/// Components a scheduler is assembled from.
///
/// Usually filled in by [`crate::builders::SaverBuilder`].
pub struct SchedulerParts<S, P, W> {
    /// Timing configuration.
    pub config: SaverConfig,
    /// Source of snapshots.
    pub producer: P,
    /// Destination of snapshots.
    pub writer: W,
    /// Filters applied to every snapshot, in order.
    pub filters: Vec<Box<dyn SnapshotFilter<S>>>,
    /// Run phase and no-persistence flag.
    pub environment: Arc<dyn SaveEnvironment>,
    /// Hook awaited between timer expiry and the write.
    pub idle_slot: Arc<dyn IdleSlot>,
    /// Runtime used for timer tasks.
    pub spawner: TokioSpawner,
}

/// Coalescing, rate-limited save scheduler.
///
/// Cloning is cheap and yields another handle to the same scheduler.
///
/// # Example
///
/// ```rust,ignore
/// let scheduler = SaverBuilder::new(SaverConfig::default())
///     .build(producer, AtomicFileWriter::new("session.json"))?;
///
/// scheduler.save_delayed_default(); // coalesced, rate limited
/// scheduler.save_now().await;       // forced
/// ```
pub struct SaveScheduler<S, P, W> {
    shared: Arc<Shared<S, P, W>>,
}

impl<S, P, W> Clone for SaveScheduler<S, P, W> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S, P, W> SaveScheduler<S, P, W>
where
    S: Snapshot,
    P: StateProducer<S>,
    W: DurableWriter<S>,
{
    /// Assemble a scheduler. Fails if the configuration is invalid.
    pub fn from_parts(parts: SchedulerParts<S, P, W>) -> Result<Self, SaverError> {
        parts.config.validate().map_err(SaverError::InvalidConfig)?;
        let (write_complete, _) = broadcast::channel(WRITE_COMPLETE_CAPACITY);
        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SchedulerState {
                    pending_timer: None,
                    pending_idle: None,
                    generation: 0,
                    last_save: None,
                    is_idle: false,
                    was_idle_at_schedule: false,
                    config: parts.config,
                    idle_service: None,
                    subscription: None,
                }),
                producer: parts.producer,
                writer: parts.writer,
                filters: parts.filters,
                environment: parts.environment,
                idle_slot: parts.idle_slot,
                spawner: parts.spawner,
                counters: SaverCounters::default(),
                write_complete,
            }),
        })
    }

    /// Cancel anything pending, then collect and write right away.
    ///
    /// Collection, filtering and the `last_save` update happen before this
    /// returns, and the write is already running on the scheduler's runtime.
    /// The future only reports its outcome, so dropping it does not cancel
    /// the write. Failures resolve to [`SaveOutcome::Failed`] after being
    /// logged.
    pub fn save_now(&self) -> SaveFuture {
        if !self.shared.environment.run_phase().is_running() {
            debug!("save_now called during shutdown");
        }
        self.save_state(true)
    }

    /// Schedule a save using the configured default minimum delay.
    pub fn save_delayed_default(&self) {
        let min_delay = self.shared.state.lock().config.default_delay();
        self.save_delayed(min_delay);
    }

    /// Schedule a save no sooner than `min_delay` from now.
    ///
    /// Ignored while another save is pending, so the earlier schedule wins.
    pub fn save_delayed(&self, min_delay: Duration) {
        let mut state = self.shared.state.lock();
        if state.is_pending() {
            SaverCounters::bump(&self.shared.counters.coalesced);
            debug!("save already pending, request coalesced");
            return;
        }
        self.arm_locked(&mut state, min_delay);
    }

    /// Cancel the pending timer and idle wait, if any.
    ///
    /// A write that already started is not interrupted.
    pub fn cancel(&self) {
        self.shared.state.lock().cancel_pending();
    }

    /// Record that state was persisted now through some other path.
    pub fn mark_saved(&self) {
        self.shared.state.lock().last_save = Some(Instant::now());
    }

    /// Apply an idle/active transition.
    ///
    /// Going active while a save armed during idleness is still waiting on
    /// its timer re-arms it against the active interval.
    pub fn on_idle_state_changed(&self, is_idle: bool) {
        let mut state = self.shared.state.lock();
        state.is_idle = is_idle;
        if is_idle || state.pending_timer.is_none() || !state.was_idle_at_schedule {
            return;
        }
        debug!("user active again, rescheduling save armed while idle");
        state.cancel_pending();
        self.arm_locked(&mut state, Duration::ZERO);
    }

    /// Swap in a new configuration.
    ///
    /// A changed active interval cancels and re-arms at once so it takes
    /// effect; a changed idle threshold replaces the idle subscription. The
    /// new subscription is made before anything else changes, so on error
    /// the previous configuration and subscription stay in place.
    pub fn reconfigure(&self, config: SaverConfig) -> Result<(), SaverError> {
        config.validate().map_err(SaverError::InvalidConfig)?;
        let (previous, service) = {
            let state = self.shared.state.lock();
            (state.config, state.idle_service.clone())
        };
        if previous == config {
            return Ok(());
        }

        let replacement = match service {
            Some(service) if previous.idle_threshold_secs != config.idle_threshold_secs => {
                let observer: Arc<dyn IdleObserver> = Arc::new(self.clone());
                let subscription = service
                    .add_observer(observer, config.idle_threshold())
                    .inspect_err(|e| warn!("idle service refused new threshold: {}", e))?;
                Some((service, subscription))
            }
            _ => None,
        };

        let retired = {
            let mut state = self.shared.state.lock();
            state.config = config;
            replacement.map(|(service, subscription)| {
                (service, state.subscription.replace(subscription), subscription)
            })
        };
        if let Some((service, old, new)) = retired {
            if let Some(old) = old {
                service.remove_observer(&old);
            }
            info!(id = %new.id, threshold = ?new.threshold, "idle subscription replaced");
        }
        info!(?previous, current = ?config, "save scheduler reconfigured");

        if previous.active_interval_ms != config.active_interval_ms {
            self.cancel();
            self.save_delayed(Duration::ZERO);
        }
        Ok(())
    }

    /// Register with an idle service using the configured threshold.
    ///
    /// Any previous registration (with this or another service) is removed
    /// first.
    pub fn attach_idle_service(&self, service: Arc<dyn IdleService>) -> Result<(), SaverError> {
        self.detach_idle_service();
        let threshold = self.shared.state.lock().config.idle_threshold();
        let observer: Arc<dyn IdleObserver> = Arc::new(self.clone());
        let subscription = service.add_observer(observer, threshold)?;
        info!(id = %subscription.id, ?threshold, "subscribed to idle notifications");

        let mut state = self.shared.state.lock();
        state.idle_service = Some(service);
        state.subscription = Some(subscription);
        Ok(())
    }

    /// Drop the idle subscription, if any.
    pub fn detach_idle_service(&self) {
        let (service, subscription) = {
            let mut state = self.shared.state.lock();
            (state.idle_service.take(), state.subscription.take())
        };
        if let (Some(service), Some(subscription)) = (service, subscription) {
            service.remove_observer(&subscription);
            debug!(id = %subscription.id, "unsubscribed from idle notifications");
        }
    }

    /// Cancel pending saves and release the idle subscription.
    ///
    /// The idle service holds a handle to this scheduler, so this also breaks
    /// that reference cycle.
    pub fn shutdown(&self) {
        self.cancel();
        self.detach_idle_service();
    }

    /// Receive a [`WriteComplete`] after every successful write.
    #[must_use]
    pub fn subscribe_write_complete(&self) -> broadcast::Receiver<WriteComplete> {
        self.shared.write_complete.subscribe()
    }

    /// Time of the last write attempt, `None` if there was none yet.
    #[must_use]
    pub fn last_save_time(&self) -> Option<Instant> {
        self.shared.state.lock().last_save
    }

    /// Whether a delayed save is armed or waiting for an idle slot.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.shared.state.lock().is_pending()
    }

    /// Whether the debounce timer is armed.
    #[must_use]
    pub fn is_timer_armed(&self) -> bool {
        self.shared.state.lock().pending_timer.is_some()
    }

    /// Whether the timer fired and the save waits for an idle slot.
    #[must_use]
    pub fn is_waiting_for_idle(&self) -> bool {
        self.shared.state.lock().pending_idle.is_some()
    }

    /// Last idle state reported by the idle service.
    #[must_use]
    pub fn is_user_idle(&self) -> bool {
        self.shared.state.lock().is_idle
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> SaverConfig {
        self.shared.state.lock().config
    }

    /// Current idle registration.
    #[must_use]
    pub fn idle_subscription(&self) -> Option<IdleSubscription> {
        self.shared.state.lock().subscription
    }

    /// Counter snapshot.
    #[must_use]
    pub fn stats(&self) -> SaverStats {
        self.shared.counters.snapshot()
    }

    fn arm_locked(&self, state: &mut SchedulerState, min_delay: Duration) {
        let interval = state.config.interval_for(state.is_idle);
        let delay = compute_delay(state.last_save, interval, Instant::now(), min_delay);
        state.was_idle_at_schedule = state.is_idle;
        state.generation = state.generation.wrapping_add(1);
        let generation = state.generation;

        if self.shared.environment.run_phase().is_running() {
            debug!(?delay, idle = state.is_idle, "save scheduled");
        } else {
            debug!(?delay, "scheduling a save during shutdown");
        }

        let this = self.clone();
        let handle = self.shared.spawner.spawn(async move {
            tokio::time::sleep(delay).await;
            if !this.on_timer_fired(generation) {
                return;
            }
            this.shared.idle_slot.wait_for_idle().await;
            if let Some(save) = this.on_idle_slot(generation) {
                save.await;
            }
        });
        state.pending_timer = Some(handle);
        SaverCounters::bump(&self.shared.counters.scheduled);
    }

    /// Move the task's handle from the timer slot to the idle slot.
    fn on_timer_fired(&self, generation: u64) -> bool {
        let mut state = self.shared.state.lock();
        if state.generation != generation {
            return false;
        }
        match state.pending_timer.take() {
            Some(handle) => {
                state.pending_idle = Some(handle);
                true
            }
            None => false,
        }
    }

    /// Claim the idle handle so a later `cancel()` cannot abort the write.
    fn on_idle_slot(&self, generation: u64) -> Option<SaveFuture> {
        {
            let mut state = self.shared.state.lock();
            if state.generation != generation || state.pending_idle.take().is_none() {
                return None;
            }
        }
        if !self.shared.environment.run_phase().is_running() {
            debug!("idle-slot save running during shutdown");
        }
        Some(self.save_state(false))
    }

    fn save_state(&self, forced: bool) -> SaveFuture {
        self.cancel();
        let shared = &self.shared;

        if shared.environment.persistence_disabled() {
            self.mark_saved();
            SaverCounters::bump(&shared.counters.skipped);
            debug!("persistence disabled, save skipped");
            return Box::pin(async { SaveOutcome::Skipped });
        }

        let phase = shared.environment.run_phase();
        let started = std::time::Instant::now();
        let mut snapshot = match shared.producer.collect(forced) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.mark_saved();
                SaverCounters::bump(&shared.counters.writes_failed);
                error!("state collection failed: {}", e);
                let reason = e.to_string();
                return Box::pin(async move { SaveOutcome::Failed(reason) });
            }
        };
        let ctx = FilterContext { phase, forced };
        for filter in &shared.filters {
            filter.filter(&mut snapshot, &ctx);
        }
        let collect_micros = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        shared
            .counters
            .last_collect_micros
            .store(collect_micros, std::sync::atomic::Ordering::Relaxed);
        debug!(collect_micros, forced, "state collected");

        if !phase.is_running() {
            debug!("writing state during shutdown");
        }
        // Stamp before the write so requests arriving mid-write measure from here.
        self.mark_saved();
        SaverCounters::bump(&shared.counters.writes_started);

        // The write runs on its own task so it happens even if the caller
        // drops the returned future. Nobody keeps its abort handle.
        let (done_tx, done_rx) = oneshot::channel();
        let this = self.clone();
        shared.spawner.spawn(async move {
            let outcome = this.write_snapshot(snapshot).await;
            let _ = done_tx.send(outcome);
        });
        Box::pin(async move {
            done_rx
                .await
                .unwrap_or_else(|_| SaveOutcome::Failed("write task ended without a result".into()))
        })
    }

    async fn write_snapshot(&self, snapshot: S) -> SaveOutcome {
        match self.shared.writer.write(snapshot).await {
            Ok(()) => {
                self.mark_saved();
                SaverCounters::bump(&self.shared.counters.writes_completed);
                if !self.shared.environment.run_phase().is_running() {
                    debug!("{} during shutdown", WRITE_COMPLETE_TOPIC);
                }
                // No receivers is fine.
                let _ = self.shared.write_complete.send(WriteComplete);
                SaveOutcome::Written
            }
            Err(e) => {
                SaverCounters::bump(&self.shared.counters.writes_failed);
                error!("durable write rejected: {}", e);
                SaveOutcome::Failed(e.to_string())
            }
        }
    }
}

impl<S, P, W> IdleObserver for SaveScheduler<S, P, W>
where
    S: Snapshot,
    P: StateProducer<S>,
    W: DurableWriter<S>,
{
    fn observe(&self, topic: &str) -> Result<(), SaverError> {
        let signal: IdleSignal = topic.parse()?;
        self.on_idle_state_changed(signal == IdleSignal::Idle);
        Ok(())
    }
}
