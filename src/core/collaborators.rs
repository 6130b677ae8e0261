//! Collaborator traits the scheduler delegates to.
//!
//! The scheduler owns timing only. What gets saved, how it is sanitized, and
//! where it ends up are supplied by the embedding application through the
//! traits in this module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::SaverError;

/// Marker trait for snapshot types.
///
/// Snapshots cross task boundaries (collected on the caller's task, written
/// from a spawned one) and are typically serialized by the writer.
pub trait Snapshot: Send + Serialize + 'static {}

/// Blanket implementation: any type meeting the requirements is a Snapshot.
impl<T> Snapshot for T where T: Send + Serialize + 'static {}

/// Produces the state to persist.
///
/// # Example
///
/// ```rust,ignore
/// use prometheus_save_scheduler::core::{SaverError, StateProducer};
///
/// struct Session { tabs: Vec<String> }
///
/// impl StateProducer<Vec<String>> for Session {
///     fn collect(&self, _force_full: bool) -> Result<Vec<String>, SaverError> {
///         Ok(self.tabs.clone())
///     }
/// }
/// ```
pub trait StateProducer<S>: Send + Sync + 'static {
    /// Build a snapshot of the current state.
    ///
    /// `force_full` asks the producer to bypass any caches and recollect
    /// everything; it is set for forced saves.
    fn collect(&self, force_full: bool) -> Result<S, SaverError>;
}

impl<S, F> StateProducer<S> for F
where
    F: Fn(bool) -> Result<S, SaverError> + Send + Sync + 'static,
{
    fn collect(&self, force_full: bool) -> Result<S, SaverError> {
        self(force_full)
    }
}

/// Host lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Normal operation.
    Running,
    /// Shutdown has begun; final saves are expected.
    Closing,
    /// Shutdown finished; any save now is late.
    Closed,
}

impl RunPhase {
    /// Whether the host is in normal operation.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Context handed to snapshot filters.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext {
    /// Lifecycle stage at collection time.
    pub phase: RunPhase,
    /// Whether this save was forced (`save_now`).
    pub forced: bool,
}

/// Sanitizes or trims a snapshot before it is written.
pub trait SnapshotFilter<S>: Send + Sync + 'static {
    /// Mutate the snapshot in place.
    fn filter(&self, snapshot: &mut S, ctx: &FilterContext);
}

impl<S, F> SnapshotFilter<S> for F
where
    F: Fn(&mut S, &FilterContext) + Send + Sync + 'static,
{
    fn filter(&self, snapshot: &mut S, ctx: &FilterContext) {
        self(snapshot, ctx);
    }
}

/// Durably persists snapshots.
///
/// Implementations are expected to replace the previous state atomically
/// (write temp, then rename) and to surface failures as `Err`.
#[async_trait]
pub trait DurableWriter<S>: Send + Sync + 'static
where
    S: Snapshot,
{
    /// Persist the snapshot.
    async fn write(&self, snapshot: S) -> Result<(), SaverError>;
}

/// Environment flags consulted on every save.
pub trait SaveEnvironment: Send + Sync + 'static {
    /// When true nothing is collected or written (e.g. permanent private mode).
    fn persistence_disabled(&self) -> bool;

    /// Current host lifecycle stage.
    fn run_phase(&self) -> RunPhase;
}
