//! Builder assembling a [`SaveScheduler`] from configuration and collaborators.

use std::sync::Arc;

use crate::config::SaverConfig;
use crate::core::{
    DurableWriter, IdleService, IdleSlot, SaveEnvironment, SaveScheduler, SaverError,
    SchedulerParts, Snapshot, SnapshotFilter, StateProducer,
};
use crate::infra::{RunStateCell, YieldIdleSlot};
use crate::runtime::TokioSpawner;

/// Collects optional collaborators and fills in defaults.
///
/// Defaults: a running [`RunStateCell`] with persistence enabled, a
/// [`YieldIdleSlot`], the current tokio runtime, no filters and no idle
/// service.
pub struct SaverBuilder<S> {
    config: SaverConfig,
    filters: Vec<Box<dyn SnapshotFilter<S>>>,
    environment: Option<Arc<dyn SaveEnvironment>>,
    idle_slot: Option<Arc<dyn IdleSlot>>,
    idle_service: Option<Arc<dyn IdleService>>,
    spawner: Option<TokioSpawner>,
}

impl<S> SaverBuilder<S>
where
    S: Snapshot,
{
    /// Start from an explicit configuration.
    #[must_use]
    pub fn new(config: SaverConfig) -> Self {
        Self {
            config,
            filters: Vec::new(),
            environment: None,
            idle_slot: None,
            idle_service: None,
            spawner: None,
        }
    }

    /// Start from `SAVER_*` environment variables (and `.env`).
    pub fn from_env() -> Result<Self, SaverError> {
        SaverConfig::from_env()
            .map(Self::new)
            .map_err(SaverError::InvalidConfig)
    }

    /// Configuration the scheduler will start with.
    #[must_use]
    pub const fn config(&self) -> &SaverConfig {
        &self.config
    }

    /// Append a snapshot filter.
    #[must_use]
    pub fn with_filter(mut self, filter: impl SnapshotFilter<S>) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Use a specific run-phase / persistence environment.
    #[must_use]
    pub fn with_environment(mut self, environment: Arc<dyn SaveEnvironment>) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Use a specific idle slot.
    #[must_use]
    pub fn with_idle_slot(mut self, idle_slot: Arc<dyn IdleSlot>) -> Self {
        self.idle_slot = Some(idle_slot);
        self
    }

    /// Subscribe to an idle service once built.
    #[must_use]
    pub fn with_idle_service(mut self, service: Arc<dyn IdleService>) -> Self {
        self.idle_service = Some(service);
        self
    }

    /// Spawn timer tasks on a specific runtime.
    #[must_use]
    pub fn with_spawner(mut self, spawner: TokioSpawner) -> Self {
        self.spawner = Some(spawner);
        self
    }

    /// Build the scheduler.
    ///
    /// Fails on invalid configuration, when no spawner was given and the
    /// caller is outside a tokio runtime, or when the idle service refuses
    /// the subscription.
    pub fn build<P, W>(self, producer: P, writer: W) -> Result<SaveScheduler<S, P, W>, SaverError>
    where
        P: StateProducer<S>,
        W: DurableWriter<S>,
    {
        let spawner = self
            .spawner
            .or_else(TokioSpawner::try_current)
            .ok_or_else(|| SaverError::Backend("no tokio runtime available".into()))?;

        let scheduler = SaveScheduler::from_parts(SchedulerParts {
            config: self.config,
            producer,
            writer,
            filters: self.filters,
            environment: self
                .environment
                .unwrap_or_else(|| Arc::new(RunStateCell::new())),
            idle_slot: self.idle_slot.unwrap_or_else(|| Arc::new(YieldIdleSlot)),
            spawner,
        })?;

        if let Some(service) = self.idle_service {
            scheduler.attach_idle_service(service)?;
        }
        Ok(scheduler)
    }
}
