//! Core scheduling abstractions and save bookkeeping.

pub mod collaborators;
pub mod error;
pub mod idle;
pub mod scheduler;
pub mod stats;

pub use collaborators::{
    DurableWriter, FilterContext, RunPhase, SaveEnvironment, Snapshot, SnapshotFilter,
    StateProducer,
};
pub use error::{AppResult, SaverError};
pub use idle::{
    IdleObserver, IdleService, IdleSignal, IdleSlot, IdleSubscription, ACTIVE_TOPIC, IDLE_TOPIC,
};
pub use scheduler::{
    compute_delay, SaveFuture, SaveOutcome, SaveScheduler, SchedulerParts, WriteComplete,
    WRITE_COMPLETE_TOPIC,
};
pub use stats::SaverStats;
