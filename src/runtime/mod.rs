//! Runtime adapters and status surface.

pub mod api;
pub mod tokio_spawner;

pub use api::{status, SchedulerStatus};
pub use tokio_spawner::TokioSpawner;
