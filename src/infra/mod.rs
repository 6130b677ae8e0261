//! Infrastructure adapters for writers, idle detection, and environment flags.

pub mod environment;
pub mod idle;
pub mod writer;

pub use environment::RunStateCell;
pub use idle::{ActivityIdleService, ManualIdleService, QuietPeriodIdleSlot, YieldIdleSlot};
pub use writer::{AtomicFileWriter, InMemoryWriter};
