//! Idle services and idle-slot implementations.

pub mod activity;
pub mod manual;
pub mod slot;

pub use activity::ActivityIdleService;
pub use manual::ManualIdleService;
pub use slot::{QuietPeriodIdleSlot, YieldIdleSlot};
