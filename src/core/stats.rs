//! Save counters and their point-in-time snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Statistics about scheduling and write activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaverStats {
    /// Timers armed by `save_delayed`.
    pub scheduled: u64,
    /// `save_delayed` calls ignored because a save was already pending.
    pub coalesced: u64,
    /// Writes handed to the durable writer.
    pub writes_started: u64,
    /// Writes that completed successfully.
    pub writes_completed: u64,
    /// Writes (or collections) that failed.
    pub writes_failed: u64,
    /// Saves skipped because persistence is disabled.
    pub skipped: u64,
    /// Duration of the most recent state collection, in microseconds.
    pub last_collect_micros: u64,
}

/// Internal counters (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct SaverCounters {
    pub scheduled: AtomicU64,
    pub coalesced: AtomicU64,
    pub writes_started: AtomicU64,
    pub writes_completed: AtomicU64,
    pub writes_failed: AtomicU64,
    pub skipped: AtomicU64,
    pub last_collect_micros: AtomicU64,
}

impl SaverCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> SaverStats {
        SaverStats {
            scheduled: self.scheduled.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            writes_started: self.writes_started.load(Ordering::Relaxed),
            writes_completed: self.writes_completed.load(Ordering::Relaxed),
            writes_failed: self.writes_failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            last_collect_micros: self.last_collect_micros.load(Ordering::Relaxed),
        }
    }
}
