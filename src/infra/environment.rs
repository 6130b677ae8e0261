//! Shared run-phase and persistence flags.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::core::{RunPhase, SaveEnvironment};

const PHASE_RUNNING: u8 = 0;
const PHASE_CLOSING: u8 = 1;
const PHASE_CLOSED: u8 = 2;

/// Lock-free holder for the host lifecycle phase and the no-persistence flag.
///
/// Keep an `Arc<RunStateCell>` in the lifecycle manager and hand a clone to
/// the scheduler as its [`SaveEnvironment`].
#[derive(Debug)]
pub struct RunStateCell {
    phase: AtomicU8,
    persistence_disabled: AtomicBool,
}

impl Default for RunStateCell {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStateCell {
    /// Running, with persistence enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: AtomicU8::new(PHASE_RUNNING),
            persistence_disabled: AtomicBool::new(false),
        }
    }

    /// Running, with persistence disabled from the start.
    #[must_use]
    pub const fn without_persistence() -> Self {
        Self {
            phase: AtomicU8::new(PHASE_RUNNING),
            persistence_disabled: AtomicBool::new(true),
        }
    }

    /// Turn the no-persistence mode on or off.
    pub fn set_persistence_disabled(&self, disabled: bool) {
        self.persistence_disabled.store(disabled, Ordering::Release);
    }

    /// Move to a new lifecycle phase.
    pub fn set_phase(&self, phase: RunPhase) {
        let raw = match phase {
            RunPhase::Running => PHASE_RUNNING,
            RunPhase::Closing => PHASE_CLOSING,
            RunPhase::Closed => PHASE_CLOSED,
        };
        self.phase.store(raw, Ordering::Release);
    }
}

impl SaveEnvironment for RunStateCell {
    fn persistence_disabled(&self) -> bool {
        self.persistence_disabled.load(Ordering::Acquire)
    }

    fn run_phase(&self) -> RunPhase {
        match self.phase.load(Ordering::Acquire) {
            PHASE_RUNNING => RunPhase::Running,
            PHASE_CLOSING => RunPhase::Closing,
            _ => RunPhase::Closed,
        }
    }
}
