//! Tokio runtime spawner implementation.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// Tokio-based spawner that runs timer and idle-wait tasks on a tokio runtime.
///
/// Every spawn returns an [`AbortHandle`]; the scheduler keeps the handle as
/// its "pending timer" and aborts it on cancellation.
#[derive(Clone, Debug)]
pub struct TokioSpawner {
    handle: Handle,
}

impl TokioSpawner {
    /// Create a new `TokioSpawner` from a tokio runtime handle.
    #[must_use]
    pub const fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Spawner bound to the runtime of the calling task.
    ///
    /// Returns `None` when called outside a tokio runtime.
    #[must_use]
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }

    /// Spawn a task and hand back a handle that can abort it.
    pub fn spawn<F>(&self, fut: F) -> AbortHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(fut).abort_handle()
    }
}
