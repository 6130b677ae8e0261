//! In-memory writer backend.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::{DurableWriter, SaverError, Snapshot};

struct Inner<S> {
    snapshots: Mutex<Vec<S>>,
    attempts: AtomicU64,
    fail: AtomicBool,
    latency: Mutex<Duration>,
}

/// Writer that keeps every snapshot in memory, for development and testing.
///
/// Clones share storage, so a test can keep one handle and move another into
/// the scheduler.
pub struct InMemoryWriter<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for InMemoryWriter<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Default for InMemoryWriter<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> InMemoryWriter<S> {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                snapshots: Mutex::new(Vec::new()),
                attempts: AtomicU64::new(0),
                fail: AtomicBool::new(false),
                latency: Mutex::new(Duration::ZERO),
            }),
        }
    }

    /// Simulate a slow disk: every write sleeps this long before completing.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.inner.latency.lock() = latency;
        self
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.inner.fail.store(fail, Ordering::Release);
    }

    /// Number of write calls, successful or not.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.inner.attempts.load(Ordering::Acquire)
    }

    /// Number of stored snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.snapshots.lock().len()
    }

    /// Whether nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.snapshots.lock().is_empty()
    }

    /// Copy of every stored snapshot, oldest first.
    #[must_use]
    pub fn snapshots(&self) -> Vec<S>
    where
        S: Clone,
    {
        self.inner.snapshots.lock().clone()
    }

    /// Most recently stored snapshot.
    #[must_use]
    pub fn last(&self) -> Option<S>
    where
        S: Clone,
    {
        self.inner.snapshots.lock().last().cloned()
    }
}

#[async_trait]
impl<S> DurableWriter<S> for InMemoryWriter<S>
where
    S: Snapshot,
{
    async fn write(&self, snapshot: S) -> Result<(), SaverError> {
        self.inner.attempts.fetch_add(1, Ordering::AcqRel);
        let latency = *self.inner.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.inner.fail.load(Ordering::Acquire) {
            return Err(SaverError::Write("in-memory writer set to fail".into()));
        }
        self.inner.snapshots.lock().push(snapshot);
        Ok(())
    }
}
