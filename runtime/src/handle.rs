//! Completion tracking for the effects started by one `send`.

use crate::StoreError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Waits for the effects started by a single [`Store::send`](crate::Store::send).
///
/// An effect counts as finished once the action it fed back (if any) has
/// been reduced, so after [`wait`](Self::wait) returns the state already
/// reflects every save result the sent action triggered.
#[derive(Clone, Debug)]
pub struct EffectHandle {
    running: watch::Receiver<usize>,
}

impl EffectHandle {
    pub(crate) fn new() -> (Self, EffectTracker) {
        let (tx, running) = watch::channel(0);
        (Self { running }, EffectTracker(Arc::new(tx)))
    }

    /// A handle with nothing to wait for.
    #[must_use]
    pub fn completed() -> Self {
        Self::new().0
    }

    /// Effects of this send that have not finished yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        *self.running.borrow()
    }

    /// Wait until every effect has finished.
    pub async fn wait(&mut self) {
        // Err only when the tracker is gone, which means nothing is running
        let _ = self.running.wait_for(|running| *running == 0).await;
    }

    /// [`wait`](Self::wait) with a deadline.
    ///
    /// # Errors
    ///
    /// [`StoreError::Timeout`] if effects are still running at the deadline.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout(timeout))
    }
}

/// Shared running-effect counter.
#[derive(Clone, Debug)]
pub(crate) struct EffectTracker(Arc<watch::Sender<usize>>);

impl EffectTracker {
    pub(crate) fn detached() -> Self {
        Self(Arc::new(watch::Sender::new(0)))
    }

    pub(crate) fn count(&self) -> usize {
        *self.0.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<usize> {
        self.0.subscribe()
    }

    /// Count one effect as running until the returned guard drops.
    pub(crate) fn start(&self) -> RunningEffect {
        self.0.send_modify(|running| *running += 1);
        RunningEffect(self.clone())
    }
}

/// Decrements its tracker on drop, including when the effect panics.
#[derive(Debug)]
pub(crate) struct RunningEffect(EffectTracker);

impl Drop for RunningEffect {
    fn drop(&mut self) {
        (self.0).0.send_modify(|running| *running = running.saturating_sub(1));
    }
}
