//! The store: serialized reduction plus spawned effect execution.

use crate::StoreError;
use crate::handle::{EffectHandle, EffectTracker};
use event_wizard_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, trace, warn};

const BROADCAST_CAPACITY: usize = 16;

/// Owns a session's state and runs the reducer against it.
///
/// Actions are reduced one at a time under a write lock. Effects are
/// spawned on the tokio runtime; an action an effect produces is published
/// to subscribers and then reduced like any other action.
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    closed: Arc<AtomicBool>,
    running: EffectTracker,
    feedback: broadcast::Sender<A>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Clone + Send + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// A store whose feedback broadcast buffers a handful of actions.
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            closed: Arc::new(AtomicBool::new(false)),
            running: EffectTracker::detached(),
            feedback: broadcast::channel(BROADCAST_CAPACITY).0,
        }
    }

    /// Reduce `action` and start its effects.
    ///
    /// Returns once the effects are spawned; wait on the handle for them.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] after [`shutdown`](Self::shutdown).
    #[tracing::instrument(skip_all, name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        if self.is_shutting_down() {
            warn!("Action refused, store is shut down");
            metrics::counter!("store.actions.refused").increment(1);
            return Err(StoreError::ShutdownInProgress);
        }

        let effects = {
            let mut state = self.state.write().await;
            self.reducer.reduce(&mut state, action, &self.environment)
        };
        trace!(effects = effects.len(), "Reduced");

        let (handle, tracker) = EffectHandle::new();
        for effect in effects {
            self.run(effect, &tracker);
        }
        Ok(handle)
    }

    /// Send `action`, then wait for the first fed-back action that
    /// matches `predicate`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Timeout`] when nothing matches in time,
    /// [`StoreError::ChannelClosed`] if the broadcast closes, and
    /// [`StoreError::ShutdownInProgress`] if the store is shut down.
    pub async fn send_and_wait_for<F>(
        &self,
        action: A,
        predicate: F,
        timeout: Duration,
    ) -> Result<A, StoreError>
    where
        F: Fn(&A) -> bool,
    {
        // Subscribe first so a fast effect cannot slip past
        let mut results = self.feedback.subscribe();
        self.send(action).await?;

        let matching = async {
            loop {
                match results.recv().await {
                    Ok(action) if predicate(&action) => return Ok(action),
                    Ok(_) => {},
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "Feedback subscriber lagged");
                    },
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(StoreError::ChannelClosed);
                    },
                }
            }
        };
        tokio::time::timeout(timeout, matching)
            .await
            .map_err(|_| StoreError::Timeout(timeout))?
    }

    /// Every action produced by an effect, in the order they are reduced.
    ///
    /// Actions passed to [`send`](Self::send) directly are not included.
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.feedback.subscribe()
    }

    /// Read from the current state.
    pub async fn state<F, T>(&self, read: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        read(&*self.state.read().await)
    }

    /// Effects running across every handle of this store.
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.running.count()
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Refuse new actions and wait for running effects to drain.
    ///
    /// Feedback from effects that finish during the drain is dropped.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownTimeout`] with the number of effects still
    /// running at the deadline.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        info!(running = self.pending_effects(), "Shutting down store");
        self.closed.store(true, Ordering::Release);

        let mut running = self.running.subscribe();
        if tokio::time::timeout(timeout, running.wait_for(|count| *count == 0))
            .await
            .is_err()
        {
            let left = self.pending_effects();
            warn!(running = left, "Shutdown deadline passed");
            metrics::counter!("store.shutdown.timeout").increment(1);
            return Err(StoreError::ShutdownTimeout(left));
        }
        Ok(())
    }

    fn run(&self, effect: Effect<A>, tracker: &EffectTracker) {
        let Effect::Future(future) = effect else {
            return;
        };
        metrics::counter!("store.effects.executed").increment(1);

        let guards = (tracker.start(), self.running.start());
        let store = self.clone();
        tokio::spawn(async move {
            let _guards = guards;
            if let Some(action) = future.await {
                store.feed_back(action).await;
            }
        });
    }

    /// Publish an effect's action, then reduce it.
    async fn feed_back(&self, action: A) {
        let _ = self.feedback.send(action.clone());
        if let Err(error) = self.send(action).await {
            debug!(%error, "Dropped effect feedback");
        }
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            closed: Arc::clone(&self.closed),
            running: self.running.clone(),
            feedback: self.feedback.clone(),
        }
    }
}

impl<S, A, E, R> std::fmt::Debug for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("running", &self.running.count())
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
