//! # Event Wizard Runtime
//!
//! Executes wizard reducers: a [`Store`] serializes reduction and spawns
//! effects, and the [`repository`] gives those effects a draft save path
//! with bounded remediation and a local cache.
//!
//! ```ignore
//! use event_wizard_runtime::Store;
//!
//! let store = Store::new(WizardState::new(draft), WizardReducer::new(), environment);
//!
//! let next = WizardAction::Command { request: 1, command: Command::Next };
//! let mut handle = store.send(next).await?;
//! handle.wait().await;
//!
//! let step = store.state(|s| s.current).await;
//! ```

mod error;
mod handle;
mod store;

/// Bounded retry with remediation
pub mod retry;

/// In-memory local draft cache
pub mod cache;

/// Draft repository (persistence + cache refresh)
pub mod repository;

pub use error::StoreError;
pub use handle::EffectHandle;
pub use retry::RetryPolicy;
pub use store::Store;

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]

    use super::*;
    use event_wizard_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct Tally {
        saves: i32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TallyAction {
        Saved,
        Reverted,
        Ignore,
        Autosave,
        SaveLater,
        SaveAll,
        Crash,
    }

    #[derive(Debug, Clone)]
    struct TallyReducer;

    fn saving() -> Effect<TallyAction> {
        Effect::Future(Box::pin(async {
            tokio::task::yield_now().await;
            Some(TallyAction::Saved)
        }))
    }

    impl Reducer for TallyReducer {
        type State = Tally;
        type Action = TallyAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Tally,
            action: TallyAction,
            _env: &(),
        ) -> SmallVec<[Effect<TallyAction>; 4]> {
            match action {
                TallyAction::Saved => {
                    state.saves += 1;
                    SmallVec::new()
                },
                TallyAction::Reverted => {
                    state.saves -= 1;
                    SmallVec::new()
                },
                TallyAction::Ignore => smallvec![Effect::None],
                TallyAction::Autosave => smallvec![saving()],
                TallyAction::SaveLater => smallvec![Effect::Future(Box::pin(async {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Some(TallyAction::Saved)
                }))],
                TallyAction::SaveAll => smallvec![saving(), saving(), saving()],
                TallyAction::Crash => smallvec![Effect::Future(Box::pin(async {
                    panic!("effect crashed");
                }))],
            }
        }
    }

    fn store() -> Store<Tally, TallyAction, (), TallyReducer> {
        Store::new(Tally::default(), TallyReducer, ())
    }

    #[tokio::test]
    async fn test_actions_are_reduced_in_order() -> Result<(), StoreError> {
        let store = store();

        store.send(TallyAction::Saved).await?;
        store.send(TallyAction::Saved).await?;
        store.send(TallyAction::Reverted).await?;
        store.send(TallyAction::Ignore).await?;

        assert_eq!(store.state(|s| s.saves).await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_wait_includes_the_fed_back_action() -> Result<(), StoreError> {
        let store = store();

        let mut handle = store.send(TallyAction::Autosave).await?;
        handle.wait_with_timeout(Duration::from_secs(1)).await?;

        assert_eq!(store.state(|s| s.saves).await, 1);
        assert_eq!(handle.pending(), 0);
        assert_eq!(store.pending_effects(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_slow_effect_lands_after_send_returns() -> Result<(), StoreError> {
        let store = store();

        let mut handle = store.send(TallyAction::SaveLater).await?;
        assert_eq!(store.state(|s| s.saves).await, 0);
        assert_eq!(handle.pending(), 1);

        handle.wait_with_timeout(Duration::from_secs(1)).await?;
        assert_eq!(store.state(|s| s.saves).await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_every_effect_of_a_send_is_awaited() -> Result<(), StoreError> {
        let store = store();
        let mut observed = store.subscribe_actions();

        let mut handle = store.send(TallyAction::SaveAll).await?;
        handle.wait_with_timeout(Duration::from_secs(1)).await?;

        assert_eq!(store.state(|s| s.saves).await, 3);
        let mut seen = 0;
        while let Ok(action) = observed.try_recv() {
            assert_eq!(action, TallyAction::Saved);
            seen += 1;
        }
        assert_eq!(seen, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_clones_share_state() -> Result<(), StoreError> {
        let first = store();
        let second = first.clone();

        first.send(TallyAction::Saved).await?;
        assert_eq!(second.state(|s| s.saves).await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_panicking_effect_is_contained() -> Result<(), StoreError> {
        let store = store();

        let mut handle = store.send(TallyAction::Crash).await?;
        handle.wait_with_timeout(Duration::from_secs(1)).await?;

        store.send(TallyAction::Saved).await?;
        assert_eq!(store.state(|s| s.saves).await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_send_and_wait_for_returns_the_match() -> Result<(), StoreError> {
        let store = store();

        let action = store
            .send_and_wait_for(
                TallyAction::Autosave,
                |a| *a == TallyAction::Saved,
                Duration::from_secs(1),
            )
            .await?;

        assert_eq!(action, TallyAction::Saved);
        Ok(())
    }

    #[tokio::test]
    async fn test_send_and_wait_for_times_out() {
        let store = store();

        let result = store
            .send_and_wait_for(TallyAction::Ignore, |_| true, Duration::from_millis(20))
            .await;

        assert_eq!(result, Err(StoreError::Timeout(Duration::from_millis(20))));
    }

    #[tokio::test]
    async fn test_shutdown_drains_then_refuses() -> Result<(), StoreError> {
        let store = store();

        store.send(TallyAction::SaveLater).await?;
        assert_eq!(store.pending_effects(), 1);
        store.shutdown(Duration::from_secs(1)).await?;

        assert_eq!(store.pending_effects(), 0);
        assert!(store.is_shutting_down());
        assert_eq!(
            store.send(TallyAction::Saved).await.err(),
            Some(StoreError::ShutdownInProgress)
        );
        Ok(())
    }
}
