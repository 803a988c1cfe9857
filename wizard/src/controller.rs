//! Async facade over the wizard [`Store`].
//!
//! Each operation sends one command, waits for its effects (the save, when
//! there is one) and returns the outcome recorded for that request.

use crate::error::{Result, WizardError};
use crate::reducer::{WizardEnvironment, WizardReducer};
use crate::types::{Command, Transition, WizardAction, WizardState};
use event_wizard_core::draft::{DraftId, DraftPatch, EventDraft, OwnerId};
use event_wizard_core::step::StepId;
use event_wizard_core::topology::StepTopology;
use event_wizard_runtime::Store;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

type WizardStore = Store<WizardState, WizardAction, WizardEnvironment, WizardReducer>;

/// One wizard session, driven by the presentation layer.
///
/// # Example
///
/// ```ignore
/// let wizard = WizardController::new_draft(environment, owner);
/// wizard.edit(DraftPatch::new().name("Summer Gala").schedule(start, end)).await?;
/// assert!(wizard.next().await?.is_accepted());
/// assert_eq!(wizard.current_step_id().await, StepId::DESIGN);
/// ```
pub struct WizardController {
    store: WizardStore,
    requests: AtomicU64,
}

impl WizardController {
    /// Start a session on `draft`.
    #[must_use]
    pub fn new(environment: WizardEnvironment, draft: EventDraft) -> Self {
        Self {
            store: Store::new(WizardState::new(draft), WizardReducer::new(), environment),
            requests: AtomicU64::new(1),
        }
    }

    /// Start authoring a new event, restoring cached edits for `owner` if a
    /// previous session left any.
    #[must_use]
    pub fn new_draft(environment: WizardEnvironment, owner: OwnerId) -> Self {
        let draft = environment
            .repository
            .provisional()
            .filter(|cached| cached.owner_id == owner && !cached.is_persisted())
            .unwrap_or_else(|| EventDraft::new(owner));
        Self::new(environment, draft)
    }

    /// Resume an existing draft.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Persistence`] if the draft cannot be loaded.
    #[tracing::instrument(skip(environment))]
    pub async fn resume(environment: WizardEnvironment, id: DraftId) -> Result<Self> {
        let draft = environment.repository.load(id).await?;
        Ok(Self::new(environment, draft))
    }

    // ========== Operations ==========

    /// Navigate directly to `step`.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Unmounted`] after [`unmount`](Self::unmount).
    pub async fn jump_to(&self, step: StepId) -> Result<Transition> {
        self.dispatch(Command::JumpTo(step)).await
    }

    /// Persist the working draft, then advance to the next step.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Persistence`] if the save failed; the step does
    /// not change and the edits stay pending.
    pub async fn next(&self) -> Result<Transition> {
        self.dispatch(Command::Next).await
    }

    /// Go to the previous step.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Unmounted`] after [`unmount`](Self::unmount).
    pub async fn back(&self) -> Result<Transition> {
        self.dispatch(Command::Back).await
    }

    /// Add `step` to the completed set.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Unmounted`] after [`unmount`](Self::unmount).
    pub async fn mark_complete(&self, step: StepId) -> Result<Transition> {
        self.dispatch(Command::MarkComplete(step)).await
    }

    /// Buffer an edit and mirror the working draft into the local cache.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Unmounted`] after [`unmount`](Self::unmount).
    pub async fn edit(&self, patch: DraftPatch) -> Result<Transition> {
        self.dispatch(Command::Edit(patch)).await
    }

    /// Apply `patch` and persist without navigating.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Persistence`] if the save failed.
    pub async fn save(&self, patch: DraftPatch) -> Result<Transition> {
        self.dispatch(Command::Save(patch)).await
    }

    /// Publish the event from the last step.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Persistence`] if the save failed.
    pub async fn finish(&self) -> Result<Transition> {
        self.dispatch(Command::Finish).await
    }

    /// Detach the session. A save already running still completes in the
    /// repository, but its result is no longer applied here.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Store`] if the runtime is shutting down.
    pub async fn unmount(&self) -> Result<()> {
        self.store.send(WizardAction::Unmount).await?;
        Ok(())
    }

    /// End the session for good. New commands are refused at once; a save
    /// already running gets up to `timeout` to reach the repository, but its
    /// result is not applied to the session.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::Store`] if the save is still running at the
    /// deadline.
    pub async fn close(&self, timeout: Duration) -> Result<()> {
        self.store.shutdown(timeout).await?;
        Ok(())
    }

    // ========== Accessors ==========

    /// Step on screen.
    pub async fn current_step_id(&self) -> StepId {
        self.store.state(|state| state.current).await
    }

    /// Steps completed so far, including ones no longer in the topology.
    pub async fn completed_step_ids(&self) -> BTreeSet<StepId> {
        self.store.state(|state| state.completed.clone()).await
    }

    /// Progress against the current topology, `0..=100`.
    pub async fn completion_percentage(&self) -> u8 {
        self.store.state(|state| state.completion().percentage()).await
    }

    /// Steps valid for the working draft.
    pub async fn topology(&self) -> StepTopology {
        self.store.state(WizardState::topology).await
    }

    /// The working draft: last saved record plus pending edits.
    pub async fn draft(&self) -> EventDraft {
        self.store.state(WizardState::working).await
    }

    /// Whether a save is running.
    pub async fn is_saving(&self) -> bool {
        self.store.state(WizardState::is_saving).await
    }

    /// Message of the last failed save, cleared by the next success.
    pub async fn last_error(&self) -> Option<String> {
        self.store.state(|state| state.last_error.clone()).await
    }

    /// Whether results are still applied.
    pub async fn is_mounted(&self) -> bool {
        self.store.state(|state| state.mounted).await
    }

    async fn dispatch(&self, command: Command) -> Result<Transition> {
        if !self.is_mounted().await {
            return Err(WizardError::Unmounted);
        }

        let request = self.requests.fetch_add(1, Ordering::Relaxed);
        let mut handle = self
            .store
            .send(WizardAction::Command { request, command })
            .await?;
        handle.wait().await;

        let outcome = self
            .store
            .state(|state| state.outcomes.get(&request).cloned())
            .await;
        self.store.send(WizardAction::Acknowledge { request }).await?;

        match outcome {
            Some(Ok(transition)) => Ok(transition),
            Some(Err(error)) => Err(WizardError::Persistence(error)),
            None => Err(WizardError::Unmounted),
        }
    }
}

impl std::fmt::Debug for WizardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardController")
            .field("requests", &self.requests)
            .finish_non_exhaustive()
    }
}
