//! Draft repository: the single save path for event drafts.
//!
//! Wraps a remote [`DraftStore`] and a local [`DraftCache`]:
//!
//! - resolves the name to persist so an empty name is never written
//! - inserts on the first save and updates afterwards, keyed by the id
//! - recovers from a missing owner record by creating it and retrying,
//!   bounded by the [`RetryPolicy`]
//! - refreshes the cache on success and re-keys the provisional slot after
//!   the first insert
//!
//! # Example
//!
//! ```ignore
//! let repository = DraftRepository::new(store, cache, Arc::new(SystemClock));
//! let saved = repository.save(&draft, DraftPatch::new().name("Gala")).await?;
//! assert!(saved.is_persisted());
//! ```

use crate::retry::{RetryFailure, RetryPolicy, retry_with_remediation};
use event_wizard_core::cache::{CacheKey, DraftCache, merge_cached};
use event_wizard_core::draft::{DraftId, DraftPatch, EventDraft, PLACEHOLDER_NAME, resolve_name};
use event_wizard_core::environment::Clock;
use event_wizard_core::persistence::{DraftStore, PersistenceError};
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, DraftError>;

/// Failures surfaced by [`DraftRepository`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// The store failed with a non-remediable error
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Every attempt hit a referential failure
    #[error("Save gave up after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Attempts made
        attempts: u32,
        /// Failure of the final attempt
        source: PersistenceError,
    },

    /// Creating the missing owner record failed
    #[error("Could not create owner record: {0}")]
    Remediation(#[source] PersistenceError),
}

impl DraftError {
    /// Whether the draft does not exist remotely.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Persistence(PersistenceError::NotFound(_)))
    }
}

impl From<RetryFailure<PersistenceError>> for DraftError {
    fn from(failure: RetryFailure<PersistenceError>) -> Self {
        match failure {
            RetryFailure::Fatal(err) => Self::Persistence(err),
            RetryFailure::Exhausted { attempts, last } => Self::RetriesExhausted {
                attempts,
                source: last,
            },
            RetryFailure::RemediationFailed(err) => Self::Remediation(err),
        }
    }
}

/// Save and load path for drafts.
///
/// Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct DraftRepository {
    store: Arc<dyn DraftStore>,
    cache: Arc<dyn DraftCache>,
    clock: Arc<dyn Clock>,
    policy: RetryPolicy,
    placeholder: String,
}

impl DraftRepository {
    /// Create a repository with the default retry policy and placeholder name.
    #[must_use]
    pub fn new(store: Arc<dyn DraftStore>, cache: Arc<dyn DraftCache>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            cache,
            clock,
            policy: RetryPolicy::default(),
            placeholder: PLACEHOLDER_NAME.to_string(),
        }
    }

    /// Use a custom retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use a custom placeholder name.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// The retry policy in use.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Load a draft, filling presentation fields from the cache.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::Persistence`] if the store fails, including
    /// `NotFound` for an unknown id.
    #[tracing::instrument(skip(self), fields(draft_id = %id))]
    pub async fn load(&self, id: DraftId) -> Result<EventDraft> {
        let key = CacheKey::Draft(id);
        let remote = self.store.load(id).await?;
        let draft = merge_cached(remote, self.cache.get(&key));
        self.cache.put(key, draft.clone());
        Ok(draft)
    }

    /// Cached edits for the draft being authored without an id, if any.
    #[must_use]
    pub fn provisional(&self) -> Option<EventDraft> {
        self.cache.get(&CacheKey::Provisional)
    }

    /// Mirror a working copy into its cache slot.
    pub fn stash(&self, draft: &EventDraft) {
        self.cache.put(CacheKey::for_draft(draft), draft.clone());
    }

    /// Persist `patch` applied to `base`.
    ///
    /// Inserts when `base` has no id, otherwise updates by id. Referential
    /// failures are remediated by creating the owner record, up to the retry
    /// policy's attempt cap. The returned record is authoritative.
    ///
    /// # Errors
    ///
    /// - [`DraftError::Persistence`]: a non-remediable store failure
    /// - [`DraftError::RetriesExhausted`]: the referential failure persisted
    /// - [`DraftError::Remediation`]: the owner record could not be created
    #[tracing::instrument(skip(self, base, patch), fields(draft_id = ?base.id, owner_id = %base.owner_id))]
    pub async fn save(&self, base: &EventDraft, patch: DraftPatch) -> Result<EventDraft> {
        metrics::counter!("draft.save.attempt").increment(1);

        let mut candidate = base.clone().with_patch(&patch);
        candidate.name = resolve_name(patch.name.as_deref(), &base.name, &self.placeholder);
        candidate.updated_at = Some(self.clock.now());

        let owner = candidate.owner_id;
        let store = &self.store;
        let remediate = move || {
            metrics::counter!("draft.save.remediation").increment(1);
            store.create_owner(owner)
        };

        let outcome = match base.id {
            None => {
                retry_with_remediation(
                    &self.policy,
                    move || store.insert(candidate.clone()),
                    PersistenceError::is_referential,
                    remediate,
                )
                .await
            },
            Some(id) => {
                retry_with_remediation(
                    &self.policy,
                    move || store.update(id, candidate.clone()),
                    PersistenceError::is_referential,
                    remediate,
                )
                .await
            },
        };

        let saved = match outcome {
            Ok(saved) => saved,
            Err(failure) => {
                let error = DraftError::from(failure);
                metrics::counter!("draft.save.failure").increment(1);
                tracing::warn!(error = %error, "Draft save failed");
                return Err(error);
            },
        };

        let Some(id) = saved.id else {
            metrics::counter!("draft.save.failure").increment(1);
            return Err(PersistenceError::Other("store returned a draft without an id".into()).into());
        };

        if base.id.is_none() {
            self.cache.rename(&CacheKey::Provisional, CacheKey::Draft(id));
            tracing::info!(draft_id = %id, "Draft created");
        }
        self.cache.put(CacheKey::Draft(id), saved.clone());

        metrics::counter!("draft.save.success").increment(1);
        Ok(saved)
    }
}

impl std::fmt::Debug for DraftRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftRepository")
            .field("policy", &self.policy)
            .field("placeholder", &self.placeholder)
            .finish_non_exhaustive()
    }
}
