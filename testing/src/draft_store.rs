//! Scriptable in-memory [`DraftStore`].
//!
//! Behaves like the real store (ids are assigned on insert, writes that
//! reference an unknown owner fail with a referential error) and lets tests
//! queue failures, add latency and count calls.

use event_wizard_core::draft::{DraftId, EventDraft, OwnerId};
use event_wizard_core::persistence::{DraftStore, PersistenceError, StoreFuture};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct Records {
    drafts: HashMap<DraftId, EventDraft>,
    owners: HashSet<OwnerId>,
    insert_failures: VecDeque<PersistenceError>,
    update_failures: VecDeque<PersistenceError>,
    inserts: usize,
    updates: usize,
    owner_creations: usize,
}

/// In-memory draft store for tests and the demo binary.
///
/// Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDraftStore {
    records: Arc<Mutex<Records>>,
    latency: Option<Duration>,
}

impl InMemoryDraftStore {
    /// An empty store with no owners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`, keeping saves in flight long enough to
    /// observe.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Register an owner record.
    pub fn add_owner(&self, owner: OwnerId) {
        self.records().owners.insert(owner);
    }

    /// Whether an owner record exists.
    #[must_use]
    pub fn has_owner(&self, owner: OwnerId) -> bool {
        self.records().owners.contains(&owner)
    }

    /// Store `draft` under a fresh id (registering its owner) and return it.
    #[must_use]
    pub fn seed(&self, mut draft: EventDraft) -> EventDraft {
        let id = draft.id.unwrap_or_else(DraftId::generate);
        draft.id = Some(id);
        let mut records = self.records();
        records.owners.insert(draft.owner_id);
        records.drafts.insert(id, draft.clone());
        draft
    }

    /// Fail the next insert attempt with `error`. Failures queue up.
    pub fn fail_next_insert(&self, error: PersistenceError) {
        self.records().insert_failures.push_back(error);
    }

    /// Fail the next update attempt with `error`. Failures queue up.
    pub fn fail_next_update(&self, error: PersistenceError) {
        self.records().update_failures.push_back(error);
    }

    /// The stored record for `id`.
    #[must_use]
    pub fn get(&self, id: DraftId) -> Option<EventDraft> {
        self.records().drafts.get(&id).cloned()
    }

    /// Number of stored drafts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records().drafts.len()
    }

    /// Whether no draft is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records().drafts.is_empty()
    }

    /// Insert attempts so far, failed ones included.
    #[must_use]
    pub fn insert_count(&self) -> usize {
        self.records().inserts
    }

    /// Update attempts so far, failed ones included.
    #[must_use]
    pub fn update_count(&self) -> usize {
        self.records().updates
    }

    /// `create_owner` calls so far.
    #[must_use]
    pub fn create_owner_calls(&self) -> usize {
        self.records().owner_creations
    }

    fn records(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn missing_owner(owner: OwnerId) -> PersistenceError {
    PersistenceError::Referential(format!("owner {owner} does not exist"))
}

impl DraftStore for InMemoryDraftStore {
    fn load(&self, id: DraftId) -> StoreFuture<'_, EventDraft> {
        Box::pin(async move {
            self.pause().await;
            self.records()
                .drafts
                .get(&id)
                .cloned()
                .ok_or(PersistenceError::NotFound(id))
        })
    }

    fn insert(&self, mut draft: EventDraft) -> StoreFuture<'_, EventDraft> {
        Box::pin(async move {
            self.pause().await;
            let mut records = self.records();
            records.inserts += 1;
            if let Some(error) = records.insert_failures.pop_front() {
                return Err(error);
            }
            if !records.owners.contains(&draft.owner_id) {
                return Err(missing_owner(draft.owner_id));
            }
            let id = DraftId::generate();
            draft.id = Some(id);
            records.drafts.insert(id, draft.clone());
            Ok(draft)
        })
    }

    fn update(&self, id: DraftId, mut draft: EventDraft) -> StoreFuture<'_, EventDraft> {
        Box::pin(async move {
            self.pause().await;
            let mut records = self.records();
            records.updates += 1;
            if let Some(error) = records.update_failures.pop_front() {
                return Err(error);
            }
            if !records.drafts.contains_key(&id) {
                return Err(PersistenceError::NotFound(id));
            }
            if !records.owners.contains(&draft.owner_id) {
                return Err(missing_owner(draft.owner_id));
            }
            draft.id = Some(id);
            records.drafts.insert(id, draft.clone());
            Ok(draft)
        })
    }

    fn create_owner(&self, owner: OwnerId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.pause().await;
            let mut records = self.records();
            records.owner_creations += 1;
            records.owners.insert(owner);
            Ok(())
        })
    }
}
