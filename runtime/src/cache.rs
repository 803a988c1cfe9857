//! Process-local draft cache.

use event_wizard_core::cache::{CacheKey, DraftCache};
use event_wizard_core::draft::EventDraft;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// [`DraftCache`] backed by a shared `HashMap`.
///
/// Clones share the same slots, so the repository and the controller can each
/// hold one.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDraftCache {
    entries: Arc<Mutex<HashMap<CacheKey, EventDraft>>>,
}

impl InMemoryDraftCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A poisoned lock still holds consistent snapshots; each write is a single insert.
    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, EventDraft>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl DraftCache for InMemoryDraftCache {
    fn get(&self, key: &CacheKey) -> Option<EventDraft> {
        self.lock().get(key).cloned()
    }

    fn put(&self, key: CacheKey, draft: EventDraft) {
        tracing::trace!(%key, "Caching draft");
        self.lock().insert(key, draft);
    }

    fn rename(&self, from: &CacheKey, to: CacheKey) -> bool {
        let mut entries = self.lock();
        match entries.remove(from) {
            Some(draft) => {
                tracing::debug!(%from, %to, "Re-keying cached draft");
                entries.insert(to, draft);
                true
            },
            None => false,
        }
    }

    fn remove(&self, key: &CacheKey) -> Option<EventDraft> {
        self.lock().remove(key)
    }
}
