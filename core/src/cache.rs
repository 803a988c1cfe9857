//! Local draft cache.
//!
//! A resilience layer holding the last known fields of each in-progress
//! draft, so an editor survives a reload before (and between) saves. The
//! cache is never authoritative once a remote id exists.

use crate::draft::{DraftId, EventDraft};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Slot of the cache.
///
/// Drafts without an id live under the single provisional slot, scoped to
/// the event currently being authored. After the first save the slot is
/// renamed to the assigned id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheKey {
    /// The event being authored that has no id yet
    Provisional,
    /// A persisted draft
    Draft(DraftId),
}

impl CacheKey {
    /// The slot a draft belongs in.
    #[must_use]
    pub fn for_draft(draft: &EventDraft) -> Self {
        draft.id.map_or(Self::Provisional, Self::Draft)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provisional => write!(f, "draft:new"),
            Self::Draft(id) => write!(f, "draft:{id}"),
        }
    }
}

/// Keyed store of last known draft fields.
///
/// Operations are synchronous; the cache is process local.
pub trait DraftCache: Send + Sync {
    /// Read a slot.
    fn get(&self, key: &CacheKey) -> Option<EventDraft>;

    /// Overwrite a slot.
    fn put(&self, key: CacheKey, draft: EventDraft);

    /// Move the entry at `from` to `to`, leaving `from` empty.
    ///
    /// Returns `false` if `from` was empty.
    fn rename(&self, from: &CacheKey, to: CacheKey) -> bool;

    /// Clear a slot, returning what it held.
    fn remove(&self, key: &CacheKey) -> Option<EventDraft>;
}

/// Fill presentation fields the remote record has not round-tripped yet.
///
/// Remote wins for every field present in both; only the branding blob is
/// taken from the cache, and only when the remote record has none.
#[must_use]
pub fn merge_cached(mut remote: EventDraft, cached: Option<EventDraft>) -> EventDraft {
    if remote.branding.is_none() {
        remote.branding = cached.and_then(|draft| draft.branding);
    }
    remote
}
