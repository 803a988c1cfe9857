//! Remote persistence collaborator.
//!
//! The wizard never talks to a database directly. Everything goes through a
//! [`DraftStore`], which knows how to load, insert and update a draft record
//! and how to create the owner record a draft references.
//!
//! # Implementations
//!
//! - `PostgresDraftStore` (in `event-wizard-postgres`): production storage
//! - `InMemoryDraftStore` (in `event-wizard-testing`): scriptable fake for tests
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of using `async fn` so the
//! store can be shared as `Arc<dyn DraftStore>` inside effects.

use crate::draft::{DraftId, EventDraft, OwnerId};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by [`DraftStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Typed failures of the persistence collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// No record with this id.
    #[error("Draft not found: {0}")]
    NotFound(DraftId),

    /// A write referenced an identity record that does not exist yet.
    ///
    /// Remediated by creating the owner record and retrying.
    #[error("Referential integrity violation: {0}")]
    Referential(String),

    /// Any other failure (network, constraint, unknown).
    #[error("Persistence failure: {0}")]
    Other(String),
}

impl PersistenceError {
    /// Whether this failure belongs to the remediable referential class.
    #[must_use]
    pub const fn is_referential(&self) -> bool {
        matches!(self, Self::Referential(_))
    }
}

/// Gateway to the remote draft record.
///
/// Implementations must be `Send + Sync` to be shared across effect tasks.
pub trait DraftStore: Send + Sync {
    /// Load a draft by id.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no record with this id
    /// - `Other`: the backend failed
    fn load(&self, id: DraftId) -> StoreFuture<'_, EventDraft>;

    /// Insert a new draft; the returned record carries its assigned id.
    ///
    /// # Errors
    ///
    /// - `Referential`: the owner record does not exist
    /// - `Other`: the backend failed
    fn insert(&self, draft: EventDraft) -> StoreFuture<'_, EventDraft>;

    /// Update the draft stored under `id`.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no record with this id
    /// - `Referential`: the owner record does not exist
    /// - `Other`: the backend failed
    fn update(&self, id: DraftId, draft: EventDraft) -> StoreFuture<'_, EventDraft>;

    /// Create the owner record drafts reference. Must be idempotent.
    ///
    /// # Errors
    ///
    /// - `Other`: the backend failed
    fn create_owner(&self, owner: OwnerId) -> StoreFuture<'_, ()>;
}
