//! # Event Wizard
//!
//! The guided event creation wizard: a state machine over the steps valid for
//! an event's monetization category, with gated forward transitions and a
//! single persistence path for the draft.
//!
//! - [`WizardReducer`]: navigation, gating, completion and save bookkeeping
//! - [`WizardController`]: the async surface the presentation layer calls
//! - [`gate`]: forward preconditions
//! - [`config`]: environment driven configuration
//!
//! ## Example
//!
//! ```no_run
//! use event_wizard::{WizardController, WizardEnvironment};
//! use event_wizard_core::draft::{DraftPatch, OwnerId};
//! use event_wizard_core::environment::SystemClock;
//! use event_wizard_runtime::cache::InMemoryDraftCache;
//! use event_wizard_runtime::repository::DraftRepository;
//! use event_wizard_testing::InMemoryDraftStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), event_wizard::WizardError> {
//! let repository = DraftRepository::new(
//!     Arc::new(InMemoryDraftStore::new()),
//!     Arc::new(InMemoryDraftCache::new()),
//!     Arc::new(SystemClock),
//! );
//! let wizard = WizardController::new_draft(WizardEnvironment::new(repository), OwnerId::generate());
//!
//! let outcome = wizard.next().await?;
//! assert!(!outcome.is_accepted()); // name and dates are still missing
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod gate;
pub mod reducer;
pub mod types;

pub use config::WizardConfig;
pub use controller::WizardController;
pub use error::WizardError;
pub use gate::GateViolation;
pub use reducer::{WizardEnvironment, WizardReducer};
pub use types::{Command, RejectReason, Transition, WizardAction, WizardState};
