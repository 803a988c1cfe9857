//! # Event Wizard Core
//!
//! Core types and traits for the guided event creation wizard.
//!
//! This crate holds everything in the wizard that is pure and synchronous:
//!
//! - **Step ids**: [`step::StepId`], one tagged type for major steps and
//!   registration sub-steps with a single total order
//! - **Topology**: [`topology::resolve`] computes which steps are valid for a
//!   monetization category
//! - **Completion**: [`completion::percentage`] derives progress from the
//!   topology and the completed set
//! - **Draft model**: [`draft::EventDraft`] and [`draft::DraftPatch`]
//! - **Collaborator traits**: [`persistence::DraftStore`] (remote record) and
//!   [`cache::DraftCache`] (local resilience layer)
//! - **Reducer / Effect**: the state machine abstraction the wizard controller
//!   is written against
//!
//! Nothing here performs I/O. The reducer returns effects; the runtime
//! crate executes them.
//!
//! ## Example
//!
//! ```
//! use event_wizard_core::draft::Monetization;
//! use event_wizard_core::step::StepId;
//! use event_wizard_core::topology;
//!
//! let free = topology::resolve(Monetization::Free);
//! assert!(!free.contains(StepId::TICKETS));
//! assert_eq!(free.first(), Some(StepId::BASICS));
//! assert_eq!(free.last(), Some(StepId::LAUNCH));
//! ```

pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

pub mod cache;
pub mod completion;
pub mod draft;
pub mod persistence;
pub mod step;
pub mod topology;

mod effect_macros;

/// The state machine abstraction.
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// Applies an action to state and describes the I/O that should follow.
    ///
    /// `reduce` never performs I/O itself. Anything asynchronous (a draft
    /// save, a cache write) is returned as an [`Effect`] for the runtime to
    /// execute, and its result comes back as another action.
    ///
    /// ```ignore
    /// impl Reducer for WizardReducer {
    ///     type State = WizardState;
    ///     type Action = WizardAction;
    ///     type Environment = WizardEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut WizardState,
    ///         action: WizardAction,
    ///         env: &WizardEnvironment,
    ///     ) -> SmallVec<[Effect<WizardAction>; 4]> {
    ///         match action {
    ///             WizardAction::Unmount => {
    ///                 state.mounted = false;
    ///                 SmallVec::new()
    ///             },
    ///             // ...
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// Session state, mutated in place
        type State;

        /// Inputs, including results fed back by effects
        type Action;

        /// Collaborators the returned effects run against
        type Environment;

        /// Apply `action` to `state`.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Descriptions of asynchronous work.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Work for the runtime to perform after a reduction.
    pub enum Effect<Action> {
        /// Nothing to do
        None,

        /// Async work whose `Some` result is reduced next
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::None => f.write_str("Effect::None"),
                Self::Future(_) => f.write_str("Effect::Future(<future>)"),
            }
        }
    }
}

/// Injected collaborators that are not draft storage.
///
/// Storage lives in [`crate::persistence`] and [`crate::cache`].
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Source of "now" for draft timestamps.
    ///
    /// ```
    /// use event_wizard_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let before = clock.now();
    /// assert!(clock.now() >= before);
    /// ```
    pub trait Clock: Send + Sync {
        /// The current instant
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock used in production.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
