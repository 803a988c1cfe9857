//! State, actions and navigation results of the wizard.

use crate::gate::GateViolation;
use event_wizard_core::completion::Completion;
use event_wizard_core::draft::{DraftPatch, EventDraft};
use event_wizard_core::step::StepId;
use event_wizard_core::topology::StepTopology;
use event_wizard_runtime::repository::DraftError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Correlates a command with its outcome.
pub type RequestId = u64;

/// What a finished command produced: a navigation result, or the save
/// failure that prevented it.
pub type Outcome = Result<Transition, DraftError>;

// ============================================================================
// Navigation results
// ============================================================================

/// Result of a navigation or save command.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// The command took effect
    Accepted,
    /// The command was refused; state is unchanged
    Rejected(RejectReason),
}

impl Transition {
    /// Whether the command took effect.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// The refusal reason, if any.
    #[must_use]
    pub const fn rejection(&self) -> Option<&RejectReason> {
        match self {
            Self::Accepted => None,
            Self::Rejected(reason) => Some(reason),
        }
    }
}

/// Why a command was refused.
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// No step in that direction
    #[error("Already at the boundary of the wizard")]
    AtBoundary,

    /// The step is not valid for the draft's monetization category
    #[error("Step {0} is not part of this event's wizard")]
    NotInTopology(StepId),

    /// Steps after design need a persisted draft
    #[error("Save the event before opening step {0}")]
    DraftNotPersisted(StepId),

    /// Another save has not finished yet
    #[error("A save is already in progress")]
    SaveInFlight,

    /// Finishing is only possible from the last step
    #[error("Finish is only available on the last step (currently on {0})")]
    NotAtTerminal(StepId),

    /// A forward precondition failed
    #[error(transparent)]
    Gate(#[from] GateViolation),
}

// ============================================================================
// Actions
// ============================================================================

/// Operations requested by the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Navigate directly to a step
    JumpTo(StepId),
    /// Persist, then advance to the next step
    Next,
    /// Go to the previous step
    Back,
    /// Add a step to the completed set
    MarkComplete(StepId),
    /// Buffer an edit without persisting it
    Edit(DraftPatch),
    /// Apply an edit and persist without navigating
    Save(DraftPatch),
    /// Publish from the last step
    Finish,
}

/// Everything the wizard reducer handles.
#[derive(Clone, Debug)]
pub enum WizardAction {
    /// A command from the presentation layer
    Command {
        /// Correlation id for the outcome
        request: RequestId,
        /// The requested operation
        command: Command,
    },

    /// The repository stored the draft
    Saved {
        /// Request that started the save
        request: RequestId,
        /// Authoritative record
        draft: EventDraft,
    },

    /// The repository gave up on the draft
    SaveFailed {
        /// Request that started the save
        request: RequestId,
        /// What went wrong
        error: DraftError,
    },

    /// The caller has read the outcome of `request`
    Acknowledge {
        /// Request to forget
        request: RequestId,
    },

    /// The presentation layer went away; late save results are ignored
    Unmount,
}

// ============================================================================
// State
// ============================================================================

/// What a save will do once it succeeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveIntent {
    /// Mark `from` complete and move to its successor
    Advance {
        /// Step being left
        from: StepId,
    },
    /// Stay on the current step
    Stay,
    /// Mark the terminal step complete
    Publish,
}

/// The save currently running.
#[derive(Clone, Debug, PartialEq)]
pub struct InFlight {
    /// Request that started it
    pub request: RequestId,
    /// User edits it carries, restored into `pending` if it fails
    pub patch: DraftPatch,
    /// Follow-up on success
    pub intent: SaveIntent,
}

/// One wizard session.
#[derive(Clone, Debug)]
pub struct WizardState {
    /// Last record confirmed by the repository (or the starting record)
    pub draft: EventDraft,
    /// Edits not yet persisted
    pub pending: DraftPatch,
    /// Step on screen
    pub current: StepId,
    /// Steps completed so far; never shrinks
    pub completed: BTreeSet<StepId>,
    /// Save awaiting its result
    pub in_flight: Option<InFlight>,
    /// Whether results are still applied
    pub mounted: bool,
    /// Outcomes not yet read by the caller
    pub outcomes: BTreeMap<RequestId, Outcome>,
    /// Message of the last failed save
    pub last_error: Option<String>,
}

impl WizardState {
    /// A session positioned on the first step of `draft`'s topology.
    #[must_use]
    pub fn new(draft: EventDraft) -> Self {
        let current = draft.topology().first().unwrap_or(StepId::BASICS);
        Self {
            draft,
            pending: DraftPatch::new(),
            current,
            completed: BTreeSet::new(),
            in_flight: None,
            mounted: true,
            outcomes: BTreeMap::new(),
            last_error: None,
        }
    }

    /// The draft as the user currently sees it: last saved record plus
    /// pending edits.
    #[must_use]
    pub fn working(&self) -> EventDraft {
        self.draft.clone().with_patch(&self.pending)
    }

    /// Steps valid for the working draft.
    #[must_use]
    pub fn topology(&self) -> StepTopology {
        self.working().topology()
    }

    /// Completion counts against the current topology.
    #[must_use]
    pub fn completion(&self) -> Completion {
        Completion::of(&self.topology(), &self.completed)
    }

    /// Whether a save is running.
    #[must_use]
    pub const fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether `request` is the save currently running.
    #[must_use]
    pub fn awaits(&self, request: RequestId) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|flight| flight.request == request)
    }
}
