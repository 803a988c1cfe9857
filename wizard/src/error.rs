//! Errors returned by [`WizardController`](crate::WizardController).

use event_wizard_runtime::StoreError;
use event_wizard_runtime::repository::DraftError;
use thiserror::Error;

/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, WizardError>;

/// Failures of a controller operation.
///
/// Refused navigation is not an error; it comes back as
/// [`Transition::Rejected`](crate::Transition::Rejected).
#[derive(Error, Debug)]
pub enum WizardError {
    /// The draft could not be loaded or saved
    #[error("Draft persistence failed: {0}")]
    Persistence(#[from] DraftError),

    /// The runtime refused the action
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The session was unmounted; the result will not be applied
    #[error("Wizard session is unmounted")]
    Unmounted,
}

impl WizardError {
    /// The persistence failure, if that is what this is.
    #[must_use]
    pub const fn as_persistence(&self) -> Option<&DraftError> {
        match self {
            Self::Persistence(error) => Some(error),
            Self::Store(_) | Self::Unmounted => None,
        }
    }
}
