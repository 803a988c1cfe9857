//! Preconditions for forward transitions.

use event_wizard_core::draft::EventDraft;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A precondition that blocked a forward transition.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateViolation {
    /// The name is empty after trimming
    #[error("Event name is required")]
    MissingName,

    /// Start and/or end is unset
    #[error("Event start and end are required")]
    MissingDates,

    /// Waitlist capacity is larger than the attendee capacity
    #[error("Waitlist capacity {waitlist} exceeds capacity {capacity}")]
    WaitlistExceedsCapacity {
        /// Configured waitlist capacity
        waitlist: u32,
        /// Configured attendee capacity
        capacity: u32,
    },
}

/// Check the preconditions for moving forward from the current step.
///
/// Name and dates are only required while the draft has never been
/// persisted; the waitlist bound is always checked.
///
/// # Errors
///
/// Returns the first [`GateViolation`] found.
///
/// # Examples
///
/// ```
/// use event_wizard::gate::{check_forward, GateViolation};
/// use event_wizard_core::draft::{DraftPatch, EventDraft, OwnerId};
///
/// let draft = EventDraft::new(OwnerId::generate());
/// assert_eq!(check_forward(&draft), Err(GateViolation::MissingName));
///
/// let named = draft.with_patch(&DraftPatch::new().name("Gala"));
/// assert_eq!(check_forward(&named), Err(GateViolation::MissingDates));
/// ```
pub fn check_forward(draft: &EventDraft) -> Result<(), GateViolation> {
    if !draft.is_persisted() {
        if draft.name.trim().is_empty() {
            return Err(GateViolation::MissingName);
        }
        if draft.starts_at.is_none() || draft.ends_at.is_none() {
            return Err(GateViolation::MissingDates);
        }
    }

    if let (Some(waitlist), Some(capacity)) = (draft.waitlist_capacity, draft.capacity) {
        if waitlist > capacity {
            return Err(GateViolation::WaitlistExceedsCapacity { waitlist, capacity });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::{TimeZone, Utc};
    use event_wizard_core::draft::{DraftId, DraftPatch, OwnerId};

    fn scheduled() -> EventDraft {
        let start = Utc.with_ymd_and_hms(2026, 9, 1, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 9, 1, 17, 0, 0).unwrap();
        EventDraft::new(OwnerId::generate())
            .with_patch(&DraftPatch::new().name("Summit").schedule(start, end))
    }

    #[test]
    fn test_blank_name_fails_before_first_persist() {
        let draft = scheduled().with_patch(&DraftPatch::new().name("   "));
        assert_eq!(check_forward(&draft), Err(GateViolation::MissingName));
    }

    #[test]
    fn test_missing_end_fails() {
        let mut draft = scheduled();
        draft.ends_at = None;
        assert_eq!(check_forward(&draft), Err(GateViolation::MissingDates));
    }

    #[test]
    fn test_persisted_draft_skips_required_fields() {
        let mut draft = EventDraft::new(OwnerId::generate());
        draft.id = Some(DraftId::generate());
        assert_eq!(check_forward(&draft), Ok(()));
    }

    #[test]
    fn test_waitlist_bound() {
        let over = scheduled().with_patch(&DraftPatch::new().capacity(Some(50)).waitlist(true, Some(60)));
        assert_eq!(
            check_forward(&over),
            Err(GateViolation::WaitlistExceedsCapacity {
                waitlist: 60,
                capacity: 50
            })
        );

        let equal = scheduled().with_patch(&DraftPatch::new().capacity(Some(50)).waitlist(true, Some(50)));
        assert_eq!(check_forward(&equal), Ok(()));

        let unlimited = scheduled().with_patch(&DraftPatch::new().capacity(None).waitlist(true, Some(500)));
        assert_eq!(check_forward(&unlimited), Ok(()));
    }
}
