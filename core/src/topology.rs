//! Step topology: which steps exist for a given monetization category.
//!
//! The topology is derived, never stored. It is the master sequence
//!
//! ```text
//! 1, 2, 3.1, 3.2, 3.3, 3.4, 3.5, 3.6, 3.7, 3.8, 3.9, 4
//! ```
//!
//! with the ticket sub-step `3.1` removed for free events. [`is_member`] is
//! defined through [`resolve`] so the two can never disagree.

use crate::draft::Monetization;
use crate::step::StepId;
use serde::Serialize;

/// Every step the wizard knows about, in order.
pub const MASTER_SEQUENCE: [StepId; 12] = [
    StepId::BASICS,
    StepId::DESIGN,
    StepId::TICKETS,
    StepId::REGISTRATION_FORM,
    StepId::CAPACITY,
    StepId::WAITLIST,
    StepId::CHECK_IN,
    StepId::BADGES,
    StepId::EMAILS,
    StepId::ATTENDEES,
    StepId::CHECKLIST,
    StepId::LAUNCH,
];

/// Ordered list of the steps valid for one monetization category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepTopology {
    monetization: Monetization,
    steps: Vec<StepId>,
}

/// Compute the topology for `monetization`.
///
/// # Examples
///
/// ```
/// use event_wizard_core::draft::Monetization;
/// use event_wizard_core::topology::{resolve, MASTER_SEQUENCE};
///
/// assert_eq!(resolve(Monetization::Paid).steps(), &MASTER_SEQUENCE);
/// assert_eq!(resolve(Monetization::Free).len(), MASTER_SEQUENCE.len() - 1);
/// ```
#[must_use]
pub fn resolve(monetization: Monetization) -> StepTopology {
    let steps = MASTER_SEQUENCE
        .iter()
        .copied()
        .filter(|step| includes(monetization, *step))
        .collect();

    StepTopology {
        monetization,
        steps,
    }
}

/// Whether `step` belongs to the topology of `monetization`.
///
/// Unknown ids are simply not members.
#[must_use]
pub fn is_member(monetization: Monetization, step: StepId) -> bool {
    resolve(monetization).contains(step)
}

fn includes(monetization: Monetization, step: StepId) -> bool {
    !(step == StepId::TICKETS && monetization == Monetization::Free)
}

impl StepTopology {
    /// Category this topology was resolved for.
    #[must_use]
    pub const fn monetization(&self) -> Monetization {
        self.monetization
    }

    /// The ordered steps.
    #[must_use]
    pub fn steps(&self) -> &[StepId] {
        &self.steps
    }

    /// Iterate the steps in order.
    pub fn iter(&self) -> impl Iterator<Item = StepId> + '_ {
        self.steps.iter().copied()
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether there are no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether `step` is a member.
    #[must_use]
    pub fn contains(&self, step: StepId) -> bool {
        self.steps.contains(&step)
    }

    /// Index of `step` in the ordering.
    #[must_use]
    pub fn position(&self, step: StepId) -> Option<usize> {
        self.steps.iter().position(|candidate| *candidate == step)
    }

    /// Initial step.
    #[must_use]
    pub fn first(&self) -> Option<StepId> {
        self.steps.first().copied()
    }

    /// Terminal step.
    #[must_use]
    pub fn last(&self) -> Option<StepId> {
        self.steps.last().copied()
    }

    /// Step after `step`; `None` at the end or for non-members.
    #[must_use]
    pub fn successor(&self, step: StepId) -> Option<StepId> {
        let index = self.position(step)?;
        self.steps.get(index + 1).copied()
    }

    /// Step before `step`; `None` at the start or for non-members.
    #[must_use]
    pub fn predecessor(&self, step: StepId) -> Option<StepId> {
        let index = self.position(step)?;
        index
            .checked_sub(1)
            .and_then(|previous| self.steps.get(previous).copied())
    }

    /// First sub-step of major step `major` in this topology.
    #[must_use]
    pub fn first_sub_step_of(&self, major: u8) -> Option<StepId> {
        self.iter()
            .find(|step| step.is_sub_step() && step.major() == major)
    }

    /// Whether major step `major` is only reachable through sub-steps.
    #[must_use]
    pub fn has_sub_steps(&self, major: u8) -> bool {
        self.first_sub_step_of(major).is_some()
    }

    /// The first member at or after `step` in master order.
    ///
    /// Used to relocate a session whose current step left the topology
    /// after a category change.
    #[must_use]
    pub fn nearest_at_or_after(&self, step: StepId) -> Option<StepId> {
        self.iter().find(|candidate| *candidate >= step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_topology_drops_tickets_only() {
        let free = resolve(Monetization::Free);
        let expected: Vec<StepId> = MASTER_SEQUENCE
            .iter()
            .copied()
            .filter(|step| *step != StepId::TICKETS)
            .collect();
        assert_eq!(free.steps(), expected.as_slice());
    }

    #[test]
    fn test_paid_and_continuous_keep_master_sequence() {
        assert_eq!(resolve(Monetization::Paid).steps(), &MASTER_SEQUENCE);
        assert_eq!(resolve(Monetization::Continuous).steps(), &MASTER_SEQUENCE);
    }

    #[test]
    fn test_unknown_ids_are_not_members() {
        for monetization in [Monetization::Free, Monetization::Paid, Monetization::Continuous] {
            assert!(!is_member(monetization, StepId::Sub(3, 12)));
            assert!(!is_member(monetization, StepId::Major(7)));
            assert!(!is_member(monetization, StepId::REGISTRATION));
            assert!(!is_member(monetization, StepId::Sub(2, 1)));
        }
    }

    #[test]
    fn test_successor_and_predecessor() {
        let free = resolve(Monetization::Free);
        assert_eq!(free.successor(StepId::DESIGN), Some(StepId::REGISTRATION_FORM));
        assert_eq!(free.predecessor(StepId::REGISTRATION_FORM), Some(StepId::DESIGN));
        assert_eq!(free.successor(StepId::LAUNCH), None);
        assert_eq!(free.predecessor(StepId::BASICS), None);
        assert_eq!(free.successor(StepId::TICKETS), None);
    }

    #[test]
    fn test_first_sub_step_depends_on_category() {
        assert_eq!(
            resolve(Monetization::Paid).first_sub_step_of(3),
            Some(StepId::TICKETS)
        );
        assert_eq!(
            resolve(Monetization::Free).first_sub_step_of(3),
            Some(StepId::REGISTRATION_FORM)
        );
        assert!(!resolve(Monetization::Paid).has_sub_steps(2));
    }

    #[test]
    fn test_nearest_at_or_after_skips_removed_step() {
        let free = resolve(Monetization::Free);
        assert_eq!(
            free.nearest_at_or_after(StepId::TICKETS),
            Some(StepId::REGISTRATION_FORM)
        );
        assert_eq!(free.nearest_at_or_after(StepId::DESIGN), Some(StepId::DESIGN));
        assert_eq!(free.nearest_at_or_after(StepId::Major(9)), None);
    }
}
